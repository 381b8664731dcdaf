//! Baking API: sample a track's blended output at a fixed frame rate.

use serde::{Deserialize, Serialize};

use crate::blend::blend;
use crate::error::MotionError;
use crate::evaluator::{CacheToken, MotionEvaluator};
use crate::timeline_json::{AnyTrack, TimelineData};
use crate::track::Track;
use crate::value::{ColorBlendSpace, MotionValue, Value, ValueKind};

/// Upper bound on frames per baked track.
pub const MAX_BAKED_FRAMES: usize = 1_000_000;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BakingConfig {
    /// Target frame rate (Hz) for baked samples.
    pub frame_rate: f32,
    /// Start time (seconds); if None, the earliest playable clip start.
    pub start_time: Option<f64>,
    /// End time (seconds); if None, the latest playable clip end.
    pub end_time: Option<f64>,
    pub color_space: ColorBlendSpace,
}

impl Default for BakingConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            start_time: None,
            end_time: None,
            color_space: ColorBlendSpace::Srgb,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BakedTrack {
    pub target_path: String,
    pub kind: ValueKind,
    pub frame_rate: f32,
    pub start_time: f64,
    pub end_time: f64,
    /// One value per frame, end inclusive.
    pub values: Vec<Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BakedTimeline {
    pub name: String,
    pub tracks: Vec<BakedTrack>,
}

/// Bake one track against `default`, using the reference driver for weights.
pub fn bake_track<V: MotionValue>(
    track: &mut Track<V>,
    default: V,
    cfg: &BakingConfig,
) -> Result<BakedTrack, MotionError> {
    let sr = if cfg.frame_rate.is_finite() && cfg.frame_rate > 0.0 {
        cfg.frame_rate
    } else {
        60.0
    };
    let sr = f64::from(sr.max(1.0));

    let token = CacheToken::new(cfg.color_space);
    track.refresh(token);
    let (span_start, span_end) = track.span().unwrap_or((0.0, 0.0));
    let start = cfg.start_time.filter(|t| t.is_finite()).unwrap_or(span_start);
    let end = cfg
        .end_time
        .filter(|t| t.is_finite())
        .unwrap_or(span_end)
        .max(start);
    let frames = ((end - start) * sr).ceil();
    if frames >= MAX_BAKED_FRAMES as f64 {
        return Err(MotionError::Config(format!(
            "baking [{start}, {end}] at {sr} fps needs more than {MAX_BAKED_FRAMES} frames"
        )));
    }
    let frame_count = frames as usize + 1;

    let mut evaluator = MotionEvaluator::new(token);
    let mut values = Vec::with_capacity(frame_count);
    for f in 0..frame_count {
        let t = (start + f as f64 / sr).min(end);
        let samples = track.sample(t);
        let input = track.blend_input(t, &samples)?;
        let out = blend(&mut evaluator, &input, default)?;
        values.push(out.value.to_value());
    }

    Ok(BakedTrack {
        target_path: track.target.clone(),
        kind: V::KIND,
        frame_rate: sr as f32,
        start_time: start,
        end_time: end,
        values,
    })
}

/// Bake every track of a timeline. Without bound targets there is no captured
/// default, so each kind's neutral value stands in.
pub fn bake_timeline(
    data: &mut TimelineData,
    cfg: &BakingConfig,
) -> Result<BakedTimeline, MotionError> {
    fn neutral<V: MotionValue>() -> V {
        V::zero().finalize()
    }
    let mut tracks = Vec::with_capacity(data.tracks.len());
    for track in &mut data.tracks {
        let baked = match track {
            AnyTrack::Float(t) => bake_track(t, neutral(), cfg)?,
            AnyTrack::Vec2(t) => bake_track(t, neutral(), cfg)?,
            AnyTrack::Vec3(t) => bake_track(t, neutral(), cfg)?,
            AnyTrack::Vec4(t) => bake_track(t, neutral(), cfg)?,
            AnyTrack::Quat(t) => bake_track(t, neutral(), cfg)?,
            AnyTrack::Color(t) => bake_track(t, neutral(), cfg)?,
            AnyTrack::Sprite(t) => bake_track(t, neutral(), cfg)?,
        };
        tracks.push(baked);
    }
    Ok(BakedTimeline {
        name: data.name.clone(),
        tracks,
    })
}

/// Export baked data as serde_json::Value (stable schema for serialization).
pub fn export_baked_json(baked: &BakedTimeline) -> serde_json::Value {
    serde_json::to_value(baked).unwrap_or(serde_json::Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::{ClipInstance, ClipSchedule};
    use crate::ids::{ClipId, TrackId};

    #[test]
    fn frames_cover_span_inclusive() {
        let clip = ClipInstance::new(ClipId(0), "c", ClipSchedule::new(1.0, 1.0), 0.0f32, 4.0);
        let mut track = Track::new(TrackId(0), "t", "x").with_clips(vec![clip]);
        let cfg = BakingConfig {
            frame_rate: 4.0,
            ..Default::default()
        };
        let baked = bake_track(&mut track, -1.0, &cfg).unwrap();
        assert_eq!(baked.start_time, 1.0);
        assert_eq!(baked.end_time, 2.0);
        assert_eq!(
            baked.values,
            vec![
                Value::Float(0.0),
                Value::Float(1.0),
                Value::Float(2.0),
                Value::Float(3.0),
                // end reached: Hold extrapolation
                Value::Float(4.0),
            ]
        );
    }

    #[test]
    fn empty_track_bakes_single_default_frame() {
        let mut track = Track::<f32>::new(TrackId(0), "t", "x");
        let baked = bake_track(&mut track, 0.5, &BakingConfig::default()).unwrap();
        assert_eq!(baked.values, vec![Value::Float(0.5)]);
    }

    #[test]
    fn oversized_range_is_a_config_error() {
        let clip = ClipInstance::new(ClipId(0), "c", ClipSchedule::new(0.0, 1.0), 0.0f32, 1.0);
        let mut track = Track::new(TrackId(0), "t", "x").with_clips(vec![clip]);
        let cfg = BakingConfig {
            end_time: Some(1e12),
            ..Default::default()
        };
        let err = bake_track(&mut track, 0.0, &cfg).unwrap_err();
        assert!(matches!(err, MotionError::Config(msg) if msg.contains("frames")));
    }
}
