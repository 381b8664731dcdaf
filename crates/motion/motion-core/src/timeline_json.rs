//! Timeline JSON loader.
//!
//! Raw serde structs mirror the file format (untagged value and curve shapes)
//! and are mapped onto typed [`Track`]s. Structural problems are
//! `MotionError::Parse`; curve validity is checked later, when a track's
//! layout is recalculated.

use serde::Deserialize;

use crate::clip::{AxisMask, ClipInstance, ClipSchedule, CurveUsageMode, Extrapolation};
use crate::curve::{Curve, CurveKey};
use crate::error::MotionError;
use crate::ids::{IdAllocator, TrackId};
use crate::track::Track;
use crate::value::{MotionValue, Quat, Rgba, SpriteIndex, ValueKind};

/// A loaded timeline: one typed track per entry, in file order.
#[derive(Clone, Debug)]
pub struct TimelineData {
    pub name: String,
    pub tracks: Vec<AnyTrack>,
}

/// Track of any supported value kind.
#[derive(Clone, Debug)]
pub enum AnyTrack {
    Float(Track<f32>),
    Vec2(Track<[f32; 2]>),
    Vec3(Track<[f32; 3]>),
    Vec4(Track<[f32; 4]>),
    Quat(Track<Quat>),
    Color(Track<Rgba>),
    Sprite(Track<SpriteIndex>),
}

macro_rules! any_track_map {
    ($self:expr, $t:ident => $body:expr) => {
        match $self {
            AnyTrack::Float($t) => $body,
            AnyTrack::Vec2($t) => $body,
            AnyTrack::Vec3($t) => $body,
            AnyTrack::Vec4($t) => $body,
            AnyTrack::Quat($t) => $body,
            AnyTrack::Color($t) => $body,
            AnyTrack::Sprite($t) => $body,
        }
    };
}

impl AnyTrack {
    pub fn kind(&self) -> ValueKind {
        match self {
            AnyTrack::Float(_) => ValueKind::Float,
            AnyTrack::Vec2(_) => ValueKind::Vec2,
            AnyTrack::Vec3(_) => ValueKind::Vec3,
            AnyTrack::Vec4(_) => ValueKind::Vec4,
            AnyTrack::Quat(_) => ValueKind::Quat,
            AnyTrack::Color(_) => ValueKind::ColorRgba,
            AnyTrack::Sprite(_) => ValueKind::Index,
        }
    }

    pub fn id(&self) -> TrackId {
        any_track_map!(self, t => t.id)
    }

    pub fn name(&self) -> &str {
        any_track_map!(self, t => t.name.as_str())
    }

    pub fn target(&self) -> &str {
        any_track_map!(self, t => t.target.as_str())
    }

    pub fn clip_count(&self) -> usize {
        any_track_map!(self, t => t.clips().len())
    }
}

/// Parse timeline JSON into typed tracks.
///
/// Notes:
/// - Times are seconds; `start`/`duration` place a clip, `easeIn`/`easeOut`
///   are optional manual fades.
/// - `from`/`to` are a number or an array with one entry per component
///   (colors may omit alpha, which defaults to 1).
/// - Sprite clips may give `frames` instead of `from`/`to`.
/// - A clip without `curve` uses the linear curve unless `axisCurves` is set.
/// - Structural problems are parse errors; clip validity (missing curves,
///   bad bounds) is left to layout validation so one bad clip does not sink
///   the whole file.
pub fn parse_timeline_json(s: &str) -> Result<TimelineData, MotionError> {
    let raw: RawTimeline =
        serde_json::from_str(s).map_err(|e| MotionError::Parse(e.to_string()))?;
    let mut ids = IdAllocator::new();
    let mut tracks = Vec::with_capacity(raw.tracks.len());
    for rt in &raw.tracks {
        let track = match rt.kind {
            ValueKind::Float => AnyTrack::Float(build_track(rt, &mut ids)?),
            ValueKind::Vec2 => AnyTrack::Vec2(build_track(rt, &mut ids)?),
            ValueKind::Vec3 => AnyTrack::Vec3(build_track(rt, &mut ids)?),
            ValueKind::Vec4 => AnyTrack::Vec4(build_track(rt, &mut ids)?),
            ValueKind::Quat => AnyTrack::Quat(build_track(rt, &mut ids)?),
            ValueKind::ColorRgba => AnyTrack::Color(build_track(rt, &mut ids)?),
            ValueKind::Index => AnyTrack::Sprite(build_track(rt, &mut ids)?),
        };
        tracks.push(track);
    }
    Ok(TimelineData {
        name: raw.name,
        tracks,
    })
}

fn build_track<V: MotionValue>(
    rt: &RawTrack,
    ids: &mut IdAllocator,
) -> Result<Track<V>, MotionError> {
    let id = ids.alloc_track();
    let name = rt.name.clone().unwrap_or_else(|| rt.target.clone());
    let mut clips = Vec::with_capacity(rt.clips.len());
    for (i, rc) in rt.clips.iter().enumerate() {
        let clip_name = rc.name.clone().unwrap_or_else(|| format!("{name}#{i}"));
        let (from, to) = match (&rc.from, &rc.to, rc.frames) {
            (Some(from), Some(to), _) => (
                to_value::<V>(from, &clip_name)?,
                to_value::<V>(to, &clip_name)?,
            ),
            (None, None, Some(frames)) if V::KIND == ValueKind::Index => {
                let last = frames.saturating_sub(1) as f32;
                (V::zero(), single::<V>(last))
            }
            _ => {
                return Err(MotionError::Parse(format!(
                    "clip '{clip_name}' needs both 'from' and 'to'"
                )))
            }
        };

        let schedule = ClipSchedule {
            start: rc.start,
            duration: rc.duration,
            ease_in: rc.ease_in,
            ease_out: rc.ease_out,
        };
        let curve = match &rc.curve {
            Some(c) => Some(to_curve(c, &clip_name)?),
            None if rc.axis_curves.is_some() => None,
            None => Some(Curve::Linear),
        };
        let axis_curves = match &rc.axis_curves {
            Some(list) => list
                .iter()
                .map(|c| c.as_ref().map(|c| to_curve(c, &clip_name)).transpose())
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let axes = rc
            .axes
            .as_deref()
            .map(AxisMask::from_flags)
            .unwrap_or_default();

        clips.push(
            ClipInstance::new(ids.alloc_clip(), clip_name, schedule, from, to)
                .with_curve(curve)
                .with_axis_curves(axis_curves)
                .with_extrapolation(rc.extrapolation)
                .with_curve_usage(rc.curve_usage)
                .with_axes(axes),
        );
    }
    Ok(Track::new(id, name, rt.target.clone()).with_clips(clips))
}

fn single<V: MotionValue>(c: f32) -> V {
    let mut v = V::zero();
    v.set_component(0, c);
    v
}

fn to_value<V: MotionValue>(raw: &RawValue, clip: &str) -> Result<V, MotionError> {
    let comps: Vec<f32> = match raw {
        RawValue::Number(n) => vec![*n as f32],
        RawValue::Array(a) => a.iter().map(|n| *n as f32).collect(),
    };
    let mut v = V::zero();
    let color_without_alpha = V::KIND == ValueKind::ColorRgba && comps.len() == 3;
    if comps.len() != V::COMPONENTS && !color_without_alpha {
        return Err(MotionError::Parse(format!(
            "clip '{clip}': expected {} components for {:?}, got {}",
            V::COMPONENTS,
            V::KIND,
            comps.len()
        )));
    }
    for (axis, c) in comps.iter().enumerate() {
        v.set_component(axis, *c);
    }
    if color_without_alpha {
        v.set_component(3, 1.0);
    }
    Ok(v)
}

fn to_curve(raw: &RawCurve, clip: &str) -> Result<Curve, MotionError> {
    match raw {
        RawCurve::Named(name) => match name.as_str() {
            "linear" => Ok(Curve::Linear),
            "easeInOut" => Ok(Curve::ease_in_out()),
            other => Err(MotionError::Parse(format!(
                "clip '{clip}': unknown curve '{other}'"
            ))),
        },
        RawCurve::Bezier { bezier } => Ok(Curve::Bezier(*bezier)),
        RawCurve::Keys { keys } => Ok(Curve::Keyed(keys.clone())),
        RawCurve::Constant { constant } => Ok(Curve::Constant(*constant)),
    }
}

// ----- JSON schema (serde) -----

#[derive(Debug, Deserialize)]
struct RawTimeline {
    #[serde(default)]
    name: String,
    tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
struct RawTrack {
    name: Option<String>,
    kind: ValueKind,
    target: String,
    #[serde(default)]
    clips: Vec<RawClip>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClip {
    name: Option<String>,
    start: f64,
    duration: f64,
    #[serde(default)]
    ease_in: f64,
    #[serde(default)]
    ease_out: f64,
    from: Option<RawValue>,
    to: Option<RawValue>,
    frames: Option<u32>,
    curve: Option<RawCurve>,
    axis_curves: Option<Vec<Option<RawCurve>>>,
    axes: Option<Vec<bool>>,
    #[serde(default)]
    extrapolation: Extrapolation,
    #[serde(default)]
    curve_usage: CurveUsageMode,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Number(f64),
    Array(Vec<f64>),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCurve {
    Named(String),
    Bezier { bezier: [f32; 4] },
    Keys { keys: Vec<CurveKey> },
    Constant { constant: f32 },
}
