//! Per-track frame processing: capture default, refresh layout, blend, write.

use crate::binding::{TargetBinding, WriteStatus};
use crate::blend::{blend, BlendState, ClipSample};
use crate::config::Config;
use crate::error::MotionError;
use crate::evaluator::{CacheToken, MotionEvaluator};
use crate::ids::{ClipId, TrackId};
use crate::track::Track;
use crate::value::{ColorBlendSpace, MotionValue, Value, ValueKind};

/// Result of processing one frame of one track.
#[derive(Clone, Debug, PartialEq)]
pub struct MixFrame<V> {
    pub value: V,
    pub state: BlendState,
    /// `None` when the write was skipped as redundant.
    pub write: Option<WriteStatus>,
    pub layout_refreshed: bool,
}

impl<V: MotionValue> MixFrame<V> {
    pub fn into_dynamic(self) -> MixFrame<Value> {
        MixFrame {
            value: self.value.to_value(),
            state: self.state,
            write: self.write,
            layout_refreshed: self.layout_refreshed,
        }
    }
}

/// Drives one track into one bound target.
pub struct TrackMixer<V: MotionValue> {
    track: Track<V>,
    binding: TargetBinding<V>,
    evaluator: MotionEvaluator<V>,
    token: CacheToken,
    config: Config,
}

impl<V: MotionValue> TrackMixer<V> {
    pub fn new(track: Track<V>, binding: TargetBinding<V>, config: Config) -> Self {
        let token = CacheToken::new(config.color_space);
        let binding = binding.with_report_once(config.report_invalid_target_once);
        Self {
            track,
            binding,
            evaluator: MotionEvaluator::new(token),
            token,
            config,
        }
    }

    pub fn track(&self) -> &Track<V> {
        &self.track
    }

    /// Mutable track access for authoring edits. Bumps the cache token.
    pub fn track_mut(&mut self) -> &mut Track<V> {
        self.invalidate();
        &mut self.track
    }

    pub fn binding(&self) -> &TargetBinding<V> {
        &self.binding
    }

    pub fn token(&self) -> CacheToken {
        self.token
    }

    /// Force the next frame to recalculate the layout and conversion caches.
    pub fn invalidate(&mut self) {
        self.token = self.token.next_generation();
    }

    pub fn set_color_space(&mut self, space: ColorBlendSpace) {
        self.config.color_space = space;
        self.token.color_space = space;
    }

    /// The captured default, or the kind's neutral value if the target could
    /// not be read.
    pub fn default_value(&mut self) -> V {
        self.binding
            .capture_default()
            .unwrap_or_else(|| V::zero().finalize())
    }

    /// Process one frame with driver-supplied samples (one per clip, in
    /// track order).
    pub fn process_frame(
        &mut self,
        time: f64,
        samples: &[ClipSample],
    ) -> Result<MixFrame<V>, MotionError> {
        let default = self.default_value();
        let layout_refreshed = self.track.refresh(self.token);
        self.evaluator.sync(self.token);

        let input = self.track.blend_input(time, samples)?;
        let result = blend(&mut self.evaluator, &input, default)?;

        let redundant = self.config.skip_redundant_default_writes
            && result.state.is_default()
            && self.binding.current() == Some(result.value);
        let write = if redundant {
            None
        } else {
            Some(self.binding.apply(result.value))
        };
        Ok(MixFrame {
            value: result.value,
            state: result.state,
            write,
            layout_refreshed,
        })
    }

    /// Process one frame using the reference driver's samples.
    pub fn process_at(&mut self, time: f64) -> Result<MixFrame<V>, MotionError> {
        // Samples must follow the refreshed (sorted) clip order.
        let refreshed = self.track.refresh(self.token);
        let samples = self.track.sample(time);
        let mut frame = self.process_frame(time, &samples)?;
        frame.layout_refreshed |= refreshed;
        Ok(frame)
    }

    /// Restore the target's default. Returns whether a restore was written.
    pub fn teardown(&mut self) -> bool {
        self.binding.release()
    }
}

/// Type-erased mixer, so tracks of different kinds can share a director.
pub trait Mixer {
    fn track_id(&self) -> TrackId;
    fn target(&self) -> &str;
    fn kind(&self) -> ValueKind;
    fn tick(&mut self, time: f64) -> Result<MixFrame<Value>, MotionError>;
    fn rejected_clips(&self) -> Vec<(ClipId, String)>;
    fn invalidate(&mut self);
    fn set_color_space(&mut self, space: ColorBlendSpace);
    fn teardown(&mut self) -> bool;
}

impl<V: MotionValue> Mixer for TrackMixer<V> {
    fn track_id(&self) -> TrackId {
        self.track.id
    }

    fn target(&self) -> &str {
        &self.track.target
    }

    fn kind(&self) -> ValueKind {
        V::KIND
    }

    fn tick(&mut self, time: f64) -> Result<MixFrame<Value>, MotionError> {
        self.process_at(time).map(MixFrame::into_dynamic)
    }

    fn rejected_clips(&self) -> Vec<(ClipId, String)> {
        self.track
            .rejected()
            .iter()
            .map(|(id, err)| (*id, err.to_string()))
            .collect()
    }

    fn invalidate(&mut self) {
        TrackMixer::invalidate(self);
    }

    fn set_color_space(&mut self, space: ColorBlendSpace) {
        TrackMixer::set_color_space(self, space);
    }

    fn teardown(&mut self) -> bool {
        TrackMixer::teardown(self)
    }
}
