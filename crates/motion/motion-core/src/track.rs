//! Tracks: an ordered set of clips driving one target, plus the cached
//! layout (clip bounds and authoring validation) valid for one cache token.

use hashbrown::HashMap;

use crate::blend::{BlendInput, ClipSample};
use crate::clip::{ClipInstance, ClipSchedule};
use crate::error::MotionError;
use crate::evaluator::CacheToken;
use crate::ids::{ClipId, TrackId};
use crate::schedule::sample_playable_clips;
use crate::value::MotionValue;

/// Authoritative clip placement supplied by the authoring side.
pub trait ClipLayout {
    fn schedule(&self, clip: ClipId) -> Option<ClipSchedule>;
}

impl ClipLayout for HashMap<ClipId, ClipSchedule> {
    fn schedule(&self, clip: ClipId) -> Option<ClipSchedule> {
        self.get(&clip).copied()
    }
}

#[derive(Clone, Debug)]
struct LayoutCache {
    token: CacheToken,
    rejected: Vec<(ClipId, MotionError)>,
}

#[derive(Clone, Debug)]
pub struct Track<V: MotionValue> {
    pub id: TrackId,
    pub name: String,
    /// Canonical target path (e.g. "player/Transform.position").
    pub target: String,
    clips: Vec<ClipInstance<V>>,
    cache: Option<LayoutCache>,
}

impl<V: MotionValue> Track<V> {
    pub fn new(id: TrackId, name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            target: target.into(),
            clips: Vec::new(),
            cache: None,
        }
    }

    #[must_use]
    pub fn with_clips(mut self, clips: Vec<ClipInstance<V>>) -> Self {
        self.clips = clips;
        self.cache = None;
        self
    }

    pub fn push_clip(&mut self, clip: ClipInstance<V>) {
        self.clips.push(clip);
        self.invalidate();
    }

    /// Clips in track order. Sorted by start once the layout is recalculated.
    #[inline]
    pub fn clips(&self) -> &[ClipInstance<V>] {
        &self.clips
    }

    /// Mutable access to one clip for authoring edits; invalidates the layout.
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut ClipInstance<V>> {
        self.cache = None;
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// Drop the cached layout; the next refresh recalculates it.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Overwrite clip schedules from an authoritative layout.
    pub fn apply_layout(&mut self, layout: &impl ClipLayout) {
        for clip in &mut self.clips {
            if let Some(schedule) = layout.schedule(clip.id) {
                clip.schedule = schedule;
            }
        }
        self.invalidate();
    }

    /// Recompute every clip's cached bounds from its schedule, restore start
    /// order and validate. Returns the rejected clips' errors.
    pub fn recalculate_all_clips_start_and_end(&mut self) -> Vec<(ClipId, MotionError)> {
        for clip in &mut self.clips {
            clip.recalculate_start_and_end();
        }
        self.clips.sort_by(|a, b| a.start().total_cmp(&b.start()));
        let mut rejected = Vec::new();
        for clip in &self.clips {
            if let Err(err) = clip.validate() {
                log::warn!("track '{}': clip rejected: {err}", self.name);
                rejected.push((clip.id, err));
            }
        }
        rejected
    }

    /// Recalculate the layout if it is missing or was computed for another
    /// token. Returns whether a recalculation happened.
    pub fn refresh(&mut self, token: CacheToken) -> bool {
        if self.cache.as_ref().is_some_and(|c| c.token == token) {
            return false;
        }
        let rejected = self.recalculate_all_clips_start_and_end();
        log::debug!(
            "track '{}': layout recalculated ({} clips, {} rejected, generation {})",
            self.name,
            self.clips.len(),
            rejected.len(),
            token.generation
        );
        self.cache = Some(LayoutCache { token, rejected });
        true
    }

    /// Clips excluded from playback by the last layout pass.
    pub fn rejected(&self) -> &[(ClipId, MotionError)] {
        self.cache.as_ref().map(|c| c.rejected.as_slice()).unwrap_or(&[])
    }

    pub fn is_playable(&self, clip: ClipId) -> bool {
        !self.rejected().iter().any(|(id, _)| *id == clip)
    }

    /// Sample every clip at `time` with the reference driver. Rejected clips
    /// get weight 0 and do not cross-fade their neighbours.
    pub fn sample(&self, time: f64) -> Vec<ClipSample> {
        sample_playable_clips(&self.clips, time, |c| self.is_playable(c.id))
    }

    /// Pair driver samples (one per clip, track order) with playable clips.
    pub fn blend_input(
        &self,
        time: f64,
        samples: &[ClipSample],
    ) -> Result<BlendInput<'_, V>, MotionError> {
        if samples.len() != self.clips.len() {
            return Err(MotionError::SampleCountMismatch {
                expected: self.clips.len(),
                found: samples.len(),
            });
        }
        let mut input = BlendInput::new(time);
        for (clip, s) in self.clips.iter().zip(samples) {
            if self.is_playable(clip.id) {
                input = input.with_entry(clip, s.weight, s.local_time);
            }
        }
        Ok(input)
    }

    /// Earliest start and latest end over playable clips.
    pub fn span(&self) -> Option<(f64, f64)> {
        self.clips
            .iter()
            .filter(|c| self.is_playable(c.id))
            .fold(None, |acc, c| match acc {
                None => Some((c.start(), c.end())),
                Some((s, e)) => Some((s.min(c.start()), e.max(c.end()))),
            })
    }
}
