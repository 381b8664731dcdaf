//! Clip extrapolation & blend engine.
//!
//! Per tick and per track, the clips are scanned in track order:
//! - while no weight has been seen, a clip whose end has passed applies its
//!   extrapolation policy, and the first clip otherwise yields the default
//!   (both provisional: a later rule in scan order overwrites them)
//! - once weight has been seen, every weighted clip contributes
//!   `evaluate(clip, local_time) * weight`
//! - if any clip contributed, the weighted sum replaces whatever the
//!   provisional rules produced
//!
//! Weights are trusted as given and never renormalized. Non-blendable kinds
//! (sprite index) take the last weighted clip's value instead of a sum.

use serde::{Deserialize, Serialize};

use crate::clip::{AxisMask, ClipInstance, Extrapolation};
use crate::error::MotionError;
use crate::evaluator::{restore_disabled, MotionEvaluator};
use crate::ids::ClipId;
use crate::value::MotionValue;

/// Driver-supplied per-clip input for one tick.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSample {
    /// Cross-fade weight in [0,1].
    pub weight: f32,
    /// Clip-local normalized time in [0,1].
    pub local_time: f32,
}

impl ClipSample {
    pub fn new(weight: f32, local_time: f32) -> Self {
        Self { weight, local_time }
    }

    pub const INACTIVE: ClipSample = ClipSample {
        weight: 0.0,
        local_time: 0.0,
    };
}

/// One row of a [`BlendInput`].
#[derive(Clone, Copy, Debug)]
pub struct BlendEntry<'a, V: MotionValue> {
    pub clip: &'a ClipInstance<V>,
    pub weight: f32,
    pub local_time: f32,
}

/// Per-tick snapshot of one track: evaluation time plus every clip in track
/// order (index 0 = earliest).
#[derive(Clone, Debug)]
pub struct BlendInput<'a, V: MotionValue> {
    pub time: f64,
    pub entries: Vec<BlendEntry<'a, V>>,
}

impl<'a, V: MotionValue> BlendInput<'a, V> {
    pub fn new(time: f64) -> Self {
        Self {
            time,
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_entry(mut self, clip: &'a ClipInstance<V>, weight: f32, local_time: f32) -> Self {
        self.entries.push(BlendEntry {
            clip,
            weight,
            local_time,
        });
        self
    }

    /// Pair `clips` with driver `samples` one-to-one.
    pub fn from_samples(
        time: f64,
        clips: &'a [ClipInstance<V>],
        samples: &[ClipSample],
    ) -> Result<Self, MotionError> {
        if clips.len() != samples.len() {
            return Err(MotionError::SampleCountMismatch {
                expected: clips.len(),
                found: samples.len(),
            });
        }
        let entries = clips
            .iter()
            .zip(samples)
            .map(|(clip, s)| BlendEntry {
                clip,
                weight: s.weight,
                local_time: s.local_time,
            })
            .collect();
        Ok(Self { time, entries })
    }
}

/// Which rule produced a tick's output.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum BlendState {
    /// The track has no clips.
    Empty,
    /// No clip is weighted and the first clip has not ended.
    BeforeFirstClip,
    /// `active` clips carried weight this tick.
    OnClips { active: usize },
    /// Gap after `clip`, frozen at its end value.
    Hold { clip: ClipId },
    /// Gap after `clip`, reverted to the default value.
    DefaultExtrapolation { clip: ClipId },
}

impl BlendState {
    /// Whether the output equals the binding default by construction.
    pub fn is_default(&self) -> bool {
        matches!(
            self,
            BlendState::Empty
                | BlendState::BeforeFirstClip
                | BlendState::DefaultExtrapolation { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BlendResult<V> {
    pub value: V,
    pub state: BlendState,
}

/// Blend one track for one tick. `default` is the binding's captured
/// default value (stored space).
pub fn blend<V: MotionValue>(
    evaluator: &mut MotionEvaluator<V>,
    input: &BlendInput<'_, V>,
    default: V,
) -> Result<BlendResult<V>, MotionError> {
    let mut output = BlendResult {
        value: default,
        state: BlendState::Empty,
    };
    let mut blended = V::zero();
    let mut last_weighted: Option<V> = None;
    let mut accumulated = 0.0f32;
    let mut active = 0usize;
    let mut animated = AxisMask::NONE;

    for (i, entry) in input.entries.iter().enumerate() {
        accumulated += entry.weight;
        if accumulated == 0.0 {
            if input.time >= entry.clip.end() {
                output = extrapolate(evaluator, entry.clip, default)?;
            } else if i == 0 {
                output = BlendResult {
                    value: default,
                    state: BlendState::BeforeFirstClip,
                };
            }
            continue;
        }
        if entry.weight <= 0.0 {
            continue;
        }
        let v = evaluator.evaluate_working(entry.clip, entry.local_time, default)?;
        if V::BLENDABLE {
            blended = blended.accumulate(v, entry.weight);
        } else {
            last_weighted = Some(v);
        }
        animated = animated.union(entry.clip.axes);
        active += 1;
    }

    if active > 0 {
        let working = if V::BLENDABLE {
            blended
        } else {
            if active > 1 {
                log::debug!(
                    "{:?} clips overlap ({active} weighted); last in track order wins",
                    V::KIND
                );
            }
            last_weighted.unwrap_or(blended)
        };
        let value = working.finalize().from_working(evaluator.color_space());
        output = BlendResult {
            value: restore_disabled(value, default, animated),
            state: BlendState::OnClips { active },
        };
    }
    Ok(output)
}

fn extrapolate<V: MotionValue>(
    evaluator: &mut MotionEvaluator<V>,
    clip: &ClipInstance<V>,
    default: V,
) -> Result<BlendResult<V>, MotionError> {
    Ok(match clip.extrapolation {
        Extrapolation::Hold => BlendResult {
            value: evaluator.evaluate(clip, 1.0, default)?,
            state: BlendState::Hold { clip: clip.id },
        },
        Extrapolation::Default => BlendResult {
            value: default,
            state: BlendState::DefaultExtrapolation { clip: clip.id },
        },
    })
}

/// Plain weighted sum of contributions. Refuses to sum more than one weighted
/// contribution of a non-blendable kind; the engine resolves those by
/// last-wins instead.
pub fn weighted_sum<V: MotionValue>(contributions: &[(V, f32)]) -> Result<V, MotionError> {
    let weighted = contributions.iter().filter(|(_, w)| *w > 0.0).count();
    if !V::BLENDABLE && weighted > 1 {
        return Err(MotionError::UnsupportedBlend {
            kind: V::KIND,
            count: weighted,
        });
    }
    Ok(contributions
        .iter()
        .filter(|(_, w)| *w > 0.0)
        .fold(V::zero(), |acc, (v, w)| acc.accumulate(*v, *w))
        .finalize())
}
