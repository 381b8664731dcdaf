//! Normalized-time curve evaluator: `(clip, normalized time)` -> typed value.
//!
//! Values move through two spaces:
//! - stored: what clips, defaults and sinks hold
//! - working: what interpolation and blending operate in (differs from
//!   stored only for colors under [`ColorBlendSpace::Linear`])
//!
//! Working-space endpoints are cached per clip and dropped whenever the
//! evaluator is synced to a different [`CacheToken`].

use hashbrown::HashMap;

use crate::clip::{AxisMask, ClipInstance, CurveUsageMode};
use crate::curve::Curve;
use crate::error::MotionError;
use crate::ids::ClipId;
use crate::interp::functions::lerp_f32;
use crate::value::{ColorBlendSpace, MotionValue};

/// Explicit cache-invalidation token. Bump `generation` whenever the clip
/// layout changes; change `color_space` to switch interpolation space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheToken {
    pub generation: u64,
    pub color_space: ColorBlendSpace,
}

impl CacheToken {
    pub fn new(color_space: ColorBlendSpace) -> Self {
        Self {
            generation: 0,
            color_space,
        }
    }

    #[must_use]
    pub fn next_generation(self) -> Self {
        Self {
            generation: self.generation.wrapping_add(1),
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Endpoints<V> {
    raw_start: V,
    raw_end: V,
    start: V,
    end: V,
}

/// Evaluates clips of one value type. Holds only a conversion cache; results
/// never depend on evaluation history.
#[derive(Debug)]
pub struct MotionEvaluator<V: MotionValue> {
    token: CacheToken,
    endpoints: HashMap<ClipId, Endpoints<V>>,
}

impl<V: MotionValue> MotionEvaluator<V> {
    pub fn new(token: CacheToken) -> Self {
        Self {
            token,
            endpoints: HashMap::new(),
        }
    }

    #[inline]
    pub fn token(&self) -> CacheToken {
        self.token
    }

    #[inline]
    pub fn color_space(&self) -> ColorBlendSpace {
        self.token.color_space
    }

    /// Adopt `token`, dropping cached endpoints if it differs. Returns whether
    /// the cache was invalidated.
    pub fn sync(&mut self, token: CacheToken) -> bool {
        if token == self.token {
            return false;
        }
        self.token = token;
        self.endpoints.clear();
        true
    }

    fn endpoints(&mut self, clip: &ClipInstance<V>) -> (V, V) {
        let space = self.token.color_space;
        let entry = self.endpoints.entry(clip.id).or_insert_with(|| Endpoints {
            raw_start: clip.start_value,
            raw_end: clip.end_value,
            start: clip.start_value.to_working(space),
            end: clip.end_value.to_working(space),
        });
        if entry.raw_start != clip.start_value || entry.raw_end != clip.end_value {
            *entry = Endpoints {
                raw_start: clip.start_value,
                raw_end: clip.end_value,
                start: clip.start_value.to_working(space),
                end: clip.end_value.to_working(space),
            };
        }
        (entry.start, entry.end)
    }

    /// Contribution of `clip` at normalized time `t`, in working space.
    ///
    /// `default` (stored space) fills disabled axes. `t` is not clamped;
    /// extrapolation is the blender's concern.
    pub fn evaluate_working(
        &mut self,
        clip: &ClipInstance<V>,
        t: f32,
        default: V,
    ) -> Result<V, MotionError> {
        let space = self.token.color_space;
        match clip.curve_usage {
            CurveUsageMode::NonDirect => {
                let (start, end) = self.endpoints(clip);
                let mut out = default.to_working(space);
                if clip.axis_curves.is_empty() {
                    let Some(axis) = first_enabled_axis::<V>(clip.axes) else {
                        return Ok(out);
                    };
                    let curve = clip.curve.as_ref().ok_or_else(|| MotionError::MissingCurve {
                        clip: clip.name.clone(),
                        axis,
                    })?;
                    let value = V::lerp(start, end, curve.evaluate(t));
                    if all_enabled::<V>(clip.axes) {
                        return Ok(value);
                    }
                    copy_enabled(&mut out, &value, clip.axes);
                } else {
                    for axis in enabled_axes::<V>(clip.axes) {
                        let f = axis_curve(clip, axis)?.evaluate(t);
                        let c = lerp_f32(start.component(axis), end.component(axis), f);
                        out.set_component(axis, c);
                    }
                }
                Ok(out)
            }
            CurveUsageMode::Direct | CurveUsageMode::DirectWithScale { .. } => {
                let scale = match clip.curve_usage {
                    CurveUsageMode::DirectWithScale { scale } => scale,
                    _ => 1.0,
                };
                // Direct curves produce stored-space values.
                let mut out = default;
                for axis in enabled_axes::<V>(clip.axes) {
                    let c = axis_curve(clip, axis)?.evaluate(t) * scale;
                    out.set_component(axis, c);
                }
                Ok(out.to_working(space))
            }
        }
    }

    /// Value of `clip` at normalized time `t`, in stored space. Disabled axes
    /// equal `default` exactly.
    pub fn evaluate(
        &mut self,
        clip: &ClipInstance<V>,
        t: f32,
        default: V,
    ) -> Result<V, MotionError> {
        let working = self.evaluate_working(clip, t, default)?;
        let stored = working.finalize().from_working(self.token.color_space);
        Ok(restore_disabled(stored, default, clip.axes))
    }
}

fn axis_curve<V: MotionValue>(
    clip: &ClipInstance<V>,
    axis: usize,
) -> Result<&Curve, MotionError> {
    clip.curve_for_axis(axis)
        .ok_or_else(|| MotionError::MissingCurve {
            clip: clip.name.clone(),
            axis,
        })
}

#[inline]
fn enabled_axes<V: MotionValue>(mask: AxisMask) -> impl Iterator<Item = usize> {
    (0..V::COMPONENTS).filter(move |a| mask.is_enabled(*a))
}

#[inline]
fn first_enabled_axis<V: MotionValue>(mask: AxisMask) -> Option<usize> {
    enabled_axes::<V>(mask).next()
}

#[inline]
fn all_enabled<V: MotionValue>(mask: AxisMask) -> bool {
    (0..V::COMPONENTS).all(|a| mask.is_enabled(a))
}

#[inline]
fn copy_enabled<V: MotionValue>(dst: &mut V, src: &V, mask: AxisMask) {
    for axis in enabled_axes::<V>(mask) {
        dst.set_component(axis, src.component(axis));
    }
}

/// Replace every axis not enabled in `mask` with the matching `default` component.
pub(crate) fn restore_disabled<V: MotionValue>(value: V, default: V, mask: AxisMask) -> V {
    if all_enabled::<V>(mask) {
        return value;
    }
    let mut out = default;
    copy_enabled(&mut out, &value, mask);
    out
}
