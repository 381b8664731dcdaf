//! Clip instances: one scheduled motion segment on a track.

use serde::{Deserialize, Serialize};

use crate::curve::Curve;
use crate::error::MotionError;
use crate::ids::ClipId;
use crate::value::{MotionValue, SpriteIndex};

/// Behavior once the evaluation time is at/after a clip's end and no later
/// clip has started.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Extrapolation {
    /// Freeze at the clip's own end value.
    #[default]
    Hold,
    /// Fall back to the binding's captured default value.
    Default,
}

/// How a clip's curve output is turned into a value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum CurveUsageMode {
    /// Curve output is the blend factor between start and end value.
    #[default]
    NonDirect,
    /// Curve output is the value.
    Direct,
    /// Curve output times `scale` is the value.
    DirectWithScale { scale: f32 },
}

/// Per-axis/channel enable flags. Bit `i` set means axis `i` is animated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisMask(pub u8);

impl AxisMask {
    pub const ALL: AxisMask = AxisMask(0b1111);
    pub const NONE: AxisMask = AxisMask(0);

    #[inline]
    pub fn is_enabled(self, axis: usize) -> bool {
        axis < 8 && self.0 & (1 << axis) != 0
    }

    #[must_use]
    pub fn with(self, axis: usize, enabled: bool) -> Self {
        if axis >= 8 {
            return self;
        }
        if enabled {
            AxisMask(self.0 | (1 << axis))
        } else {
            AxisMask(self.0 & !(1 << axis))
        }
    }

    #[must_use]
    pub fn union(self, other: AxisMask) -> Self {
        AxisMask(self.0 | other.0)
    }

    /// Build a mask from a list of per-axis flags.
    pub fn from_flags(flags: &[bool]) -> Self {
        flags
            .iter()
            .enumerate()
            .fold(AxisMask::NONE, |m, (i, on)| m.with(i, *on))
    }
}

impl Default for AxisMask {
    fn default() -> Self {
        AxisMask::ALL
    }
}

/// Authored placement of a clip on its track, in seconds.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipSchedule {
    pub start: f64,
    pub duration: f64,
    /// Manual fade-in length; overlaps with the previous clip may lengthen it.
    #[serde(default)]
    pub ease_in: f64,
    /// Manual fade-out length; overlaps with the next clip may lengthen it.
    #[serde(default)]
    pub ease_out: f64,
}

impl ClipSchedule {
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            duration,
            ease_in: 0.0,
            ease_out: 0.0,
        }
    }

    #[inline]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// One scheduled motion segment with typed endpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct ClipInstance<V: MotionValue> {
    pub id: ClipId,
    pub name: String,
    pub schedule: ClipSchedule,
    /// Cached absolute bounds, refreshed from `schedule` by the owning track.
    pub(crate) start: f64,
    pub(crate) end: f64,
    pub start_value: V,
    pub end_value: V,
    /// Shared curve for every enabled axis.
    pub curve: Option<Curve>,
    /// Per-axis curves; empty means "use `curve` for every axis".
    pub axis_curves: Vec<Option<Curve>>,
    pub extrapolation: Extrapolation,
    pub curve_usage: CurveUsageMode,
    pub axes: AxisMask,
}

impl<V: MotionValue> ClipInstance<V> {
    /// A clip over `schedule` from `start_value` to `end_value` with a linear
    /// shared curve, hold extrapolation and every axis enabled.
    pub fn new(
        id: ClipId,
        name: impl Into<String>,
        schedule: ClipSchedule,
        start_value: V,
        end_value: V,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            schedule,
            start: schedule.start,
            end: schedule.end(),
            start_value,
            end_value,
            curve: Some(Curve::Linear),
            axis_curves: Vec::new(),
            extrapolation: Extrapolation::Hold,
            curve_usage: CurveUsageMode::NonDirect,
            axes: AxisMask::ALL,
        }
    }

    #[must_use]
    pub fn with_curve(mut self, curve: Option<Curve>) -> Self {
        self.curve = curve;
        self
    }

    #[must_use]
    pub fn with_axis_curves(mut self, curves: Vec<Option<Curve>>) -> Self {
        self.axis_curves = curves;
        self
    }

    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    #[must_use]
    pub fn with_curve_usage(mut self, usage: CurveUsageMode) -> Self {
        self.curve_usage = usage;
        self
    }

    #[must_use]
    pub fn with_axes(mut self, axes: AxisMask) -> Self {
        self.axes = axes;
        self
    }

    /// Cached start bound (seconds).
    #[inline]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Cached end bound (seconds).
    #[inline]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Copy the authored schedule into the cached bounds.
    pub(crate) fn recalculate_start_and_end(&mut self) {
        self.start = self.schedule.start;
        self.end = self.schedule.end();
    }

    /// The curve driving `axis`, if any.
    pub fn curve_for_axis(&self, axis: usize) -> Option<&Curve> {
        if self.axis_curves.is_empty() {
            self.curve.as_ref()
        } else {
            self.axis_curves.get(axis).and_then(|c| c.as_ref())
        }
    }

    /// Authoring-time validation: bounds and a valid curve for each enabled axis.
    pub fn validate(&self) -> Result<(), MotionError> {
        if !(self.start.is_finite() && self.end.is_finite()) || self.end <= self.start {
            return Err(MotionError::InvalidClipBounds {
                clip: self.name.clone(),
                start: self.start,
                end: self.end,
            });
        }
        for axis in 0..V::COMPONENTS {
            if !self.axes.is_enabled(axis) {
                continue;
            }
            match self.curve_for_axis(axis) {
                None => {
                    return Err(MotionError::MissingCurve {
                        clip: self.name.clone(),
                        axis,
                    })
                }
                Some(curve) => curve.validate().map_err(|reason| MotionError::InvalidCurve {
                    clip: self.name.clone(),
                    reason,
                })?,
            }
        }
        Ok(())
    }
}

impl ClipInstance<SpriteIndex> {
    /// Sprite-sequence clip stepping linearly through `count` sprites.
    pub fn sprite_sequence(
        id: ClipId,
        name: impl Into<String>,
        schedule: ClipSchedule,
        count: u32,
    ) -> Self {
        let (first, last) = SpriteIndex::sequence(count);
        ClipInstance::new(id, name, schedule, first, last)
    }
}
