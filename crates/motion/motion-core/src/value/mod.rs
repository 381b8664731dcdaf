//! Value kinds and the typed value abstraction used by the evaluator and blender.
//!
//! `MotionValue` is implemented for every animatable kind:
//! - `f32` (scalar, e.g. canvas-group alpha, shader floats)
//! - `[f32; 2]`, `[f32; 3]`, `[f32; 4]` (move/scale/generic vectors)
//! - [`Rgba`] colors
//! - [`Quat`] rotations
//! - [`SpriteIndex`] (discrete, non-blendable)
//!
//! The dynamic [`Value`] enum is what untyped sinks and outputs carry.

mod color;
mod dynamic;
mod index;
mod quat;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::interp::functions::{lerp_array, lerp_f32};

pub use color::{linear_to_srgb, srgb_to_linear, ColorBlendSpace, Rgba};
pub use dynamic::Value;
pub use index::SpriteIndex;
pub use quat::Quat;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    #[serde(rename = "color")]
    ColorRgba,
    #[serde(rename = "sprite")]
    Index,
}

impl ValueKind {
    /// Number of independently animatable axes/channels.
    pub fn component_count(self) -> usize {
        match self {
            ValueKind::Float | ValueKind::Index => 1,
            ValueKind::Vec2 => 2,
            ValueKind::Vec3 => 3,
            ValueKind::Vec4 | ValueKind::Quat | ValueKind::ColorRgba => 4,
        }
    }

    pub fn is_blendable(self) -> bool {
        !matches!(self, ValueKind::Index)
    }
}

/// A value type that can be interpolated between clip endpoints and blended
/// across weighted clips.
///
/// `accumulate`/`finalize` exist so kinds with non-linear structure
/// (quaternions) can apply sign correction and renormalization around the
/// plain weighted sum.
pub trait MotionValue: Copy + PartialEq + Debug + 'static {
    const KIND: ValueKind;
    const COMPONENTS: usize;
    /// Discrete kinds resolve overlaps by last-wins instead of a weighted sum.
    const BLENDABLE: bool = true;

    fn zero() -> Self;
    fn lerp(a: Self, b: Self, t: f32) -> Self;
    fn add(self, rhs: Self) -> Self;
    fn scale(self, w: f32) -> Self;

    fn component(&self, axis: usize) -> f32;
    fn set_component(&mut self, axis: usize, v: f32);

    #[inline]
    fn accumulate(self, v: Self, w: f32) -> Self {
        self.add(v.scale(w))
    }

    #[inline]
    fn finalize(self) -> Self {
        self
    }

    /// Convert from stored representation into the interpolation space.
    #[inline]
    fn to_working(self, _space: ColorBlendSpace) -> Self {
        self
    }

    /// Inverse of [`MotionValue::to_working`].
    #[inline]
    fn from_working(self, _space: ColorBlendSpace) -> Self {
        self
    }

    fn to_value(self) -> Value;
    fn from_value(v: &Value) -> Option<Self>;
}

impl MotionValue for f32 {
    const KIND: ValueKind = ValueKind::Float;
    const COMPONENTS: usize = 1;

    #[inline]
    fn zero() -> Self {
        0.0
    }
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        lerp_f32(a, b, t)
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        self + rhs
    }
    #[inline]
    fn scale(self, w: f32) -> Self {
        self * w
    }
    #[inline]
    fn component(&self, _axis: usize) -> f32 {
        *self
    }
    #[inline]
    fn set_component(&mut self, _axis: usize, v: f32) {
        *self = v;
    }
    fn to_value(self) -> Value {
        Value::Float(self)
    }
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }
}

macro_rules! impl_motion_value_array {
    ($n:literal, $kind:ident) => {
        impl MotionValue for [f32; $n] {
            const KIND: ValueKind = ValueKind::$kind;
            const COMPONENTS: usize = $n;

            #[inline]
            fn zero() -> Self {
                [0.0; $n]
            }
            #[inline]
            fn lerp(a: Self, b: Self, t: f32) -> Self {
                lerp_array(a, b, t)
            }
            #[inline]
            fn add(self, rhs: Self) -> Self {
                let mut out = self;
                for i in 0..$n {
                    out[i] += rhs[i];
                }
                out
            }
            #[inline]
            fn scale(self, w: f32) -> Self {
                self.map(|c| c * w)
            }
            #[inline]
            fn component(&self, axis: usize) -> f32 {
                self[axis]
            }
            #[inline]
            fn set_component(&mut self, axis: usize, v: f32) {
                self[axis] = v;
            }
            fn to_value(self) -> Value {
                Value::$kind(self)
            }
            fn from_value(v: &Value) -> Option<Self> {
                match v {
                    Value::$kind(a) => Some(*a),
                    _ => None,
                }
            }
        }
    };
}

impl_motion_value_array!(2, Vec2);
impl_motion_value_array!(3, Vec3);
impl_motion_value_array!(4, Vec4);
