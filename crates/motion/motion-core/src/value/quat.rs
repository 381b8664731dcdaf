use serde::{Deserialize, Serialize};

use super::{MotionValue, Value, ValueKind};
use crate::interp::functions::{dot4, nlerp_quat, normalize4};

/// Rotation quaternion (x, y, z, w).
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quat(pub [f32; 4]);

impl Quat {
    pub const IDENTITY: Quat = Quat([0.0, 0.0, 0.0, 1.0]);

    /// Rotation of `angle` radians around a unit `axis`.
    pub fn from_axis_angle(axis: [f32; 3], angle: f32) -> Self {
        let (s, c) = (angle * 0.5).sin_cos();
        Quat([axis[0] * s, axis[1] * s, axis[2] * s, c])
    }
}

impl Default for Quat {
    fn default() -> Self {
        Quat::IDENTITY
    }
}

impl MotionValue for Quat {
    const KIND: ValueKind = ValueKind::Quat;
    const COMPONENTS: usize = 4;

    #[inline]
    fn zero() -> Self {
        Quat([0.0; 4])
    }
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Quat(nlerp_quat(a.0, b.0, t))
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        let a = self.0;
        let b = rhs.0;
        Quat([a[0] + b[0], a[1] + b[1], a[2] + b[2], a[3] + b[3]])
    }
    #[inline]
    fn scale(self, w: f32) -> Self {
        Quat(self.0.map(|c| c * w))
    }
    #[inline]
    fn component(&self, axis: usize) -> f32 {
        self.0[axis]
    }
    #[inline]
    fn set_component(&mut self, axis: usize, v: f32) {
        self.0[axis] = v;
    }

    /// Flip contributions into the accumulator's hemisphere before summing.
    #[inline]
    fn accumulate(self, v: Self, w: f32) -> Self {
        let v = if dot4(self.0, v.0) < 0.0 { v.scale(-1.0) } else { v };
        self.add(v.scale(w))
    }

    #[inline]
    fn finalize(self) -> Self {
        Quat(normalize4(self.0))
    }

    fn to_value(self) -> Value {
        Value::Quat(self.0)
    }
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Quat(q) => Some(Quat(*q)),
            _ => None,
        }
    }
}
