use serde::{Deserialize, Serialize};

use super::{MotionValue, Value, ValueKind};
use crate::interp::functions::lerp_f32;

/// Index into a sprite/texture array. Discrete: never cross-faded.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteIndex(pub u32);

impl SpriteIndex {
    /// Endpoints for a clip stepping through `count` sprites: `0 ..= count - 1`.
    pub fn sequence(count: u32) -> (SpriteIndex, SpriteIndex) {
        (SpriteIndex(0), SpriteIndex(count.saturating_sub(1)))
    }

    #[inline]
    fn from_f32(v: f32) -> Self {
        if v.is_finite() && v > 0.0 {
            SpriteIndex(v.round() as u32)
        } else {
            SpriteIndex(0)
        }
    }
}

impl MotionValue for SpriteIndex {
    const KIND: ValueKind = ValueKind::Index;
    const COMPONENTS: usize = 1;
    const BLENDABLE: bool = false;

    #[inline]
    fn zero() -> Self {
        SpriteIndex(0)
    }
    /// `round(lerp(a, b, t))`
    #[inline]
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Self::from_f32(lerp_f32(a.0 as f32, b.0 as f32, t))
    }
    #[inline]
    fn add(self, rhs: Self) -> Self {
        SpriteIndex(self.0.saturating_add(rhs.0))
    }
    #[inline]
    fn scale(self, w: f32) -> Self {
        Self::from_f32(self.0 as f32 * w)
    }
    #[inline]
    fn component(&self, _axis: usize) -> f32 {
        self.0 as f32
    }
    #[inline]
    fn set_component(&mut self, _axis: usize, v: f32) {
        *self = Self::from_f32(v);
    }
    fn to_value(self) -> Value {
        Value::Index(self.0)
    }
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::Index(i) => Some(SpriteIndex(*i)),
            _ => None,
        }
    }
}
