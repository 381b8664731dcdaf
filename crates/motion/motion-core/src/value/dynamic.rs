use serde::{Deserialize, Serialize};

use super::ValueKind;

/// Untyped value carried by dynamic sinks, outputs and baked data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum Value {
    /// Scalar float
    Float(f32),

    /// 2D vector
    Vec2([f32; 2]),

    /// 3D vector
    Vec3([f32; 3]),

    /// 4D vector
    Vec4([f32; 4]),

    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),

    /// RGBA color
    ColorRgba([f32; 4]),

    /// Sprite/texture array index (step only)
    Index(u32),
}

impl Value {
    /// Return the coarse kind of this value.
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Index(_) => ValueKind::Index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_type_tag() {
        let v = serde_json::to_value(Value::Vec3([1.0, 2.0, 3.0])).unwrap();
        assert_eq!(v, json!({ "type": "vec3", "data": [1.0, 2.0, 3.0] }));
        let c = serde_json::to_value(Value::ColorRgba([0.0, 0.0, 0.0, 1.0])).unwrap();
        assert_eq!(c["type"], "colorRgba");
    }
}
