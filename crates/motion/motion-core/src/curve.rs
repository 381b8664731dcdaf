//! Easing curves mapping normalized clip time to a real number.
//!
//! Output is not bounded to [0,1] so curves can overshoot. Keyed curves
//! clamp outside their key range (the first/last key value is held).

use serde::{Deserialize, Serialize};

use crate::interp::functions::{bezier_ease_t, hermite};

/// A single key of a [`Curve::Keyed`] curve. Tangents are slopes (value per
/// unit of normalized time).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveKey {
    pub time: f32,
    pub value: f32,
    #[serde(default)]
    pub in_tangent: f32,
    #[serde(default)]
    pub out_tangent: f32,
}

impl CurveKey {
    pub fn new(time: f32, value: f32, in_tangent: f32, out_tangent: f32) -> Self {
        Self {
            time,
            value,
            in_tangent,
            out_tangent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Curve {
    /// y = t
    Linear,
    /// Constant output, typically used with direct curve usage.
    Constant(f32),
    /// CSS-style cubic bezier timing with control points (x1, y1, x2, y2).
    Bezier([f32; 4]),
    /// Hermite keyframes sorted by time.
    Keyed(Vec<CurveKey>),
}

impl Curve {
    /// Smooth ease in and out between (0,0) and (1,1) with flat tangents.
    pub fn ease_in_out() -> Self {
        Curve::Keyed(vec![
            CurveKey::new(0.0, 0.0, 0.0, 0.0),
            CurveKey::new(1.0, 1.0, 0.0, 0.0),
        ])
    }

    /// Straight line from (0, from) to (1, to).
    pub fn linear_range(from: f32, to: f32) -> Self {
        let slope = to - from;
        Curve::Keyed(vec![
            CurveKey::new(0.0, from, slope, slope),
            CurveKey::new(1.0, to, slope, slope),
        ])
    }

    /// Evaluate at normalized time `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        match self {
            Curve::Linear => t,
            Curve::Constant(v) => *v,
            Curve::Bezier([x1, y1, x2, y2]) => bezier_ease_t(t, *x1, *y1, *x2, *y2),
            Curve::Keyed(keys) => evaluate_keys(keys, t),
        }
    }

    /// Check structural invariants; returns a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Curve::Linear => Ok(()),
            Curve::Constant(v) => {
                if v.is_finite() {
                    Ok(())
                } else {
                    Err("constant curve value must be finite".into())
                }
            }
            Curve::Bezier(ctrl) => {
                if ctrl.iter().any(|c| !c.is_finite()) {
                    return Err("bezier control points must be finite".into());
                }
                if !(0.0..=1.0).contains(&ctrl[0]) || !(0.0..=1.0).contains(&ctrl[2]) {
                    return Err("bezier x control points must lie in [0,1]".into());
                }
                Ok(())
            }
            Curve::Keyed(keys) => {
                if keys.is_empty() {
                    return Err("keyed curve has no keys".into());
                }
                let mut last = f32::NEG_INFINITY;
                for k in keys {
                    // Infinite tangents mark stepped keys; NaN never is.
                    if !(k.time.is_finite() && k.value.is_finite())
                        || k.in_tangent.is_nan()
                        || k.out_tangent.is_nan()
                    {
                        return Err(format!("key at time {} is not finite", k.time));
                    }
                    if k.time < last {
                        return Err("key times must be non-decreasing".into());
                    }
                    last = k.time;
                }
                Ok(())
            }
        }
    }
}

fn evaluate_keys(keys: &[CurveKey], t: f32) -> f32 {
    let (first, last) = match (keys.first(), keys.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return 0.0,
    };
    if t.is_nan() || t <= first.time {
        return first.value;
    }
    if t >= last.time {
        return last.value;
    }
    // First key strictly after t; keys are few so a partition search is enough.
    let hi = keys.partition_point(|k| k.time <= t);
    let k0 = &keys[hi - 1];
    let k1 = &keys[hi];
    if !(k0.out_tangent.is_finite() && k1.in_tangent.is_finite()) {
        // Stepped key
        return k0.value;
    }
    if k1.time - k0.time <= f32::EPSILON {
        return k1.value;
    }
    hermite(
        k0.time,
        k0.value,
        k0.out_tangent,
        k1.time,
        k1.value,
        k1.in_tangent,
        t,
    )
}
