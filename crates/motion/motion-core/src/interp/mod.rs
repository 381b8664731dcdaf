//! Scalar interpolation helpers shared by value types and curves.
//!
//! Includes component-wise lerp, quaternion NLERP with shortest-arc sign
//! correction, cubic-bezier timing and cubic Hermite segments.

pub mod functions;

pub use functions::{bezier_ease_t, hermite, lerp_array, lerp_f32, nlerp_quat};
