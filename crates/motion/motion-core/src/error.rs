//! Error taxonomy for clip validation, evaluation and target writes.

use thiserror::Error;

use crate::value::ValueKind;

/// Errors produced by motion-core.
///
/// Authoring problems (`MissingCurve`, `InvalidCurve`, `InvalidClipBounds`) are
/// reported when a track's layout is recalculated and block only the affected
/// clip. Sink problems (`InvalidTarget`) are skip-and-continue at runtime.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MotionError {
    #[error("clip '{clip}' has no easing curve for axis {axis}")]
    MissingCurve { clip: String, axis: usize },

    #[error("curve of clip '{clip}' is malformed: {reason}")]
    InvalidCurve { clip: String, reason: String },

    #[error("clip '{clip}' has invalid bounds [{start}, {end}]")]
    InvalidClipBounds { clip: String, start: f64, end: f64 },

    #[error("target '{target}' is no longer valid")]
    InvalidTarget { target: String },

    #[error("property '{property}' not found on target '{target}'")]
    UnknownProperty { target: String, property: String },

    #[error("value kind mismatch: expected {expected:?}, found {found:?}")]
    KindMismatch {
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("expected {expected} clip samples, got {found}")]
    SampleCountMismatch { expected: usize, found: usize },

    #[error("cannot blend {kind:?} values across {count} weighted clips")]
    UnsupportedBlend { kind: ValueKind, count: usize },

    #[error("timeline json parse error: {0}")]
    Parse(String),

    #[error("config error: {0}")]
    Config(String),
}

impl MotionError {
    /// Whether this error is an authoring-time validation failure.
    pub fn is_authoring(&self) -> bool {
        matches!(
            self,
            MotionError::MissingCurve { .. }
                | MotionError::InvalidCurve { .. }
                | MotionError::InvalidClipBounds { .. }
        )
    }
}
