//! Core configuration for motion-core.

use serde::{Deserialize, Serialize};

use crate::error::MotionError;
use crate::value::ColorBlendSpace;

/// Mixer-wide evaluation settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Space in which color endpoints are interpolated and blended.
    pub color_space: ColorBlendSpace,

    /// Skip the before-first-clip write when the sink already holds the default.
    pub skip_redundant_default_writes: bool,

    /// Report a lost target once per binding instead of every tick.
    pub report_invalid_target_once: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_space: ColorBlendSpace::Srgb,
            skip_redundant_default_writes: true,
            report_invalid_target_once: true,
        }
    }
}

impl Config {
    /// Parse a config from JSON; missing fields fall back to defaults.
    pub fn from_json(s: &str) -> Result<Self, MotionError> {
        serde_json::from_str(s).map_err(|e| MotionError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_uses_defaults() {
        let cfg = Config::from_json(r#"{ "colorSpace": "linear" }"#).unwrap();
        assert_eq!(cfg.color_space, ColorBlendSpace::Linear);
        assert!(cfg.skip_redundant_default_writes);
        assert!(cfg.report_invalid_target_once);
    }

    #[test]
    fn malformed_json_is_config_error() {
        let err = Config::from_json("{ nope").unwrap_err();
        assert!(matches!(err, MotionError::Config(_)));
    }
}
