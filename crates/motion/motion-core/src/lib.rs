//! Motion Core (engine-agnostic)
//!
//! Blended multi-clip motion evaluation for timeline tracks. Given a time, an
//! ordered set of clips (each with endpoints, an easing curve and an
//! extrapolation policy) and per-clip driver weights, produce one value per
//! track per tick and write it to a bound target.
//!
//! Pipeline per track: layout refresh -> driver samples -> blend -> sink.

pub mod baking;
pub mod binding;
pub mod blend;
pub mod clip;
pub mod config;
pub mod curve;
pub mod director;
pub mod error;
pub mod evaluator;
pub mod ids;
pub mod interp;
pub mod mixer;
pub mod outputs;
pub mod schedule;
pub mod text_fade;
pub mod timeline_json;
pub mod track;
pub mod value;

// Re-exports for consumers (adapters)
pub use baking::{
    bake_timeline, bake_track, export_baked_json, BakedTimeline, BakedTrack, BakingConfig,
};
pub use binding::{
    ComponentPropertyBinding, DirectFieldBinding, PropertyHost, ShaderGlobals,
    ShaderParameterBinding, TargetBinding, TargetResolver, TargetSink, ValueSink, WriteStatus,
};
pub use blend::{blend, weighted_sum, BlendInput, BlendResult, BlendState, ClipSample};
pub use clip::{AxisMask, ClipInstance, ClipSchedule, CurveUsageMode, Extrapolation};
pub use config::Config;
pub use curve::{Curve, CurveKey};
pub use director::Director;
pub use error::MotionError;
pub use evaluator::{CacheToken, MotionEvaluator};
pub use ids::{ClipId, IdAllocator, TrackId};
pub use mixer::{MixFrame, Mixer, TrackMixer};
pub use outputs::{Change, CoreEvent, Outputs};
pub use schedule::{sample_clips, sample_playable_clips};
pub use text_fade::{FadePhase, TextFade, TextFadeConfig};
pub use timeline_json::{parse_timeline_json, AnyTrack, TimelineData};
pub use track::{ClipLayout, Track};
pub use value::{ColorBlendSpace, MotionValue, Quat, Rgba, SpriteIndex, Value, ValueKind};
