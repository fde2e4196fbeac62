//! Shared data models for the ShadowClip backend.
//!
//! This crate provides Serde-serializable types for:
//! - Templates and the template registry
//! - Segment plans and specs
//! - Subtitle modes
//! - Encoding profiles and standardized units
//! - Jobs and clip requests

pub mod job;
pub mod profile;
pub mod registry;
pub mod segment;
pub mod subtitle;
pub mod template;
pub mod time;

// Re-export common types
pub use job::{ClipRequest, JobId, JobStage, StudyMode, SubtitleText};
pub use profile::{AspectClass, AudioProfile, EncodingProfile, VideoProfile};
pub use registry::TemplateRegistry;
pub use segment::{
    AudioSource, FreezePosition, PlanItem, SegmentEffect, SegmentPlan, SegmentSpec,
    StandardizedUnit,
};
pub use subtitle::{SubtitleMode, SubtitleModeParseError};
pub use template::{
    ContinuousRules, ContinuousStyle, PatternStep, SegmentRule, StillRules, Template,
    TemplateError,
};
pub use time::{TimeRange, TimeRangeError};
