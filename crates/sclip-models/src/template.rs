//! Template definitions.
//!
//! A template is the declarative recipe mapping caller parameters to an
//! ordered segment plan. Templates are loaded once at process start and are
//! read-only thereafter; changing the definition store requires a restart.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::profile::AspectClass;
use crate::segment::FreezePosition;
use crate::subtitle::SubtitleMode;

/// One rule of a clips-based template: render `count` segments with the
/// given subtitle mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentRule {
    pub subtitle_mode: SubtitleMode,
    /// How many identical segments this rule expands to.
    pub count: u32,
    /// Human-readable label, used for per-segment logging and artifacts.
    pub label: String,
}

/// One step of a continuous-mode bookmark pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PatternStep {
    /// Insert a freeze frame captured at the start or end of the bookmark
    /// range.
    FreezeFrame {
        duration: f64,
        position: FreezePosition,
    },
    /// Expand a clips-based template scoped to the bookmark range.
    ApplyTemplate { template: String },
}

/// Styling knobs for continuous-mode playback segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContinuousStyle {
    /// Subtitle mode for non-bookmarked playback.
    pub playback_subtitle_mode: SubtitleMode,
}

/// Rule set for continuous-mode templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContinuousRules {
    /// Pattern emitted literally, in order, for each bookmarked sub-range.
    pub pattern: Vec<PatternStep>,
    /// Nominal partition length used when splitting long playback spans.
    pub segment_duration: f64,
    /// Style block for playback segments.
    pub style: ContinuousStyle,
}

/// Template-level knobs for still-frame + TTS units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StillRules {
    /// Minimum duration of a still unit; TTS audio shorter than this is
    /// padded with trailing silence.
    #[serde(default = "default_still_min_duration")]
    pub min_duration: f64,
    /// TTS voice identifier handed to the speech collaborator.
    #[serde(default = "default_tts_voice")]
    pub tts_voice: String,
}

fn default_still_min_duration() -> f64 {
    5.0
}

fn default_tts_voice() -> String {
    "en-US-AriaNeural".to_string()
}

impl Default for StillRules {
    fn default() -> Self {
        Self {
            min_duration: default_still_min_duration(),
            tts_voice: default_tts_voice(),
        }
    }
}

/// A declarative segment-composition recipe.
///
/// Invariant: a template is either clips-based (non-empty `clips`) XOR
/// continuous-mode (`continuous` present); both-or-neither is invalid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub aspect: AspectClass,
    /// Inserted between adjacent segments. Zero is a legal no-op.
    #[serde(default)]
    pub gap_duration: f64,
    #[serde(default)]
    pub clips: Vec<SegmentRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuous: Option<ContinuousRules>,
    #[serde(default)]
    pub still: StillRules,
}

impl Template {
    /// Whether this template is continuous-mode.
    pub fn is_continuous(&self) -> bool {
        self.continuous.is_some()
    }

    /// Sum of `count` across clip rules.
    pub fn clip_count(&self) -> u32 {
        self.clips.iter().map(|r| r.count).sum()
    }

    /// Load-time validation of the clips-XOR-continuous invariant and the
    /// per-mode requirements.
    pub fn validate(&self) -> Result<(), TemplateError> {
        let invalid = |reason: &str| {
            Err(TemplateError::Invalid {
                id: self.id.clone(),
                reason: reason.to_string(),
            })
        };

        if self.id.is_empty() {
            return invalid("template id must not be empty");
        }
        if self.gap_duration < 0.0 || !self.gap_duration.is_finite() {
            return invalid("gap_duration must be finite and >= 0");
        }
        if self.still.min_duration <= 0.0 {
            return invalid("still.min_duration must be > 0");
        }

        match (&self.continuous, self.clips.is_empty()) {
            (Some(_), false) => invalid("template cannot be both clips-based and continuous"),
            (None, true) => invalid("clips-based template requires a non-empty rule list"),
            (None, false) => {
                if self.clips.iter().any(|r| r.count == 0) {
                    return invalid("segment rule count must be >= 1");
                }
                Ok(())
            }
            (Some(rules), true) => {
                if rules.pattern.is_empty() {
                    return invalid("continuous template requires a non-empty pattern list");
                }
                if rules.segment_duration <= 0.0 || !rules.segment_duration.is_finite() {
                    return invalid("continuous template requires a positive segment_duration");
                }
                if rules.pattern.iter().any(|s| {
                    matches!(s, PatternStep::FreezeFrame { duration, .. } if *duration <= 0.0)
                }) {
                    return invalid("freeze_frame pattern steps require a positive duration");
                }
                Ok(())
            }
        }
    }
}

/// Errors for template lookup and validation.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Template '{id}' is invalid: {reason}")]
    Invalid { id: String, reason: String },

    #[error("Template store unreadable: {0}")]
    StoreUnreadable(#[from] std::io::Error),

    #[error("Template store parse error: {0}")]
    StoreParse(#[from] serde_json::Error),
}
