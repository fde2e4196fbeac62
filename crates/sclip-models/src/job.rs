//! Job identifiers, stages, and the clip request bundle.
//!
//! The core does not own job bookkeeping; it receives a `ClipRequest` from
//! the external job layer and reports stage transitions back through the
//! progress seam.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::time::TimeRange;

/// Opaque job identifier handed in by the external job layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh v4 ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Pipeline stage for user-visible failure reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStage {
    Planning,
    Encoding,
    Concatenation,
    Done,
    Failed,
}

impl JobStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStage::Planning => "planning",
            JobStage::Encoding => "encoding",
            JobStage::Concatenation => "concatenation",
            JobStage::Done => "done",
            JobStage::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Optional study-mode marker on a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StudyMode {
    /// Prepend one still+TTS unit at normal rate.
    Preview,
    /// Append one still+TTS unit at a slowed (-10%) rate.
    Review,
}

/// Subtitle text bundle for one clip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleText {
    /// Source-language line.
    pub primary: String,
    /// Translated line.
    #[serde(default)]
    pub secondary: String,
    /// Optional annotation shown in full mode.
    #[serde(default)]
    pub note: String,
}

/// Parameter bundle the external job layer hands the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ClipRequest {
    pub media_path: PathBuf,
    pub range: TimeRange,
    pub text: SubtitleText,
    /// Keywords to blank in `blank`/`blank_secondary` modes. Empty is legal.
    #[serde(default)]
    pub keywords: Vec<String>,
    pub template_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study: Option<StudyMode>,
    /// Continuous-mode bookmark sub-ranges. Ignored by clips-based
    /// templates.
    #[serde(default)]
    pub bookmarks: Vec<TimeRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_unique() {
        assert_ne!(JobId::new(), JobId::new());
    }

    #[test]
    fn test_request_json_roundtrip() {
        let req = ClipRequest {
            media_path: PathBuf::from("/media/source.mp4"),
            range: TimeRange::new(10.0, 15.0).unwrap(),
            text: SubtitleText {
                primary: "Hello world".into(),
                secondary: "안녕하세요".into(),
                note: String::new(),
            },
            keywords: vec!["Hello".into()],
            template_id: "template_1".into(),
            study: Some(StudyMode::Preview),
            bookmarks: vec![],
        };
        let json = serde_json::to_string(&req).unwrap();
        let back: ClipRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req, back);
    }

    #[test]
    fn test_stage_names() {
        assert_eq!(JobStage::Encoding.to_string(), "encoding");
        assert_eq!(JobStage::Concatenation.as_str(), "concatenation");
    }
}
