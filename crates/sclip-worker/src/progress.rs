//! Progress emission.
//!
//! The pipeline reports through this seam so it stays decoupled from
//! whatever delivery channel the surrounding job layer uses.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use sclip_models::{JobId, JobStage};

/// One progress event, as the external job layer would see it.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    Log {
        message: String,
        timestamp: DateTime<Utc>,
    },
    Progress {
        percent: u8,
    },
    Stage {
        stage: JobStage,
    },
    Done {
        artifact: String,
    },
    Error {
        message: String,
    },
}

/// Sink for job progress. Implementations must tolerate being called from
/// concurrent encode tasks.
pub trait ProgressSink: Send + Sync {
    fn log(&self, _message: &str) {}
    fn progress(&self, _percent: u8) {}
    fn stage(&self, _stage: JobStage) {}
    fn done(&self, _artifact: &Path) {}
    fn error(&self, _message: &str) {}
}

/// Discards everything.
pub struct NullSink;

impl ProgressSink for NullSink {}

/// Emits progress into the tracing stream, tagged with the job id.
pub struct TracingSink {
    job_id: JobId,
}

impl TracingSink {
    pub fn new(job_id: JobId) -> Self {
        Self { job_id }
    }
}

impl ProgressSink for TracingSink {
    fn log(&self, message: &str) {
        info!(job_id = %self.job_id, message, "job log");
    }

    fn progress(&self, percent: u8) {
        info!(job_id = %self.job_id, percent, "job progress");
    }

    fn stage(&self, stage: JobStage) {
        info!(job_id = %self.job_id, stage = %stage, "job stage");
    }

    fn done(&self, artifact: &Path) {
        info!(job_id = %self.job_id, artifact = %artifact.display(), "job done");
    }

    fn error(&self, message: &str) {
        error!(job_id = %self.job_id, message, "job failed");
    }
}

impl ProgressEvent {
    pub fn log(message: impl Into<String>) -> Self {
        ProgressEvent::Log {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = ProgressEvent::Stage {
            stage: JobStage::Encoding,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"stage""#));
        assert!(json.contains(r#""stage":"encoding""#));
    }
}
