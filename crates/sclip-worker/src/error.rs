//! Worker error types.

use thiserror::Error;

use sclip_models::{JobStage, TemplateError, TimeRangeError};
use sclip_media::{MediaError, TtsError};

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error(transparent)]
    InvalidTimeRange(#[from] TimeRangeError),

    /// A continuous-mode bookmark fell outside the request range or
    /// overlapped a sibling. Reported before any subprocess is spawned.
    #[error("Invalid bookmark range: {0}")]
    InvalidBookmarkRange(String),

    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Encoding one segment failed. Carries the zero-based plan index so
    /// the failure report can name the unit.
    #[error("Segment {index} failed: {source}")]
    SegmentFailed {
        index: usize,
        #[source]
        source: MediaError,
    },

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Config error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    /// The pipeline stage this error is reported against.
    pub fn stage(&self) -> JobStage {
        match self {
            WorkerError::InvalidTimeRange(_)
            | WorkerError::InvalidBookmarkRange(_)
            | WorkerError::Template(_) => JobStage::Planning,
            // Source probing happens before any encode is spawned, so a
            // bad input is a planning failure, not an encoding one.
            WorkerError::Media(MediaError::InvalidMedia { .. }) => JobStage::Planning,
            WorkerError::SegmentFailed { .. } => JobStage::Encoding,
            WorkerError::Media(MediaError::ConcatFailed { .. })
            | WorkerError::Media(MediaError::ProfileMismatch { .. }) => JobStage::Concatenation,
            WorkerError::Media(_) => JobStage::Encoding,
            WorkerError::JobFailed(_) | WorkerError::Config(_) | WorkerError::Io(_) => {
                JobStage::Failed
            }
        }
    }

    /// Plan index of the failed segment, when the failure names one.
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            WorkerError::SegmentFailed { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Check if error is retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkerError::SegmentFailed { source, .. } => source.is_retryable(),
            WorkerError::Media(e) => e.is_retryable(),
            _ => false,
        }
    }
}

impl From<TtsError> for WorkerError {
    fn from(e: TtsError) -> Self {
        WorkerError::Media(MediaError::Tts(e))
    }
}
