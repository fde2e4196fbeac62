//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::tts::TtsError;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur during media processing.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("Invalid media: {path}: {reason}")]
    InvalidMedia { path: PathBuf, reason: String },

    #[error("Encode failed: {message}")]
    EncodeFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("Concatenation failed: {message}")]
    ConcatFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    /// Units handed to the concatenation engine did not share one profile.
    /// This is a programmer/config error: the encoder adapter is supposed to
    /// make it impossible.
    #[error("Profile mismatch at unit {index}: expected {expected}, got {actual}")]
    ProfileMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("TTS error: {0}")]
    Tts(#[from] TtsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl MediaError {
    /// Create an encode failure error.
    pub fn encode_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::EncodeFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create an invalid-media error.
    pub fn invalid_media(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidMedia {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same operation can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, MediaError::Tts(e) if e.is_retryable())
    }
}
