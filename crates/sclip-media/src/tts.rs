//! Text-to-speech collaborator.
//!
//! The core treats TTS as a transient network dependency: failures are
//! retryable, and the CLI-backed client retries a small bounded number of
//! times with backoff before giving up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::probe;
use crate::process::{run_with_timeout, FfmpegTools};

/// Synthesized narration handed back to the encoder.
#[derive(Debug, Clone)]
pub struct TtsAudio {
    pub path: PathBuf,
    pub duration: f64,
}

/// TTS collaborator errors.
#[derive(Debug, Error)]
pub enum TtsError {
    /// The synthesis backend failed or was unreachable. Retryable.
    #[error("TTS unavailable: {0}")]
    Unavailable(String),

    #[error("TTS binary not found in PATH")]
    BinaryNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TtsError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, TtsError::Unavailable(_))
    }
}

/// Speech synthesis seam.
///
/// `rate_percent` is relative to the voice's natural rate: 0 is unchanged,
/// -10 slows narration by 10%.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        rate_percent: i8,
    ) -> Result<TtsAudio, TtsError>;
}

/// edge-tts CLI client with bounded retry.
pub struct EdgeTtsClient {
    binary: PathBuf,
    tools: FfmpegTools,
    out_dir: PathBuf,
    max_attempts: u32,
    backoff: Duration,
}

impl EdgeTtsClient {
    pub fn new(tools: FfmpegTools, out_dir: impl Into<PathBuf>) -> Result<Self, TtsError> {
        let binary = which::which("edge-tts").map_err(|_| TtsError::BinaryNotFound)?;
        Ok(Self {
            binary,
            tools,
            out_dir: out_dir.into(),
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        })
    }

    async fn synthesize_once(
        &self,
        text: &str,
        voice: &str,
        rate_percent: i8,
        output: &Path,
    ) -> Result<(), TtsError> {
        let rate = format!("{rate_percent:+}%");
        let args = vec![
            "--voice".to_string(),
            voice.to_string(),
            "--rate".to_string(),
            rate,
            "--text".to_string(),
            text.to_string(),
            "--write-media".to_string(),
            output.display().to_string(),
        ];

        let out = run_with_timeout(&self.binary, &args, Duration::from_secs(60))
            .await
            .map_err(|e| TtsError::Unavailable(e.to_string()))?;

        if !out.success() {
            return Err(TtsError::Unavailable(out.stderr));
        }
        if !output.exists() {
            return Err(TtsError::Unavailable(
                "synthesis produced no output file".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsClient {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        rate_percent: i8,
    ) -> Result<TtsAudio, TtsError> {
        let output = tempfile::Builder::new()
            .prefix("tts_")
            .suffix(".mp3")
            .tempfile_in(&self.out_dir)?
            .into_temp_path()
            .keep()
            .map_err(|e| TtsError::Io(e.error))?;

        let mut last_err = None;
        for attempt in 1..=self.max_attempts {
            match self.synthesize_once(text, voice, rate_percent, &output).await {
                Ok(()) => {
                    let duration = probe::probe_duration(&self.tools, &output)
                        .await
                        .map_err(|e| TtsError::Unavailable(e.to_string()))?;
                    debug!(voice, rate_percent, duration, "synthesized narration");
                    return Ok(TtsAudio {
                        path: output,
                        duration,
                    });
                }
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    warn!(attempt, %err, "TTS attempt failed, retrying");
                    tokio::time::sleep(self.backoff * attempt).await;
                    last_err = Some(err);
                }
                Err(err) => {
                    let _ = std::fs::remove_file(&output);
                    return Err(err);
                }
            }
        }

        let _ = std::fs::remove_file(&output);
        Err(last_err.unwrap_or_else(|| TtsError::Unavailable("exhausted retries".to_string())))
    }
}
