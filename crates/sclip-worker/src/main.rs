//! Worker entry point.
//!
//! Reads a `ClipRequest` from a JSON file and renders it to the output
//! path. The surrounding job layer normally drives `JobExecutor`
//! directly; this binary is the standalone rendering path.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sclip_media::{EdgeTtsClient, FfmpegTools, SpeechSynthesizer, TtsAudio, TtsError};
use sclip_models::{ClipRequest, JobId, TemplateRegistry};
use sclip_worker::{JobExecutor, JobPipeline, TracingSink, WorkerConfig};

/// Stand-in used when edge-tts is not installed. Jobs without study
/// units are unaffected; still+TTS segments fail with a clear error.
struct TtsUnavailable;

#[async_trait::async_trait]
impl SpeechSynthesizer for TtsUnavailable {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &str,
        _rate_percent: i8,
    ) -> Result<TtsAudio, TtsError> {
        Err(TtsError::BinaryNotFound)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(request_path), Some(output)) = (args.next(), args.next()) else {
        bail!("usage: sclip-worker <request.json> <output.mp4>");
    };

    let config = WorkerConfig::from_env().context("loading configuration")?;
    let registry = match &config.template_store {
        Some(path) => TemplateRegistry::load(path).context("loading template store")?,
        None => TemplateRegistry::builtin(),
    };
    info!(templates = registry.len(), "template registry ready");

    let tools = FfmpegTools::discover(config.ffmpeg_timeout_secs)
        .context("locating ffmpeg/ffprobe")?;
    let tts: Arc<dyn SpeechSynthesizer> =
        match EdgeTtsClient::new(tools.clone(), config.work_dir.clone()) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                warn!(%err, "TTS unavailable, study units will fail");
                Arc::new(TtsUnavailable)
            }
        };

    let raw = std::fs::read_to_string(&request_path)
        .with_context(|| format!("reading {request_path}"))?;
    let request: ClipRequest = serde_json::from_str(&raw).context("parsing clip request")?;

    let max_jobs = config.max_concurrent_jobs;
    let pipeline = Arc::new(JobPipeline::new(
        config,
        Arc::new(registry),
        tools,
        tts,
    ));
    let executor = Arc::new(JobExecutor::new(pipeline, max_jobs));

    let signal_executor = Arc::clone(&executor);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal_executor.shutdown();
        }
    });

    let job_id = JobId::new();
    let progress = TracingSink::new(job_id.clone());
    let outcome = executor
        .submit(job_id, request, &PathBuf::from(&output), &progress)
        .await?;

    info!(
        artifact = %outcome.artifact.display(),
        duration = outcome.duration,
        segments = outcome.segments,
        "render complete"
    );
    Ok(())
}
