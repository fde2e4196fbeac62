//! Job executor.
//!
//! Admission control in front of the pipeline: a semaphore caps jobs in
//! flight, and a watch channel lets the process drain gracefully. Jobs
//! submitted after shutdown are refused rather than queued.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::info;

use sclip_models::{ClipRequest, JobId};

use crate::error::{WorkerError, WorkerResult};
use crate::pipeline::{JobOutcome, JobPipeline};
use crate::progress::ProgressSink;

pub struct JobExecutor {
    pipeline: Arc<JobPipeline>,
    job_slots: Arc<Semaphore>,
    shutdown: tokio::sync::watch::Sender<bool>,
}

impl JobExecutor {
    pub fn new(pipeline: Arc<JobPipeline>, max_concurrent_jobs: usize) -> Self {
        let (shutdown, _) = tokio::sync::watch::channel(false);
        Self {
            pipeline,
            job_slots: Arc::new(Semaphore::new(max_concurrent_jobs)),
            shutdown,
        }
    }

    /// Run one job, waiting for a free slot first.
    pub async fn submit(
        &self,
        job_id: JobId,
        request: ClipRequest,
        output: &Path,
        progress: &dyn ProgressSink,
    ) -> WorkerResult<JobOutcome> {
        if *self.shutdown.borrow() {
            return Err(WorkerError::job_failed("executor is shutting down"));
        }
        let _permit = self
            .job_slots
            .acquire()
            .await
            .map_err(|_| WorkerError::job_failed("executor is shutting down"))?;

        self.pipeline.run(&job_id, &request, output, progress).await
    }

    /// Signal shutdown. In-flight jobs finish; new submissions are
    /// refused.
    pub fn shutdown(&self) {
        info!("shutdown signal received, draining in-flight jobs");
        let _ = self.shutdown.send(true);
        self.job_slots.close();
    }

    /// Subscribe to the shutdown signal.
    pub fn shutdown_signal(&self) -> tokio::sync::watch::Receiver<bool> {
        self.shutdown.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Arc;

    use sclip_media::{FfmpegTools, SpeechSynthesizer, TtsAudio, TtsError};
    use sclip_models::{SubtitleText, TemplateRegistry, TimeRange};

    use crate::config::WorkerConfig;
    use crate::progress::NullSink;

    struct NoTts;

    #[async_trait::async_trait]
    impl SpeechSynthesizer for NoTts {
        async fn synthesize(
            &self,
            _text: &str,
            _voice: &str,
            _rate_percent: i8,
        ) -> Result<TtsAudio, TtsError> {
            Err(TtsError::Unavailable("not wired".into()))
        }
    }

    fn executor() -> JobExecutor {
        let pipeline = JobPipeline::new(
            WorkerConfig::default(),
            Arc::new(TemplateRegistry::builtin()),
            FfmpegTools::with_paths("ffmpeg".into(), "ffprobe".into(), 30),
            Arc::new(NoTts),
        );
        JobExecutor::new(Arc::new(pipeline), 2)
    }

    #[tokio::test]
    async fn test_submit_after_shutdown_is_refused() {
        let executor = executor();
        executor.shutdown();

        let request = ClipRequest {
            media_path: PathBuf::from("/media/source.mp4"),
            range: TimeRange::new(10.0, 15.0).unwrap(),
            text: SubtitleText::default(),
            keywords: vec![],
            template_id: "template_1".into(),
            study: None,
            bookmarks: vec![],
        };
        let err = executor
            .submit(JobId::new(), request, Path::new("/tmp/out.mp4"), &NullSink)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::JobFailed(_)));
    }

    #[tokio::test]
    async fn test_shutdown_signal_observable() {
        let executor = executor();
        let rx = executor.shutdown_signal();
        assert!(!*rx.borrow());
        executor.shutdown();
        assert!(*rx.borrow());
    }
}
