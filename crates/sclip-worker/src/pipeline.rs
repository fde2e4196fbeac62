//! Job pipeline.
//!
//! Drives one clip job through its three stages: plan, encode,
//! concatenate. Encoding fans out over a bounded FFmpeg pool; the join
//! step only runs once every unit has encoded successfully, so a failed
//! job never leaves a partial artifact at the output path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use sclip_media::{
    probe, Concatenator, FfmpegTools, JoinEngine, JoinStrategy, MediaError, SegmentEncoder,
    SpeechSynthesizer, UnitEncoder,
};
use sclip_models::{
    ClipRequest, JobId, JobStage, PlanItem, SegmentPlan, StandardizedUnit, TemplateRegistry,
};
use sclip_subtitle::resolve;

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::planner;
use crate::progress::ProgressSink;

/// Result of a completed job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub artifact: PathBuf,
    /// Sum of unit durations, in seconds.
    pub duration: f64,
    pub segments: usize,
    pub strategy: JoinStrategy,
}

/// One pipeline instance, shared across jobs.
pub struct JobPipeline {
    config: WorkerConfig,
    registry: Arc<TemplateRegistry>,
    tools: FfmpegTools,
    tts: Arc<dyn SpeechSynthesizer>,
    ffmpeg_slots: Arc<Semaphore>,
}

impl JobPipeline {
    pub fn new(
        config: WorkerConfig,
        registry: Arc<TemplateRegistry>,
        tools: FfmpegTools,
        tts: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let ffmpeg_slots = Arc::new(Semaphore::new(config.max_ffmpeg_processes));
        Self {
            config,
            registry,
            tools,
            tts,
            ffmpeg_slots,
        }
    }

    /// Run one job to completion, reporting stages through `progress`.
    pub async fn run(
        &self,
        job_id: &JobId,
        request: &ClipRequest,
        output: &Path,
        progress: &dyn ProgressSink,
    ) -> WorkerResult<JobOutcome> {
        info!(%job_id, template = %request.template_id, "starting clip job");
        let result = self.run_inner(job_id, request, output, progress).await;
        match &result {
            Ok(outcome) => {
                progress.stage(JobStage::Done);
                progress.progress(100);
                progress.done(&outcome.artifact);
                info!(
                    %job_id,
                    duration = outcome.duration,
                    segments = outcome.segments,
                    "clip job complete"
                );
            }
            Err(err) => {
                progress.stage(JobStage::Failed);
                progress.error(&err.to_string());
                warn!(%job_id, stage = %err.stage(), %err, "clip job failed");
            }
        }
        result
    }

    async fn run_inner(
        &self,
        job_id: &JobId,
        request: &ClipRequest,
        output: &Path,
        progress: &dyn ProgressSink,
    ) -> WorkerResult<JobOutcome> {
        progress.stage(JobStage::Planning);
        let plan = planner::plan(&self.registry, request)?;
        progress.log(&format!(
            "planned {} segments ({} units)",
            plan.segment_count(),
            plan.items.len()
        ));

        probe::probe(&self.tools, &request.media_path).await?;

        tokio::fs::create_dir_all(&self.config.work_dir).await?;
        let work_dir = tempfile::Builder::new()
            .prefix(&format!("job_{job_id}_"))
            .tempdir_in(&self.config.work_dir)?;

        let template = self.registry.get(&plan.template_id)?;
        let encoder = Arc::new(SegmentEncoder::new(
            self.tools.clone(),
            self.tts.clone(),
            plan.aspect,
            template.still.tts_voice.clone(),
            work_dir.path(),
        ));
        let concat = Concatenator::new(self.tools.clone(), encoder.profile().clone());

        // `work_dir` drops after this call, removing per-job scratch on
        // success and failure alike.
        self.execute(&plan, request, encoder, &concat, output, progress)
            .await
    }

    /// Encode every plan item, then join. Exposed separately so tests can
    /// drive the stage machinery with encoder/join doubles.
    pub async fn execute(
        &self,
        plan: &SegmentPlan,
        request: &ClipRequest,
        encoder: Arc<dyn UnitEncoder>,
        join: &dyn JoinEngine,
        output: &Path,
        progress: &dyn ProgressSink,
    ) -> WorkerResult<JobOutcome> {
        progress.stage(JobStage::Encoding);
        let units = self.encode_all(plan, request, encoder, progress).await?;

        progress.stage(JobStage::Concatenation);
        let strategy = JoinStrategy::select(&units, self.config.allow_stream_copy);
        progress.log(&format!("joining {} units ({strategy:?})", units.len()));

        let artifact = match join.join(&units, strategy, output).await {
            Ok(path) => path,
            Err(err) => {
                let _ = tokio::fs::remove_file(output).await;
                return Err(WorkerError::Media(err));
            }
        };

        Ok(JobOutcome {
            artifact,
            duration: units.iter().map(|u| u.duration).sum(),
            segments: plan.segment_count(),
            strategy,
        })
    }

    /// Fan plan items out over the FFmpeg pool. Results come back in
    /// completion order and are re-sequenced by plan index; the first
    /// failure aborts the remaining tasks.
    async fn encode_all(
        &self,
        plan: &SegmentPlan,
        request: &ClipRequest,
        encoder: Arc<dyn UnitEncoder>,
        progress: &dyn ProgressSink,
    ) -> WorkerResult<Vec<StandardizedUnit>> {
        let total = plan.items.len();
        let mut tasks: JoinSet<(usize, Result<StandardizedUnit, MediaError>)> = JoinSet::new();

        for (index, item) in plan.items.iter().enumerate() {
            let item = item.clone();
            let encoder = Arc::clone(&encoder);
            let slots = Arc::clone(&self.ffmpeg_slots);
            let media = request.media_path.clone();
            let variant = match &item {
                PlanItem::Segment(spec) => {
                    resolve(spec.subtitle_mode, &request.text, &request.keywords)
                }
                PlanItem::Gap { .. } => None,
            };

            tasks.spawn(async move {
                let permit = slots.acquire_owned().await;
                if permit.is_err() {
                    return (
                        index,
                        Err(MediaError::encode_failed("encoder pool closed", None, None)),
                    );
                }
                let result = match &item {
                    PlanItem::Segment(spec) => {
                        encoder
                            .encode_segment(index, spec, &media, variant.as_ref())
                            .await
                    }
                    PlanItem::Gap { duration } => encoder.encode_gap(index, *duration).await,
                };
                (index, result)
            });
        }

        let mut ordered: Vec<Option<StandardizedUnit>> = vec![None; total];
        let mut completed = 0usize;
        while let Some(joined) = tasks.join_next().await {
            let (index, result) = joined
                .map_err(|e| WorkerError::job_failed(format!("encode task panicked: {e}")))?;
            match result {
                Ok(unit) => {
                    ordered[index] = Some(unit);
                    completed += 1;
                    progress.progress((completed * 90 / total) as u8);
                }
                Err(source) => {
                    tasks.abort_all();
                    return Err(WorkerError::SegmentFailed { index, source });
                }
            }
        }

        ordered
            .into_iter()
            .map(|u| u.ok_or_else(|| WorkerError::job_failed("encode task produced no unit")))
            .collect()
    }
}
