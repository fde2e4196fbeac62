//! Segment encoder adapter.
//!
//! Turns one `SegmentSpec` into one `StandardizedUnit`. Every unit is
//! re-encoded to the fixed target profile here, regardless of operation:
//! this is the last point before concatenation that can guarantee the
//! profile invariant, so it is enforced rather than assumed from inputs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use sclip_models::{
    AspectClass, AudioSource, EncodingProfile, FreezePosition, SegmentEffect, SegmentSpec,
    StandardizedUnit,
};
use sclip_subtitle::{AssDocument, SubtitleVariant};

use crate::error::{MediaError, MediaResult};
use crate::filter;
use crate::probe;
use crate::process::FfmpegTools;
use crate::tts::SpeechSynthesizer;

/// Seam between the pipeline and the encode subprocess layer. Tests swap in
/// doubles; production uses [`SegmentEncoder`].
#[async_trait]
pub trait UnitEncoder: Send + Sync {
    /// Encode one planned segment against the source media.
    async fn encode_segment(
        &self,
        index: usize,
        spec: &SegmentSpec,
        media: &Path,
        variant: Option<&SubtitleVariant>,
    ) -> MediaResult<StandardizedUnit>;

    /// Encode one inter-segment gap (black + silence).
    async fn encode_gap(&self, index: usize, duration: f64) -> MediaResult<StandardizedUnit>;
}

/// FFmpeg-backed unit encoder for one job.
pub struct SegmentEncoder {
    tools: FfmpegTools,
    tts: Arc<dyn SpeechSynthesizer>,
    aspect: AspectClass,
    profile: EncodingProfile,
    tts_voice: String,
    work_dir: PathBuf,
}

impl SegmentEncoder {
    pub fn new(
        tools: FfmpegTools,
        tts: Arc<dyn SpeechSynthesizer>,
        aspect: AspectClass,
        tts_voice: impl Into<String>,
        work_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            tools,
            tts,
            profile: EncodingProfile::standard(aspect),
            aspect,
            tts_voice: tts_voice.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn profile(&self) -> &EncodingProfile {
        &self.profile
    }

    /// Uniform output codec arguments. Identical for all three operations
    /// and for gaps; this is what makes concatenation safe.
    fn codec_args(&self) -> Vec<String> {
        let v = &self.profile.video;
        let a = &self.profile.audio;
        vec![
            "-c:v".into(),
            v.codec.clone(),
            "-preset".into(),
            v.preset.clone(),
            "-crf".into(),
            v.crf.to_string(),
            "-pix_fmt".into(),
            v.pix_fmt.clone(),
            "-r".into(),
            v.fps.to_string(),
            "-c:a".into(),
            a.codec.clone(),
            "-b:a".into(),
            a.bitrate.clone(),
            "-ar".into(),
            a.sample_rate.to_string(),
            "-ac".into(),
            a.channels.to_string(),
        ]
    }

    fn unit_path(&self, index: usize, kind: &str) -> PathBuf {
        self.work_dir.join(format!("unit_{index:03}_{kind}.mp4"))
    }

    /// Write the overlay document for a segment, if it renders anything.
    fn write_overlay(
        &self,
        index: usize,
        variant: Option<&SubtitleVariant>,
        duration: f64,
    ) -> MediaResult<Option<PathBuf>> {
        let Some(variant) = variant else {
            return Ok(None);
        };
        let doc = AssDocument::from_variant(variant, self.aspect, duration);
        if doc.is_empty() {
            return Ok(None);
        }
        let path = self.work_dir.join(format!("overlay_{index:03}.ass"));
        doc.write_to(&path)?;
        Ok(Some(path))
    }

    async fn finish_unit(&self, path: PathBuf, synthetic: bool) -> MediaResult<StandardizedUnit> {
        let duration = probe::probe_duration(&self.tools, &path).await?;
        Ok(StandardizedUnit {
            path,
            duration,
            profile: self.profile.clone(),
            synthetic,
        })
    }

    /// Trim + encode: extract the source range, burn in the overlay,
    /// re-encode to the target profile.
    async fn encode_trim(
        &self,
        index: usize,
        spec: &SegmentSpec,
        media: &Path,
        variant: Option<&SubtitleVariant>,
    ) -> MediaResult<StandardizedUnit> {
        let duration = spec.source.duration();
        let output = self.unit_path(index, &spec.label);
        let overlay = self.write_overlay(index, variant, duration)?;

        let mut args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            spec.source.start.to_string(),
            "-t".to_string(),
            duration.to_string(),
            "-i".to_string(),
            media.display().to_string(),
            "-vf".to_string(),
            filter::video_chain(self.aspect, overlay.as_deref()),
            "-af".to_string(),
            "aresample=async=1".to_string(),
        ];
        args.extend(self.codec_args());
        args.extend([
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ]);

        self.tools.run_ffmpeg(&args).await?;
        self.finish_unit(output, false).await
    }

    /// Extract a single frame to a temp image.
    async fn extract_frame(&self, index: usize, media: &Path, at: f64) -> MediaResult<PathBuf> {
        let frame = self.work_dir.join(format!("frame_{index:03}.png"));
        let args = vec![
            "-y".to_string(),
            "-ss".to_string(),
            at.max(0.0).to_string(),
            "-i".to_string(),
            media.display().to_string(),
            "-frames:v".to_string(),
            "1".to_string(),
            frame.display().to_string(),
        ];
        self.tools.run_ffmpeg(&args).await?;
        Ok(frame)
    }

    /// Freeze + audio: hold one frame for the freeze duration. The unit
    /// must carry an audio track of the same duration, sourced from the
    /// original media or standard-profile silence; a silent-video freeze
    /// stalls playback downstream. Always re-encodes so timestamps align
    /// with neighboring units.
    async fn encode_freeze(
        &self,
        index: usize,
        spec: &SegmentSpec,
        media: &Path,
        duration: f64,
        position: FreezePosition,
        variant: Option<&SubtitleVariant>,
    ) -> MediaResult<StandardizedUnit> {
        // Capture slightly inside the range so seeks land on a real frame.
        let frame_time = match position {
            FreezePosition::Start => spec.source.start + 0.1,
            FreezePosition::End => (spec.source.end - 0.1).max(spec.source.start),
        };
        let frame = self.extract_frame(index, media, frame_time).await?;
        let output = self.unit_path(index, "freeze");
        let overlay = self.write_overlay(index, variant, duration)?;

        let mut args = vec![
            "-y".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            self.profile.video.fps.to_string(),
            "-i".to_string(),
            frame.display().to_string(),
        ];
        match &spec.audio {
            AudioSource::Original => {
                args.extend([
                    "-ss".to_string(),
                    spec.source.start.to_string(),
                    "-i".to_string(),
                    media.display().to_string(),
                ]);
            }
            AudioSource::Silence | AudioSource::Tts { .. } => {
                args.extend([
                    "-f".to_string(),
                    "lavfi".to_string(),
                    "-i".to_string(),
                    filter::silence_source(&self.profile.audio),
                ]);
            }
        }
        args.extend([
            "-t".to_string(),
            duration.to_string(),
            "-map".to_string(),
            "0:v".to_string(),
            "-map".to_string(),
            "1:a".to_string(),
            "-vf".to_string(),
            filter::video_chain(self.aspect, overlay.as_deref()),
            "-af".to_string(),
            "aresample=async=1".to_string(),
        ]);
        args.extend(self.codec_args());
        args.extend([
            "-shortest".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ]);

        self.tools.run_ffmpeg(&args).await?;
        let _ = std::fs::remove_file(&frame);
        self.finish_unit(output, true).await
    }

    /// Still frame + TTS: extracted frame background, overlay text, TTS
    /// narration. Duration is the larger of the narration length and the
    /// planner-supplied floor; shorter narration is padded with silence.
    async fn encode_still(
        &self,
        index: usize,
        spec: &SegmentSpec,
        media: &Path,
        min_duration: f64,
        variant: Option<&SubtitleVariant>,
    ) -> MediaResult<StandardizedUnit> {
        let (text, rate_percent) = match &spec.audio {
            AudioSource::Tts { text, rate_percent } => (text.as_str(), *rate_percent),
            other => {
                return Err(MediaError::encode_failed(
                    format!("still-frame segment requires TTS audio, got {other:?}"),
                    None,
                    None,
                ))
            }
        };

        let narration = self
            .tts
            .synthesize(text, &self.tts_voice, rate_percent)
            .await?;
        let duration = narration.duration.max(min_duration);

        let frame = self
            .extract_frame(index, media, spec.source.start + 0.1)
            .await?;
        let output = self.unit_path(index, "still");
        let overlay = self.write_overlay(index, variant, duration)?;

        let mut args = vec![
            "-y".to_string(),
            "-loop".to_string(),
            "1".to_string(),
            "-framerate".to_string(),
            self.profile.video.fps.to_string(),
            "-i".to_string(),
            frame.display().to_string(),
            "-i".to_string(),
            narration.path.display().to_string(),
            "-t".to_string(),
            duration.to_string(),
            "-map".to_string(),
            "0:v".to_string(),
            "-map".to_string(),
            "1:a".to_string(),
            "-vf".to_string(),
            filter::video_chain(self.aspect, overlay.as_deref()),
            "-af".to_string(),
            "apad".to_string(),
        ];
        args.extend(self.codec_args());
        args.extend([
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ]);

        let result = self.tools.run_ffmpeg(&args).await;
        let _ = std::fs::remove_file(&frame);
        let _ = std::fs::remove_file(&narration.path);
        result?;

        self.finish_unit(output, true).await
    }
}

#[async_trait]
impl UnitEncoder for SegmentEncoder {
    async fn encode_segment(
        &self,
        index: usize,
        spec: &SegmentSpec,
        media: &Path,
        variant: Option<&SubtitleVariant>,
    ) -> MediaResult<StandardizedUnit> {
        debug!(index, label = %spec.label, effect = ?spec.effect, "encoding segment");
        let unit = match &spec.effect {
            SegmentEffect::None => self.encode_trim(index, spec, media, variant).await?,
            SegmentEffect::Freeze { duration, position } => {
                self.encode_freeze(index, spec, media, *duration, *position, variant)
                    .await?
            }
            SegmentEffect::StillFrame { min_duration } => {
                self.encode_still(index, spec, media, *min_duration, variant)
                    .await?
            }
        };
        info!(index, label = %spec.label, duration = unit.duration, "segment encoded");
        Ok(unit)
    }

    async fn encode_gap(&self, index: usize, duration: f64) -> MediaResult<StandardizedUnit> {
        let output = self.unit_path(index, "gap");
        let mut args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            filter::black_source(self.aspect, duration),
            "-f".to_string(),
            "lavfi".to_string(),
            "-i".to_string(),
            filter::silence_source(&self.profile.audio),
            "-t".to_string(),
            duration.to_string(),
        ];
        args.extend(self.codec_args());
        args.extend([
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ]);

        self.tools.run_ffmpeg(&args).await?;
        self.finish_unit(output, true).await
    }
}
