//! End-to-end render tests.
//!
//! Each test synthesizes a short source clip with lavfi, runs a full job
//! through the pipeline, and probes the artifact.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use async_trait::async_trait;

use sclip_media::{probe, FfmpegTools, SegmentEncoder, SpeechSynthesizer, TtsAudio, TtsError, UnitEncoder};
use sclip_models::{
    AspectClass, AudioSource, ClipRequest, FreezePosition, JobId, SegmentEffect, SegmentSpec,
    SubtitleMode, SubtitleText, TemplateRegistry, TimeRange,
};
use sclip_worker::{JobPipeline, NullSink, WorkerConfig, WorkerError};

struct NoTts;

#[async_trait]
impl SpeechSynthesizer for NoTts {
    async fn synthesize(
        &self,
        _text: &str,
        _voice: &str,
        _rate_percent: i8,
    ) -> Result<TtsAudio, TtsError> {
        Err(TtsError::Unavailable("not wired for tests".into()))
    }
}

/// Synthesize a 20s test pattern with a sine audio track.
fn make_source(dir: &Path) -> PathBuf {
    let source = dir.join("source.mp4");
    let status = Command::new("ffmpeg")
        .args([
            "-y",
            "-f",
            "lavfi",
            "-i",
            "testsrc=duration=20:size=640x360:rate=30",
            "-f",
            "lavfi",
            "-i",
            "sine=frequency=440:duration=20",
            "-c:v",
            "libx264",
            "-pix_fmt",
            "yuv420p",
            "-c:a",
            "aac",
            "-shortest",
        ])
        .arg(&source)
        .status()
        .expect("ffmpeg must be on PATH for ignored tests");
    assert!(status.success(), "source synthesis failed");
    source
}

fn pipeline(work_dir: &Path) -> JobPipeline {
    let config = WorkerConfig {
        work_dir: work_dir.to_path_buf(),
        ..WorkerConfig::default()
    };
    let tools = FfmpegTools::discover(config.ffmpeg_timeout_secs).expect("ffmpeg not found");
    JobPipeline::new(
        config,
        Arc::new(TemplateRegistry::builtin()),
        tools,
        Arc::new(NoTts),
    )
}

fn request(media: &Path, template_id: &str, range: TimeRange) -> ClipRequest {
    ClipRequest {
        media_path: media.to_path_buf(),
        range,
        text: SubtitleText {
            primary: "Hello world, how are you today?".into(),
            secondary: "안녕하세요".into(),
            note: String::new(),
        },
        keywords: vec!["Hello".into(), "world".into(), "today".into()],
        template_id: template_id.into(),
        study: None,
        bookmarks: vec![],
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_render_progressive_template() {
    let dir = tempfile::tempdir().unwrap();
    let source = make_source(dir.path());
    let output = dir.path().join("final.mp4");

    let pipeline = pipeline(dir.path());
    let range = TimeRange::new(2.0, 5.0).unwrap();
    let outcome = pipeline
        .run(
            &JobId::new(),
            &request(&source, "template_1", range),
            &output,
            &NullSink,
        )
        .await
        .expect("render failed");

    // template_1: 5 segments of 3s plus 4 gaps of 1.5s.
    assert_eq!(outcome.segments, 5);
    assert!(output.exists());

    let tools = FfmpegTools::discover(300).unwrap();
    let info = probe::probe(&tools, &output).await.unwrap();
    let expected = 5.0 * 3.0 + 4.0 * 1.5;
    assert!(
        (info.duration - expected).abs() < 1.0,
        "final duration {} too far from {expected}",
        info.duration
    );
    assert_eq!(info.width, 1920);
    assert_eq!(info.height, 1080);
    assert_eq!(info.video_codec, "h264");
    let audio = info.audio.expect("artifact must carry audio");
    assert_eq!(audio.sample_rate, 48_000);
    assert_eq!(audio.channels, 2);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_render_tall_aspect() {
    let dir = tempfile::tempdir().unwrap();
    let source = make_source(dir.path());
    let output = dir.path().join("final.mp4");

    let pipeline = pipeline(dir.path());
    let range = TimeRange::new(1.0, 3.0).unwrap();
    pipeline
        .run(
            &JobId::new(),
            &request(&source, "template_2_shorts", range),
            &output,
            &NullSink,
        )
        .await
        .expect("render failed");

    let tools = FfmpegTools::discover(300).unwrap();
    let info = probe::probe(&tools, &output).await.unwrap();
    assert_eq!(info.width, 1080);
    assert_eq!(info.height, 1920);
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_render_continuous_with_bookmark() {
    let dir = tempfile::tempdir().unwrap();
    let source = make_source(dir.path());
    let output = dir.path().join("final.mp4");

    let pipeline = pipeline(dir.path());
    let mut req = request(&source, "template_lesson", TimeRange::new(0.0, 15.0).unwrap());
    req.bookmarks = vec![TimeRange::new(5.0, 7.0).unwrap()];

    let outcome = pipeline
        .run(&JobId::new(), &req, &output, &NullSink)
        .await
        .expect("render failed");

    // playback, freeze, five drill segments, freeze, playback.
    assert_eq!(outcome.segments, 9);
    assert!(output.exists());
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_freeze_unit_audio_spans_video_duration() {
    let dir = tempfile::tempdir().unwrap();
    let source = make_source(dir.path());
    let tools = FfmpegTools::discover(300).unwrap();
    let encoder = SegmentEncoder::new(
        tools.clone(),
        Arc::new(NoTts),
        AspectClass::Standard,
        "en-US-AriaNeural",
        dir.path(),
    );

    let freeze_duration = 2.5;
    let spec = |audio: AudioSource| SegmentSpec {
        source: TimeRange::new(3.0, 6.0).unwrap(),
        subtitle_mode: SubtitleMode::None,
        audio,
        effect: SegmentEffect::Freeze {
            duration: freeze_duration,
            position: FreezePosition::Start,
        },
        label: "freeze".into(),
    };

    // Frozen frames must still carry a full-length audio track, whether it
    // comes from the source or from generated silence.
    for audio in [AudioSource::Original, AudioSource::Silence] {
        let unit = encoder
            .encode_segment(0, &spec(audio.clone()), &source, None)
            .await
            .expect("freeze encode failed");
        assert!(unit.synthetic);

        let info = probe::probe(&tools, &unit.path).await.unwrap();
        assert!(
            (info.duration - freeze_duration).abs() < 0.2,
            "freeze unit duration {} too far from {freeze_duration} ({audio:?})",
            info.duration
        );
        let stream = info
            .audio
            .unwrap_or_else(|| panic!("freeze unit must carry audio ({audio:?})"));
        let audio_duration = stream.duration.unwrap_or(info.duration);
        assert!(
            (audio_duration - info.duration).abs() < 0.2,
            "audio track {audio_duration}s does not span the {}s video ({audio:?})",
            info.duration
        );
    }
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_scratch_removed_after_job() {
    let dir = tempfile::tempdir().unwrap();
    let source = make_source(dir.path());
    let output = dir.path().join("final.mp4");

    let pipeline = pipeline(dir.path());
    let range = TimeRange::new(2.0, 4.0).unwrap();
    pipeline
        .run(
            &JobId::new(),
            &request(&source, "template_2", range),
            &output,
            &NullSink,
        )
        .await
        .expect("render failed");

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("job_"))
        .collect();
    assert!(leftovers.is_empty(), "job scratch directories leaked");
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_unreadable_media_fails_before_encode() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("final.mp4");

    let pipeline = pipeline(dir.path());
    let range = TimeRange::new(2.0, 4.0).unwrap();
    let err = pipeline
        .run(
            &JobId::new(),
            &request(Path::new("/nonexistent/source.mp4"), "template_1", range),
            &output,
            &NullSink,
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        WorkerError::Media(sclip_media::MediaError::InvalidMedia { .. })
    ));
    assert_eq!(err.stage(), sclip_models::JobStage::Planning);
    assert!(!output.exists(), "failed job must not leave an artifact");
}
