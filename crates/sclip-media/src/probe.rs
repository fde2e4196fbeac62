//! Media probing via ffprobe.

use std::path::Path;

use serde::Deserialize;

use crate::error::{MediaError, MediaResult};
use crate::process::FfmpegTools;

/// Audio stream facts from a probe.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioInfo {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u8,
    /// Stream-level duration, when the container reports one.
    pub duration: Option<f64>,
}

/// Container and stream facts for one media file.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub video_codec: String,
    pub pix_fmt: Option<String>,
    pub audio: Option<AudioInfo>,
}

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    pix_fmt: Option<String>,
    sample_rate: Option<String>,
    channels: Option<u8>,
    duration: Option<String>,
}

/// Probe a media file. Fails with `InvalidMedia` if the path is unreadable
/// or the probe finds no video stream.
pub async fn probe(tools: &FfmpegTools, path: &Path) -> MediaResult<MediaInfo> {
    if !path.exists() {
        return Err(MediaError::invalid_media(path, "file does not exist"));
    }

    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.display().to_string(),
    ];

    let stdout = tools
        .run_ffprobe(&args)
        .await
        .map_err(|e| match e {
            MediaError::EncodeFailed { stderr, .. } => MediaError::invalid_media(
                path,
                stderr.unwrap_or_else(|| "probe failed".to_string()),
            ),
            other => other,
        })?;

    parse_probe_output(path, &stdout)
}

/// Probe only the container duration. Works for audio-only files (TTS
/// output), which the full probe rejects for lacking a video stream.
pub async fn probe_duration(tools: &FfmpegTools, path: &Path) -> MediaResult<f64> {
    if !path.exists() {
        return Err(MediaError::invalid_media(path, "file does not exist"));
    }

    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        path.display().to_string(),
    ];

    let stdout = tools.run_ffprobe(&args).await.map_err(|e| match e {
        MediaError::EncodeFailed { stderr, .. } => {
            MediaError::invalid_media(path, stderr.unwrap_or_else(|| "probe failed".to_string()))
        }
        other => other,
    })?;

    let parsed: FfprobeOutput = serde_json::from_str(&stdout)?;
    parsed
        .format
        .and_then(|f| f.duration)
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::invalid_media(path, "no duration reported"))
}

fn parse_probe_output(path: &Path, raw: &str) -> MediaResult<MediaInfo> {
    let parsed: FfprobeOutput = serde_json::from_str(raw)?;

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::invalid_media(path, "no video stream"))?;

    let audio = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioInfo {
            codec: s.codec_name.clone().unwrap_or_default(),
            sample_rate: s
                .sample_rate
                .as_deref()
                .and_then(|r| r.parse().ok())
                .unwrap_or(0),
            channels: s.channels.unwrap_or(0),
            duration: s.duration.as_deref().and_then(|d| d.parse().ok()),
        });

    let duration = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_deref())
        .or(video.duration.as_deref())
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| MediaError::invalid_media(path, "no duration reported"))?;

    Ok(MediaInfo {
        duration,
        width: video.width.unwrap_or(0),
        height: video.height.unwrap_or(0),
        fps: video
            .r_frame_rate
            .as_deref()
            .map(parse_frame_rate)
            .unwrap_or(0.0),
        video_codec: video.codec_name.clone().unwrap_or_default(),
        pix_fmt: video.pix_fmt.clone(),
        audio,
    })
}

/// Parse ffprobe's rational frame rate ("30/1", "30000/1001").
fn parse_frame_rate(raw: &str) -> f64 {
    match raw.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().unwrap_or(0.0);
            let den: f64 = den.parse().unwrap_or(1.0);
            if den == 0.0 {
                0.0
            } else {
                num / den
            }
        }
        None => raw.parse().unwrap_or(0.0),
    }
}
