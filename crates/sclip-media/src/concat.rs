//! Concatenation engine.
//!
//! Joins ordered standardized units into the final deliverable. The
//! profile invariant is verified here, fail-fast: the join performs no
//! harmonization, so a mismatch would otherwise surface as corrupt output.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{error, info};

use sclip_models::{EncodingProfile, StandardizedUnit};

use crate::error::{MediaError, MediaResult};
use crate::process::FfmpegTools;

/// Seam between the pipeline and the join step. Production uses
/// [`Concatenator`]; tests swap in doubles.
#[async_trait]
pub trait JoinEngine: Send + Sync {
    async fn join(
        &self,
        units: &[StandardizedUnit],
        strategy: JoinStrategy,
        output: &Path,
    ) -> MediaResult<PathBuf>;
}

/// How units are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStrategy {
    /// Direct stream join without re-encoding. Only valid when every unit's
    /// profile is bit-identical and no unit contains synthetic frames.
    StreamCopy,
    /// One re-encode pass across all units. Mandatory whenever any unit
    /// used a freeze/still/gap effect: direct joins cannot repair the
    /// PTS/DTS discontinuities synthetic frames introduce.
    Reencode,
}

impl JoinStrategy {
    /// Select the join strategy for a unit sequence.
    ///
    /// Re-encode is the default; stream copy is a pure optimization that
    /// must be explicitly enabled and is refused outright if *any* unit in
    /// the sequence is synthetic, not just those adjacent to one.
    pub fn select(units: &[StandardizedUnit], allow_stream_copy: bool) -> JoinStrategy {
        if !allow_stream_copy {
            return JoinStrategy::Reencode;
        }
        let any_synthetic = units.iter().any(|u| u.synthetic);
        let uniform = units.windows(2).all(|w| w[0].profile == w[1].profile);
        if any_synthetic || !uniform {
            JoinStrategy::Reencode
        } else {
            JoinStrategy::StreamCopy
        }
    }
}

/// FFmpeg-backed join engine.
pub struct Concatenator {
    tools: FfmpegTools,
    profile: EncodingProfile,
}

impl Concatenator {
    pub fn new(tools: FfmpegTools, profile: EncodingProfile) -> Self {
        Self { tools, profile }
    }

    /// Verify the pairwise profile invariant. Violation is a programmer or
    /// configuration error, logged loudly and never silently repaired.
    pub fn verify_profiles(&self, units: &[StandardizedUnit]) -> MediaResult<()> {
        for (index, unit) in units.iter().enumerate() {
            if unit.profile != self.profile {
                error!(
                    index,
                    expected = ?self.profile,
                    actual = ?unit.profile,
                    "unit profile does not match the job profile"
                );
                return Err(MediaError::ProfileMismatch {
                    index,
                    expected: format!("{:?}", self.profile),
                    actual: format!("{:?}", unit.profile),
                });
            }
        }
        Ok(())
    }

    /// Join units, in order, into `output`.
    pub async fn concatenate(
        &self,
        units: &[StandardizedUnit],
        strategy: JoinStrategy,
        output: &Path,
    ) -> MediaResult<PathBuf> {
        if units.is_empty() {
            return Err(MediaError::ConcatFailed {
                message: "no units to concatenate".to_string(),
                stderr: None,
                exit_code: None,
            });
        }
        self.verify_profiles(units)?;

        let list = write_concat_list(units, output)?;
        let mut args = vec![
            "-y".to_string(),
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            list.display().to_string(),
        ];
        match strategy {
            JoinStrategy::StreamCopy => {
                args.extend(["-c".to_string(), "copy".to_string()]);
            }
            JoinStrategy::Reencode => {
                let v = &self.profile.video;
                let a = &self.profile.audio;
                args.extend([
                    "-c:v".to_string(),
                    v.codec.clone(),
                    "-preset".to_string(),
                    v.preset.clone(),
                    "-crf".to_string(),
                    v.crf.to_string(),
                    "-pix_fmt".to_string(),
                    v.pix_fmt.clone(),
                    "-r".to_string(),
                    v.fps.to_string(),
                    "-c:a".to_string(),
                    a.codec.clone(),
                    "-b:a".to_string(),
                    a.bitrate.clone(),
                    "-ar".to_string(),
                    a.sample_rate.to_string(),
                    "-ac".to_string(),
                    a.channels.to_string(),
                ]);
            }
        }
        args.extend([
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ]);

        let result = self.tools.run_ffmpeg(&args).await;
        let _ = std::fs::remove_file(&list);

        result.map_err(|e| match e {
            MediaError::EncodeFailed {
                message,
                stderr,
                exit_code,
            } => MediaError::ConcatFailed {
                message,
                stderr,
                exit_code,
            },
            other => other,
        })?;

        info!(
            units = units.len(),
            strategy = ?strategy,
            output = %output.display(),
            "concatenation complete"
        );
        Ok(output.to_path_buf())
    }
}

#[async_trait]
impl JoinEngine for Concatenator {
    async fn join(
        &self,
        units: &[StandardizedUnit],
        strategy: JoinStrategy,
        output: &Path,
    ) -> MediaResult<PathBuf> {
        self.concatenate(units, strategy, output).await
    }
}

/// Write the concat demuxer list next to the output file.
fn write_concat_list(units: &[StandardizedUnit], output: &Path) -> MediaResult<PathBuf> {
    let list = output.with_extension("concat.txt");
    let mut file = std::fs::File::create(&list)?;
    for unit in units {
        let escaped = unit
            .path
            .display()
            .to_string()
            .replace('\\', "/")
            .replace('\'', "'\\''");
        writeln!(file, "file '{escaped}'")?;
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sclip_models::AspectClass;

    fn unit(synthetic: bool, profile: EncodingProfile) -> StandardizedUnit {
        StandardizedUnit {
            path: PathBuf::from("/tmp/unit.mp4"),
            duration: 5.0,
            profile,
            synthetic,
        }
    }

    fn standard() -> EncodingProfile {
        EncodingProfile::standard(AspectClass::Standard)
    }

    #[test]
    fn test_reencode_is_the_default() {
        let units = vec![unit(false, standard()), unit(false, standard())];
        assert_eq!(JoinStrategy::select(&units, false), JoinStrategy::Reencode);
    }

    #[test]
    fn test_stream_copy_requires_uniform_plain_units() {
        let units = vec![unit(false, standard()), unit(false, standard())];
        assert_eq!(JoinStrategy::select(&units, true), JoinStrategy::StreamCopy);
    }

    #[test]
    fn test_any_synthetic_unit_forces_reencode() {
        let units = vec![
            unit(false, standard()),
            unit(true, standard()),
            unit(false, standard()),
        ];
        assert_eq!(JoinStrategy::select(&units, true), JoinStrategy::Reencode);
    }

    #[test]
    fn test_profile_divergence_forces_reencode() {
        let units = vec![
            unit(false, standard()),
            unit(false, EncodingProfile::standard(AspectClass::Tall)),
        ];
        assert_eq!(JoinStrategy::select(&units, true), JoinStrategy::Reencode);
    }

    #[test]
    fn test_verify_profiles_rejects_mismatch() {
        let tools = FfmpegTools::with_paths("ffmpeg".into(), "ffprobe".into(), 30);
        let concat = Concatenator::new(tools, standard());

        let units = vec![
            unit(false, standard()),
            unit(false, EncodingProfile::standard(AspectClass::Tall)),
        ];
        let err = concat.verify_profiles(&units).unwrap_err();
        match err {
            MediaError::ProfileMismatch { index, .. } => assert_eq!(index, 1),
            other => panic!("expected ProfileMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_verify_profiles_accepts_uniform() {
        let tools = FfmpegTools::with_paths("ffmpeg".into(), "ffprobe".into(), 30);
        let concat = Concatenator::new(tools, standard());
        let units = vec![unit(true, standard()), unit(false, standard())];
        assert!(concat.verify_profiles(&units).is_ok());
    }

    #[test]
    fn test_concat_list_escaping() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("final.mp4");
        let mut u = unit(false, standard());
        u.path = dir.path().join("unit's.mp4");

        let list = write_concat_list(std::slice::from_ref(&u), &output).unwrap();
        let contents = std::fs::read_to_string(&list).unwrap();
        assert!(contents.starts_with("file '"));
        assert!(contents.contains("'\\''"));
    }
}
