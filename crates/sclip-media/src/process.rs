//! Tool discovery and subprocess lifecycle.
//!
//! Every encode subprocess runs in its own process group with a
//! deterministic timeout. On timeout the whole group is killed, not just
//! the direct child, so no encoder processes outlive the job.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Captured output of a finished subprocess.
#[derive(Debug)]
pub struct ProcessOutput {
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Resolved ffmpeg/ffprobe binaries plus the per-invocation timeout.
#[derive(Debug, Clone)]
pub struct FfmpegTools {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Duration,
}

impl FfmpegTools {
    /// Locate ffmpeg and ffprobe on PATH.
    pub fn discover(timeout_secs: u64) -> MediaResult<Self> {
        let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;
        let ffprobe = which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;
        Ok(Self {
            ffmpeg,
            ffprobe,
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Construct with explicit binary paths. Intended for tests.
    pub fn with_paths(ffmpeg: PathBuf, ffprobe: PathBuf, timeout_secs: u64) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Run ffmpeg to completion. Nonzero exit becomes `EncodeFailed`.
    pub async fn run_ffmpeg(&self, args: &[String]) -> MediaResult<()> {
        debug!(args = ?args, "ffmpeg");
        let output = run_with_timeout(&self.ffmpeg, args, self.timeout).await?;
        if !output.success() {
            return Err(MediaError::encode_failed(
                "ffmpeg exited with an error",
                Some(truncate_stderr(&output.stderr)),
                output.exit_code,
            ));
        }
        Ok(())
    }

    /// Run ffprobe and return stdout.
    pub async fn run_ffprobe(&self, args: &[String]) -> MediaResult<String> {
        debug!(args = ?args, "ffprobe");
        let output = run_with_timeout(&self.ffprobe, args, self.timeout).await?;
        if !output.success() {
            return Err(MediaError::encode_failed(
                "ffprobe exited with an error",
                Some(truncate_stderr(&output.stderr)),
                output.exit_code,
            ));
        }
        Ok(output.stdout)
    }
}

/// Spawn `program` in a fresh process group and wait with a timeout. On
/// timeout the group receives SIGKILL and `Timeout` is returned; the
/// kill-on-drop backstop also covers task cancellation.
pub async fn run_with_timeout(
    program: &Path,
    args: &[String],
    timeout: Duration,
) -> MediaResult<ProcessOutput> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd.spawn()?;
    let pid = child.id();

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => {
            let output = result?;
            Ok(ProcessOutput {
                exit_code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Err(_) => {
            warn!(
                program = %program.display(),
                timeout_secs = timeout.as_secs(),
                "subprocess timed out, killing process group"
            );
            if let Some(pid) = pid {
                kill_process_group(pid);
            }
            Err(MediaError::Timeout(timeout.as_secs()))
        }
    }
}

#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Err(err) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        warn!(pid, %err, "failed to kill process group");
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {
    // kill_on_drop is the only recourse off unix
}

fn truncate_stderr(stderr: &str) -> String {
    const MAX: usize = 4096;
    if stderr.len() <= MAX {
        stderr.to_string()
    } else {
        let mut cut = MAX;
        while !stderr.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated)", &stderr[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_captures_output() {
        let out = run_with_timeout(
            Path::new("/bin/sh"),
            &["-c".to_string(), "echo hi >&2; echo out".to_string()],
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "out");
        assert_eq!(out.stderr.trim(), "hi");
    }

    #[tokio::test]
    async fn test_nonzero_exit_reported() {
        let out = run_with_timeout(
            Path::new("/bin/sh"),
            &["-c".to_string(), "exit 3".to_string()],
            Duration::from_secs(5),
        )
        .await
        .unwrap();
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[tokio::test]
    async fn test_timeout_kills_group() {
        let started = std::time::Instant::now();
        let err = run_with_timeout(
            Path::new("/bin/sh"),
            &["-c".to_string(), "sleep 30".to_string()],
            Duration::from_millis(200),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, MediaError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_truncate_stderr() {
        let long = "x".repeat(10_000);
        let truncated = truncate_stderr(&long);
        assert!(truncated.len() < 5_000);
        assert!(truncated.ends_with("(truncated)"));
    }
}
