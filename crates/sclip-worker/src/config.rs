//! Worker configuration.
//!
//! Defaults are overridden by `SCLIP_`-prefixed environment variables
//! (e.g. `SCLIP_MAX_CONCURRENT_JOBS=4`).

use std::path::PathBuf;

use serde::Deserialize;

/// Worker runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Root directory for per-job scratch space.
    pub work_dir: PathBuf,

    /// Maximum number of jobs in flight.
    pub max_concurrent_jobs: usize,

    /// Maximum number of concurrent FFmpeg subprocesses across all jobs.
    pub max_ffmpeg_processes: usize,

    /// Per-subprocess timeout in seconds.
    pub ffmpeg_timeout_secs: u64,

    /// Opt-in stream-copy concatenation. Off by default; the join falls
    /// back to re-encode whenever any unit is synthetic regardless.
    pub allow_stream_copy: bool,

    /// Optional JSON template definition store. Built-in templates are
    /// used when absent.
    #[serde(default)]
    pub template_store: Option<PathBuf>,
}

impl WorkerConfig {
    /// Load configuration from defaults and the environment.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        config::Config::builder()
            .set_default("work_dir", "/tmp/shadowclip")?
            .set_default("max_concurrent_jobs", 2)?
            .set_default("max_ffmpeg_processes", parallelism as i64)?
            .set_default("ffmpeg_timeout_secs", 300)?
            .set_default("allow_stream_copy", false)?
            .add_source(config::Environment::with_prefix("SCLIP"))
            .build()?
            .try_deserialize()
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/shadowclip"),
            max_concurrent_jobs: 2,
            max_ffmpeg_processes: 4,
            ffmpeg_timeout_secs: 300,
            allow_stream_copy: false,
            template_store: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = WorkerConfig::from_env().unwrap();
        assert_eq!(cfg.max_concurrent_jobs, 2);
        assert!(!cfg.allow_stream_copy);
        assert!(cfg.template_store.is_none());
        assert!(cfg.max_ffmpeg_processes >= 1);
    }
}
