//! Clip composition worker.
//!
//! This crate provides:
//! - The segment planner (template expansion, study units, continuous mode)
//! - The job pipeline (plan, encode, concatenate)
//! - A bounded job executor with graceful shutdown
//! - Progress emission

pub mod config;
pub mod error;
pub mod executor;
pub mod pipeline;
pub mod planner;
pub mod progress;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use executor::JobExecutor;
pub use pipeline::{JobOutcome, JobPipeline};
pub use progress::{NullSink, ProgressEvent, ProgressSink, TracingSink};
