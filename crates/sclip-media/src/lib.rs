//! FFmpeg CLI adapter for the ShadowClip backend.
//!
//! This crate turns segment specs into standardized media units and joins
//! them into the final deliverable:
//! - tool discovery and subprocess lifecycle (timeout, process-group kill)
//! - media probing
//! - the segment encoder adapter (trim, freeze, still+TTS, gaps)
//! - the concatenation engine (stream-copy vs re-encode join)
//! - the TTS collaborator seam

pub mod concat;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod probe;
pub mod process;
pub mod tts;

pub use concat::{Concatenator, JoinEngine, JoinStrategy};
pub use encoder::{SegmentEncoder, UnitEncoder};
pub use error::{MediaError, MediaResult};
pub use probe::{probe, probe_duration, AudioInfo, MediaInfo};
pub use process::{FfmpegTools, ProcessOutput};
pub use tts::{EdgeTtsClient, SpeechSynthesizer, TtsAudio, TtsError};
