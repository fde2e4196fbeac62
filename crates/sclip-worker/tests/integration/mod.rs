//! Integration tests for the clip worker.
//!
//! The render tests drive real ffmpeg/ffprobe binaries and are ignored by
//! default. Run with: `cargo test --test integration -- --ignored`

pub mod render_tests;
