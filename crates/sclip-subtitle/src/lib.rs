//! Subtitle variant resolution and overlay rendering.
//!
//! This crate derives the exact text payload for each subtitle mode
//! (including deterministic keyword blanking) and renders it as an ASS
//! overlay document the encoder burns in.

pub mod ass;
pub mod blank;
pub mod resolver;
pub mod style;

pub use ass::AssDocument;
pub use blank::blank_keywords;
pub use resolver::{resolve, SubtitleVariant};
pub use style::{LineRole, StyleProfile};
