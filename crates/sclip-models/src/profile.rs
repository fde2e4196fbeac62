//! Encoding profiles and aspect classes.
//!
//! Every intermediate unit destined for the same concatenation must share an
//! identical video and audio profile; the join step performs no further
//! harmonization. The constants here are the single source of truth for
//! those parameters.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output geometry class for a whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum AspectClass {
    /// Landscape 1920x1080
    #[default]
    Standard,
    /// Portrait 1080x1920 for shorts. Source footage is cropped to a
    /// centered square, scaled to 1080x1080, then padded vertically.
    Tall,
}

impl AspectClass {
    pub const ALL: &'static [AspectClass] = &[AspectClass::Standard, AspectClass::Tall];

    /// Output resolution (width, height).
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            AspectClass::Standard => (1920, 1080),
            AspectClass::Tall => (1080, 1920),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectClass::Standard => "standard",
            AspectClass::Tall => "tall",
        }
    }
}

impl fmt::Display for AspectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AspectClass {
    type Err = AspectClassParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(AspectClass::Standard),
            "tall" | "shorts" => Ok(AspectClass::Tall),
            _ => Err(AspectClassParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown aspect class: {0}")]
pub struct AspectClassParseError(String);

/// Video stream parameters for a standardized unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VideoProfile {
    pub codec: String,
    pub pix_fmt: String,
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub crf: u8,
    pub preset: String,
}

/// Audio stream parameters for a standardized unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AudioProfile {
    pub codec: String,
    pub sample_rate: u32,
    pub channels: u8,
    pub bitrate: String,
}

/// The uniform container/codec parameters every unit of one job is encoded
/// to. Pairwise equality of these across units is the central correctness
/// invariant of the concatenation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingProfile {
    pub video: VideoProfile,
    pub audio: AudioProfile,
}

impl EncodingProfile {
    /// The standard profile for an aspect class.
    pub fn standard(aspect: AspectClass) -> Self {
        let (width, height) = aspect.resolution();
        Self {
            video: VideoProfile {
                codec: "libx264".to_string(),
                pix_fmt: "yuv420p".to_string(),
                fps: 30,
                width,
                height,
                crf: 22,
                preset: "medium".to_string(),
            },
            audio: AudioProfile {
                codec: "aac".to_string(),
                sample_rate: 48_000,
                channels: 2,
                bitrate: "192k".to_string(),
            },
        }
    }
}
