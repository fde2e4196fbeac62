//! Subtitle mode definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How subtitles are rendered for one segment.
///
/// A closed set: planners and resolvers match exhaustively, so adding a mode
/// is a compile-time-checked change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleMode {
    /// No overlay at all
    None,
    /// Primary text with keywords blanked, secondary hidden
    Blank,
    /// Blanked primary plus secondary translation
    BlankSecondary,
    /// Primary, secondary, and optional note, unmodified
    Full,
    /// Secondary translation only
    SecondaryOnly,
    /// Primary text only
    PrimaryOnly,
}

impl SubtitleMode {
    /// All available modes.
    pub const ALL: &'static [SubtitleMode] = &[
        SubtitleMode::None,
        SubtitleMode::Blank,
        SubtitleMode::BlankSecondary,
        SubtitleMode::Full,
        SubtitleMode::SecondaryOnly,
        SubtitleMode::PrimaryOnly,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubtitleMode::None => "none",
            SubtitleMode::Blank => "blank",
            SubtitleMode::BlankSecondary => "blank_secondary",
            SubtitleMode::Full => "full",
            SubtitleMode::SecondaryOnly => "secondary_only",
            SubtitleMode::PrimaryOnly => "primary_only",
        }
    }

    /// Whether this mode produces any overlay to burn in.
    pub fn has_overlay(&self) -> bool {
        !matches!(self, SubtitleMode::None)
    }
}

impl fmt::Display for SubtitleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubtitleMode {
    type Err = SubtitleModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SubtitleMode::None),
            "blank" => Ok(SubtitleMode::Blank),
            "blank_secondary" => Ok(SubtitleMode::BlankSecondary),
            "full" => Ok(SubtitleMode::Full),
            "secondary_only" => Ok(SubtitleMode::SecondaryOnly),
            "primary_only" => Ok(SubtitleMode::PrimaryOnly),
            _ => Err(SubtitleModeParseError(s.to_string())),
        }
    }
}

/// Raised for subtitle mode strings outside the closed set.
#[derive(Debug, Error, PartialEq)]
#[error("Unsupported subtitle mode: {0}")]
pub struct SubtitleModeParseError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parse() {
        assert_eq!("blank".parse::<SubtitleMode>().unwrap(), SubtitleMode::Blank);
        assert_eq!(
            "blank_secondary".parse::<SubtitleMode>().unwrap(),
            SubtitleMode::BlankSecondary
        );
        assert!("karaoke".parse::<SubtitleMode>().is_err());
    }

    #[test]
    fn test_mode_display_roundtrip() {
        for mode in SubtitleMode::ALL {
            assert_eq!(mode.to_string().parse::<SubtitleMode>().unwrap(), *mode);
        }
    }

    #[test]
    fn test_has_overlay() {
        assert!(!SubtitleMode::None.has_overlay());
        assert!(SubtitleMode::Full.has_overlay());
    }
}
