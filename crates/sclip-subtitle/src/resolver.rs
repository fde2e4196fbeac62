//! Subtitle variant resolution.

use serde::{Deserialize, Serialize};

use sclip_models::{SubtitleMode, SubtitleText};

use crate::blank::blank_keywords;

/// The exact text payload rendered for one segment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubtitleVariant {
    pub primary: Option<String>,
    pub secondary: Option<String>,
    pub note: Option<String>,
}

impl SubtitleVariant {
    /// Whether anything would be rendered at all.
    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none() && self.note.is_none()
    }
}

/// Derive the subtitle payload for a mode.
///
/// Returns `None` for [`SubtitleMode::None`]: no overlay resource is
/// produced and the encoder skips the burn-in filter entirely. Empty text
/// lines are dropped rather than rendered as blank dialogue.
pub fn resolve(
    mode: SubtitleMode,
    text: &SubtitleText,
    keywords: &[String],
) -> Option<SubtitleVariant> {
    let non_empty = |s: &str| {
        let trimmed = s.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    };

    let variant = match mode {
        SubtitleMode::None => return None,
        SubtitleMode::Blank => SubtitleVariant {
            primary: non_empty(&blank_keywords(&text.primary, keywords)),
            secondary: None,
            note: None,
        },
        SubtitleMode::BlankSecondary => SubtitleVariant {
            primary: non_empty(&blank_keywords(&text.primary, keywords)),
            secondary: non_empty(&text.secondary),
            note: None,
        },
        SubtitleMode::Full => SubtitleVariant {
            primary: non_empty(&text.primary),
            secondary: non_empty(&text.secondary),
            note: non_empty(&text.note),
        },
        SubtitleMode::SecondaryOnly => SubtitleVariant {
            primary: None,
            secondary: non_empty(&text.secondary),
            note: None,
        },
        SubtitleMode::PrimaryOnly => SubtitleVariant {
            primary: non_empty(&text.primary),
            secondary: None,
            note: None,
        },
    };
    Some(variant)
}
