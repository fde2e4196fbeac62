//! ASS overlay document generation.
//!
//! Renders a resolved [`SubtitleVariant`] into a self-contained `.ass` file
//! covering one segment's duration. Play resolution matches the aspect
//! class so margins and font sizes land where the style profiles expect.

use std::io::Write;
use std::path::Path;

use sclip_models::AspectClass;

use crate::resolver::SubtitleVariant;
use crate::style::{profile, LineRole};

/// One renderable overlay document.
#[derive(Debug, Clone)]
pub struct AssDocument {
    aspect: AspectClass,
    events: Vec<(LineRole, f64, f64, String)>,
}

impl AssDocument {
    /// Build a document showing the variant for the whole clip duration.
    pub fn from_variant(variant: &SubtitleVariant, aspect: AspectClass, duration: f64) -> Self {
        let mut events = Vec::new();
        let mut push = |role: LineRole, text: &Option<String>| {
            if let Some(text) = text {
                events.push((role, 0.0, duration, escape_text(text)));
            }
        };
        push(LineRole::Primary, &variant.primary);
        push(LineRole::Secondary, &variant.secondary);
        push(LineRole::Note, &variant.note);
        Self { aspect, events }
    }

    /// Whether the document contains any dialogue at all.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Render the full document.
    pub fn render(&self) -> String {
        let (width, height) = self.aspect.resolution();
        let mut out = String::new();

        out.push_str(&format!(
            "[Script Info]\n\
             Title: ShadowClip Subtitles\n\
             ScriptType: v4.00+\n\
             PlayResX: {width}\n\
             PlayResY: {height}\n\
             Collisions: Normal\n\
             WrapStyle: 0\n\
             ScaledBorderAndShadow: yes\n\n"
        ));

        out.push_str("[V4+ Styles]\n");
        out.push_str(
            "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, OutlineColour, \
             BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
             BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding\n",
        );
        for role in [LineRole::Primary, LineRole::Secondary, LineRole::Note] {
            out.push_str(&profile(self.aspect, role).ass_style_line(role.style_name()));
            out.push('\n');
        }
        out.push('\n');

        out.push_str("[Events]\n");
        out.push_str("Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text\n");
        for (role, start, end, text) in &self.events {
            out.push_str(&format!(
                "Dialogue: 0,{},{},{},,0,0,0,,{}\n",
                format_timestamp(*start),
                format_timestamp(*end),
                role.style_name(),
                text,
            ));
        }
        out
    }

    /// Write the document to disk.
    pub fn write_to(&self, path: &Path) -> std::io::Result<()> {
        let mut file = std::fs::File::create(path)?;
        file.write_all(self.render().as_bytes())
    }
}

/// ASS timestamp, `H:MM:SS.cc` with centisecond precision.
fn format_timestamp(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let s = (total_cs / 100) % 60;
    let m = (total_cs / 6_000) % 60;
    let h = total_cs / 360_000;
    format!("{h}:{m:02}:{s:02}.{cs:02}")
}

/// Newlines become ASS line breaks; override braces are neutralized so user
/// text cannot inject style tags.
fn escape_text(text: &str) -> String {
    text.replace('\n', "\\N").replace('{', "(").replace('}', ")")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant() -> SubtitleVariant {
        SubtitleVariant {
            primary: Some("Hello world".into()),
            secondary: Some("안녕하세요".into()),
            note: None,
        }
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00:00.00");
        assert_eq!(format_timestamp(5.5), "0:00:05.50");
        assert_eq!(format_timestamp(3_661.25), "1:01:01.25");
    }

    #[test]
    fn test_render_contains_styles_and_dialogue() {
        let doc = AssDocument::from_variant(&variant(), AspectClass::Standard, 5.0);
        let rendered = doc.render();
        assert!(rendered.contains("PlayResX: 1920"));
        assert!(rendered.contains("Style: Primary,"));
        assert!(rendered.contains("Dialogue: 0,0:00:00.00,0:00:05.00,Primary,,0,0,0,,Hello world"));
        assert!(rendered.contains("Dialogue: 0,0:00:00.00,0:00:05.00,Secondary,,0,0,0,,안녕하세요"));
    }

    #[test]
    fn test_tall_play_resolution() {
        let doc = AssDocument::from_variant(&variant(), AspectClass::Tall, 5.0);
        assert!(doc.render().contains("PlayResY: 1920"));
    }

    #[test]
    fn test_escaping() {
        let v = SubtitleVariant {
            primary: Some("line one\nline {two}".into()),
            secondary: None,
            note: None,
        };
        let doc = AssDocument::from_variant(&v, AspectClass::Standard, 2.0);
        assert!(doc.render().contains("line one\\Nline (two)"));
    }

    #[test]
    fn test_write_to_disk() {
        let doc = AssDocument::from_variant(&variant(), AspectClass::Standard, 5.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("overlay.ass");
        doc.write_to(&path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("[Script Info]"));
    }

    #[test]
    fn test_empty_variant_has_no_events() {
        let doc = AssDocument::from_variant(&SubtitleVariant::default(), AspectClass::Standard, 5.0);
        assert!(doc.is_empty());
    }
}
