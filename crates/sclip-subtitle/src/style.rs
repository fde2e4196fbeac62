//! Static subtitle style profiles.
//!
//! Looked up, not computed: the values differ only by aspect class and line
//! role. Colors are ASS BGR strings.

use sclip_models::AspectClass;

/// Which line of the variant a style applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineRole {
    Primary,
    Secondary,
    Note,
}

impl LineRole {
    /// ASS style name for the role.
    pub fn style_name(&self) -> &'static str {
        match self {
            LineRole::Primary => "Primary",
            LineRole::Secondary => "Secondary",
            LineRole::Note => "Note",
        }
    }
}

/// Font, size, color, and placement for one line role.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleProfile {
    pub font_name: &'static str,
    pub font_size: u32,
    pub bold: bool,
    /// Primary fill color, ASS `&HBBGGRR&` form.
    pub primary_colour: &'static str,
    pub outline_colour: &'static str,
    pub outline: u32,
    /// ASS numpad alignment (2 = bottom center, 7 = top left).
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

const FONT: &str = "Noto Sans CJK KR";
const WHITE: &str = "&HFFFFFF&";
const GOLD: &str = "&H00D7FF&";
const BLACK: &str = "&H000000&";

/// Style lookup for an aspect class and line role.
pub fn profile(aspect: AspectClass, role: LineRole) -> StyleProfile {
    let base = StyleProfile {
        font_name: FONT,
        font_size: 0,
        bold: true,
        primary_colour: WHITE,
        outline_colour: BLACK,
        outline: 3,
        alignment: 2,
        margin_l: 0,
        margin_r: 0,
        margin_v: 0,
    };

    match (aspect, role) {
        (AspectClass::Standard, LineRole::Primary) => StyleProfile {
            font_size: 100,
            margin_v: 120,
            ..base
        },
        (AspectClass::Standard, LineRole::Secondary) => StyleProfile {
            font_size: 90,
            primary_colour: GOLD,
            margin_v: 50,
            ..base
        },
        (AspectClass::Standard, LineRole::Note) => StyleProfile {
            font_size: 70,
            alignment: 7,
            margin_l: 80,
            margin_r: 80,
            margin_v: 80,
            ..base
        },
        // Tall output plays on narrower canvases; smaller faces, deeper
        // bottom margins to clear platform UI.
        (AspectClass::Tall, LineRole::Primary) => StyleProfile {
            font_size: 80,
            margin_v: 320,
            ..base
        },
        (AspectClass::Tall, LineRole::Secondary) => StyleProfile {
            font_size: 70,
            primary_colour: GOLD,
            margin_v: 220,
            ..base
        },
        (AspectClass::Tall, LineRole::Note) => StyleProfile {
            font_size: 56,
            alignment: 7,
            margin_l: 60,
            margin_r: 60,
            margin_v: 200,
            ..base
        },
    }
}

impl StyleProfile {
    /// Render the `[V4+ Styles]` line for this profile.
    pub fn ass_style_line(&self, name: &str) -> String {
        format!(
            "Style: {name},{font},{size},{primary},&H000000FF,{outline_c},&H00000000,\
             {bold},0,0,0,100,100,0,0,1,{outline},0,{align},{ml},{mr},{mv},1",
            font = self.font_name,
            size = self.font_size,
            primary = self.primary_colour,
            outline_c = self.outline_colour,
            bold = if self.bold { -1 } else { 0 },
            outline = self.outline,
            align = self.alignment,
            ml = self.margin_l,
            mr = self.margin_r,
            mv = self.margin_v,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ_by_aspect() {
        let standard = profile(AspectClass::Standard, LineRole::Primary);
        let tall = profile(AspectClass::Tall, LineRole::Primary);
        assert_ne!(standard.font_size, tall.font_size);
        assert_ne!(standard.margin_v, tall.margin_v);
    }

    #[test]
    fn test_secondary_is_gold() {
        let s = profile(AspectClass::Standard, LineRole::Secondary);
        assert_eq!(s.primary_colour, GOLD);
    }

    #[test]
    fn test_note_is_top_left() {
        let n = profile(AspectClass::Standard, LineRole::Note);
        assert_eq!(n.alignment, 7);
    }

    #[test]
    fn test_style_line_shape() {
        let line = profile(AspectClass::Standard, LineRole::Primary).ass_style_line("Primary");
        assert!(line.starts_with("Style: Primary,Noto Sans CJK KR,100,"));
    }
}
