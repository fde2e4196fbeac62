//! Template registry.
//!
//! Loads template definitions once at startup, validates every entry, and
//! exposes immutable lookup by id. Hot-reloading is out of scope: editing
//! the definition store requires a process restart.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::profile::AspectClass;
use crate::segment::FreezePosition;
use crate::subtitle::SubtitleMode;
use crate::template::{
    ContinuousRules, ContinuousStyle, PatternStep, SegmentRule, StillRules, Template,
    TemplateError,
};

/// On-disk shape of the definition store.
#[derive(Debug, Deserialize)]
struct TemplateStore {
    templates: Vec<Template>,
}

/// Read-only template lookup shared by all jobs.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: HashMap<String, Template>,
}

impl TemplateRegistry {
    /// Build a registry from explicit templates, validating each one.
    pub fn new(templates: Vec<Template>) -> Result<Self, TemplateError> {
        let mut map = HashMap::with_capacity(templates.len());
        for template in templates {
            template.validate()?;
            map.insert(template.id.clone(), template);
        }
        Ok(Self { templates: map })
    }

    /// Load from a JSON definition store.
    pub fn load(path: &Path) -> Result<Self, TemplateError> {
        let raw = std::fs::read_to_string(path)?;
        let store: TemplateStore = serde_json::from_str(&raw)?;
        let registry = Self::new(store.templates)?;
        info!(
            count = registry.templates.len(),
            path = %path.display(),
            "loaded template definitions"
        );
        Ok(registry)
    }

    /// The built-in template set, mirroring the classic shadowing patterns.
    pub fn builtin() -> Self {
        Self::new(builtin_templates()).expect("built-in templates must validate")
    }

    /// Lookup by id.
    pub fn get(&self, id: &str) -> Result<&Template, TemplateError> {
        self.templates
            .get(id)
            .ok_or_else(|| TemplateError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Ids in arbitrary order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }
}

fn rule(mode: SubtitleMode, count: u32, label: &str) -> SegmentRule {
    SegmentRule {
        subtitle_mode: mode,
        count,
        label: label.to_string(),
    }
}

fn clips_template(
    id: &str,
    name: &str,
    aspect: AspectClass,
    gap_duration: f64,
    clips: Vec<SegmentRule>,
) -> Template {
    Template {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        aspect,
        gap_duration,
        clips,
        continuous: None,
        still: StillRules::default(),
    }
}

fn builtin_templates() -> Vec<Template> {
    let progressive = vec![
        rule(SubtitleMode::None, 1, "1_nosub"),
        rule(SubtitleMode::Blank, 1, "2_blank"),
        rule(SubtitleMode::BlankSecondary, 1, "3_blank_sec"),
        rule(SubtitleMode::Full, 1, "4_full"),
        rule(SubtitleMode::None, 1, "5_nosub"),
    ];
    let keyword_focus = vec![
        rule(SubtitleMode::None, 1, "1_nosub"),
        rule(SubtitleMode::Blank, 1, "2_blank"),
        rule(SubtitleMode::Full, 2, "3_full"),
    ];
    let classic = vec![
        rule(SubtitleMode::None, 2, "1_nosub"),
        rule(SubtitleMode::BlankSecondary, 2, "2_blank_sec"),
        rule(SubtitleMode::Full, 2, "3_full"),
    ];

    let mut templates = vec![
        clips_template(
            "template_1",
            "Progressive Learning",
            AspectClass::Standard,
            1.5,
            progressive.clone(),
        ),
        clips_template(
            "template_2",
            "Keyword Focus",
            AspectClass::Standard,
            1.5,
            keyword_focus.clone(),
        ),
        clips_template(
            "template_3",
            "Classic Pattern",
            AspectClass::Standard,
            2.0,
            classic.clone(),
        ),
        clips_template(
            "template_1_shorts",
            "Progressive Learning (Shorts)",
            AspectClass::Tall,
            1.5,
            progressive,
        ),
        clips_template(
            "template_2_shorts",
            "Keyword Focus (Shorts)",
            AspectClass::Tall,
            1.5,
            keyword_focus,
        ),
        clips_template(
            "template_3_shorts",
            "Classic Pattern (Shorts)",
            AspectClass::Tall,
            2.0,
            classic,
        ),
    ];

    templates.push(Template {
        id: "template_lesson".to_string(),
        name: "Continuous Lesson".to_string(),
        description: Some("Continuous playback with bookmark drills".to_string()),
        aspect: AspectClass::Standard,
        gap_duration: 0.0,
        clips: Vec::new(),
        continuous: Some(ContinuousRules {
            pattern: vec![
                PatternStep::FreezeFrame {
                    duration: 0.5,
                    position: FreezePosition::Start,
                },
                PatternStep::ApplyTemplate {
                    template: "template_1".to_string(),
                },
                PatternStep::FreezeFrame {
                    duration: 0.5,
                    position: FreezePosition::End,
                },
            ],
            segment_duration: 30.0,
            style: ContinuousStyle {
                playback_subtitle_mode: SubtitleMode::Full,
            },
        }),
        still: StillRules::default(),
    });

    templates
}
