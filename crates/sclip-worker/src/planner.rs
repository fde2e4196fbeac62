//! Segment planner.
//!
//! Pure expansion from a `ClipRequest` plus a `Template` into an ordered
//! `SegmentPlan`. No subprocess runs here; every validation failure this
//! module can produce surfaces before the first encode starts.

use tracing::debug;

use sclip_models::{
    AudioSource, ClipRequest, ContinuousRules, PatternStep, PlanItem, SegmentEffect, SegmentPlan,
    SegmentSpec, StudyMode, SubtitleMode, Template, TemplateError, TemplateRegistry, TimeRange,
};

use crate::error::{WorkerError, WorkerResult};

/// Playback spans shorter than this are dropped rather than trimmed.
const MIN_SPAN: f64 = 0.001;

/// Expand a request into a fully-derived segment plan.
pub fn plan(registry: &TemplateRegistry, request: &ClipRequest) -> WorkerResult<SegmentPlan> {
    // Requests arrive deserialized, so the range invariant is re-checked
    // here rather than trusted.
    let range = TimeRange::new(request.range.start, request.range.end)?;
    let template = registry.get(&request.template_id)?;

    let mut items = match &template.continuous {
        None => plan_clips(template, range),
        Some(rules) => plan_continuous(registry, rules, request, range)?,
    };

    match request.study {
        Some(StudyMode::Preview) => {
            items.insert(0, PlanItem::Segment(study_spec(template, request, range, 0)));
        }
        Some(StudyMode::Review) => {
            items.push(PlanItem::Segment(study_spec(template, request, range, -10)));
        }
        None => {}
    }

    let plan = SegmentPlan {
        template_id: template.id.clone(),
        aspect: template.aspect,
        items,
    };
    debug!(
        template = %plan.template_id,
        segments = plan.segment_count(),
        items = plan.items.len(),
        "expanded segment plan"
    );
    Ok(plan)
}

/// Expand a clips-based template: each rule yields `count` identical
/// specs, with gaps interleaved between adjacent segments.
fn plan_clips(template: &Template, range: TimeRange) -> Vec<PlanItem> {
    let specs = template.clips.iter().flat_map(|rule| {
        (0..rule.count).map(|_| SegmentSpec {
            source: range,
            subtitle_mode: rule.subtitle_mode,
            audio: AudioSource::Original,
            effect: SegmentEffect::None,
            label: rule.label.clone(),
        })
    });
    interleave_gaps(specs.collect(), template.gap_duration)
}

/// Expand a continuous-mode template: uninterrupted playback partitioned
/// at bookmark boundaries, each bookmark replaced by its drill pattern.
fn plan_continuous(
    registry: &TemplateRegistry,
    rules: &ContinuousRules,
    request: &ClipRequest,
    range: TimeRange,
) -> WorkerResult<Vec<PlanItem>> {
    let bookmarks = validate_bookmarks(&request.bookmarks, range)?;
    let mut items = Vec::new();
    let mut cursor = range.start;

    let playback = &rules.style.playback_subtitle_mode;
    for bookmark in &bookmarks {
        push_playback(&mut items, cursor, bookmark.start, rules.segment_duration, *playback);

        for step in &rules.pattern {
            match step {
                PatternStep::FreezeFrame { duration, position } => {
                    items.push(PlanItem::Segment(SegmentSpec {
                        source: *bookmark,
                        subtitle_mode: SubtitleMode::None,
                        audio: AudioSource::Silence,
                        effect: SegmentEffect::Freeze {
                            duration: *duration,
                            position: *position,
                        },
                        label: "freeze".to_string(),
                    }));
                }
                PatternStep::ApplyTemplate { template: id } => {
                    let drill = registry.get(id)?;
                    if drill.is_continuous() {
                        // A pattern may only expand clips-based templates;
                        // a continuous reference would recurse forever.
                        return Err(TemplateError::NotFound(id.clone()).into());
                    }
                    items.extend(plan_clips(drill, *bookmark));
                }
            }
        }
        cursor = bookmark.end;
    }
    push_playback(&mut items, cursor, range.end, rules.segment_duration, *playback);

    Ok(items)
}

/// Validate bookmark sub-ranges: each must be a well-formed range fully
/// inside the outer range, and siblings must not overlap. Returns them
/// sorted by start.
fn validate_bookmarks(
    bookmarks: &[TimeRange],
    outer: TimeRange,
) -> WorkerResult<Vec<TimeRange>> {
    let mut sorted = Vec::with_capacity(bookmarks.len());
    for bookmark in bookmarks {
        let bookmark = TimeRange::new(bookmark.start, bookmark.end)?;
        if !outer.contains(&bookmark) {
            return Err(WorkerError::InvalidBookmarkRange(format!(
                "bookmark {bookmark} extends outside the clip range {outer}"
            )));
        }
        sorted.push(bookmark);
    }
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    for pair in sorted.windows(2) {
        if pair[0].overlaps(&pair[1]) {
            return Err(WorkerError::InvalidBookmarkRange(format!(
                "bookmarks {} and {} overlap",
                pair[0], pair[1]
            )));
        }
    }
    Ok(sorted)
}

/// Emit playback segments covering `[start, end)`, split into chunks no
/// longer than `segment_duration`.
fn push_playback(
    items: &mut Vec<PlanItem>,
    start: f64,
    end: f64,
    segment_duration: f64,
    mode: SubtitleMode,
) {
    let mut cursor = start;
    while end - cursor > MIN_SPAN {
        let chunk_end = (cursor + segment_duration).min(end);
        let source = TimeRange {
            start: cursor,
            end: chunk_end,
        };
        items.push(PlanItem::Segment(SegmentSpec {
            source,
            subtitle_mode: mode,
            audio: AudioSource::Original,
            effect: SegmentEffect::None,
            label: "playback".to_string(),
        }));
        cursor = chunk_end;
    }
}

/// Build the still+TTS study unit for a request.
fn study_spec(
    template: &Template,
    request: &ClipRequest,
    range: TimeRange,
    rate_percent: i8,
) -> SegmentSpec {
    SegmentSpec {
        source: range,
        subtitle_mode: SubtitleMode::Full,
        audio: AudioSource::Tts {
            text: narration_text(request),
            rate_percent,
        },
        effect: SegmentEffect::StillFrame {
            min_duration: template.still.min_duration,
        },
        label: if rate_percent == 0 {
            "study_preview".to_string()
        } else {
            "study_review".to_string()
        },
    }
}

/// Narration text for study units: the source line, then the translation.
fn narration_text(request: &ClipRequest) -> String {
    let primary = request.text.primary.trim();
    let secondary = request.text.secondary.trim();
    if secondary.is_empty() {
        primary.to_string()
    } else if primary.is_empty() {
        secondary.to_string()
    } else {
        format!("{primary}. {secondary}")
    }
}

/// Interleave gaps between adjacent segments. Zero-duration gaps are
/// elided here and never reach the plan.
fn interleave_gaps(specs: Vec<SegmentSpec>, gap_duration: f64) -> Vec<PlanItem> {
    let mut items = Vec::with_capacity(specs.len() * 2);
    for spec in specs {
        if gap_duration > 0.0 && !items.is_empty() {
            items.push(PlanItem::Gap {
                duration: gap_duration,
            });
        }
        items.push(PlanItem::Segment(spec));
    }
    items
}
