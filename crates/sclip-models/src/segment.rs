//! Segment plans, specs, and standardized units.
//!
//! `SegmentSpec` values are derived and ephemeral: the planner creates them
//! per expansion step, the encoder adapter consumes them immediately, and
//! they are never persisted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::profile::{AspectClass, EncodingProfile};
use crate::subtitle::SubtitleMode;
use crate::time::TimeRange;

/// Where a freeze frame is captured within its source range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FreezePosition {
    Start,
    End,
}

/// Audio source for one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AudioSource {
    /// Audio extracted from the source media over the segment's range.
    Original,
    /// Synthesized narration. `rate_percent` is relative: 0 is the voice's
    /// natural rate, -10 slows it by 10%.
    Tts { text: String, rate_percent: i8 },
    /// Generated silence at the standard audio profile.
    Silence,
}

/// Visual effect applied to one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum SegmentEffect {
    /// Ordinary trimmed playback.
    None,
    /// Single frame held for `duration` seconds.
    Freeze {
        duration: f64,
        position: FreezePosition,
    },
    /// Still background (extracted frame or solid color) with text overlay,
    /// held for at least `min_duration` seconds.
    StillFrame { min_duration: f64 },
}

impl SegmentEffect {
    /// Whether this effect produces synthetic frames. Synthetic frames
    /// introduce PTS discontinuities a direct stream join cannot repair.
    pub fn is_synthetic(&self) -> bool {
        !matches!(self, SegmentEffect::None)
    }
}

/// One planned unit of output content before encoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentSpec {
    /// Source range this segment plays (or freezes/narrates over).
    pub source: TimeRange,
    pub subtitle_mode: SubtitleMode,
    pub audio: AudioSource,
    pub effect: SegmentEffect,
    /// Label inherited from the rule that produced this spec.
    pub label: String,
}

/// One entry of an ordered segment plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum PlanItem {
    Segment(SegmentSpec),
    /// Inter-segment gap rendered as black + silence. Zero-duration gaps
    /// are elided at plan time and never appear here.
    Gap { duration: f64 },
}

/// Ordered, fully-derived expansion of a template for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SegmentPlan {
    pub template_id: String,
    pub aspect: AspectClass,
    pub items: Vec<PlanItem>,
}

impl SegmentPlan {
    /// Number of planned segments, excluding gaps.
    pub fn segment_count(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i, PlanItem::Segment(_)))
            .count()
    }

    /// Whether any segment uses a synthetic effect, forcing the
    /// concatenation engine into a full re-encode join.
    pub fn has_synthetic_segments(&self) -> bool {
        self.items.iter().any(|i| match i {
            PlanItem::Segment(s) => s.effect.is_synthetic(),
            PlanItem::Gap { .. } => true,
        })
    }

    /// Nominal output duration before encoding, summing source ranges,
    /// freeze durations, still floors, and gaps. Still units may run
    /// longer if their narration exceeds the floor.
    pub fn expected_duration(&self) -> f64 {
        self.items
            .iter()
            .map(|item| match item {
                PlanItem::Segment(s) => match &s.effect {
                    SegmentEffect::None => s.source.duration(),
                    SegmentEffect::Freeze { duration, .. } => *duration,
                    SegmentEffect::StillFrame { min_duration } => *min_duration,
                },
                PlanItem::Gap { duration } => *duration,
            })
            .sum()
    }

    /// Iterate over segment specs in order.
    pub fn segments(&self) -> impl Iterator<Item = &SegmentSpec> {
        self.items.iter().filter_map(|i| match i {
            PlanItem::Segment(s) => Some(s),
            PlanItem::Gap { .. } => None,
        })
    }
}

/// One encoded, profile-normalized media file ready for concatenation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StandardizedUnit {
    pub path: PathBuf,
    /// Exact duration in seconds, taken from the encoded output.
    pub duration: f64,
    pub profile: EncodingProfile,
    /// True when the unit contains synthetic frames (freeze, still, gap).
    pub synthetic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(effect: SegmentEffect) -> SegmentSpec {
        SegmentSpec {
            source: TimeRange::new(10.0, 15.0).unwrap(),
            subtitle_mode: SubtitleMode::Full,
            audio: AudioSource::Original,
            effect,
            label: "full".into(),
        }
    }

    #[test]
    fn test_segment_count_excludes_gaps() {
        let plan = SegmentPlan {
            template_id: "t".into(),
            aspect: AspectClass::Standard,
            items: vec![
                PlanItem::Segment(spec(SegmentEffect::None)),
                PlanItem::Gap { duration: 0.5 },
                PlanItem::Segment(spec(SegmentEffect::None)),
            ],
        };
        assert_eq!(plan.segment_count(), 2);
        assert_eq!(plan.segments().count(), 2);
        assert!((plan.expected_duration() - 10.5).abs() < 1e-9);
    }

    #[test]
    fn test_gapless_plain_plan_is_not_synthetic() {
        let plan = SegmentPlan {
            template_id: "t".into(),
            aspect: AspectClass::Standard,
            items: vec![PlanItem::Segment(spec(SegmentEffect::None))],
        };
        assert!(!plan.has_synthetic_segments());
    }

    #[test]
    fn test_freeze_and_gaps_are_synthetic() {
        let freeze = SegmentEffect::Freeze {
            duration: 0.5,
            position: FreezePosition::Start,
        };
        assert!(freeze.is_synthetic());

        let plan = SegmentPlan {
            template_id: "t".into(),
            aspect: AspectClass::Standard,
            items: vec![
                PlanItem::Segment(spec(SegmentEffect::None)),
                PlanItem::Gap { duration: 0.5 },
            ],
        };
        assert!(plan.has_synthetic_segments());
    }
}
