//! Source time ranges.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A half-open range of seconds within the source media.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimeRange {
    /// Start offset in seconds.
    pub start: f64,
    /// End offset in seconds. Always greater than `start`.
    pub end: f64,
}

impl TimeRange {
    /// Create a validated time range. Fails unless `start < end` and both
    /// offsets are finite and non-negative.
    pub fn new(start: f64, end: f64) -> Result<Self, TimeRangeError> {
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(TimeRangeError::Invalid { start, end });
        }
        if start >= end {
            return Err(TimeRangeError::Invalid { start, end });
        }
        Ok(Self { start, end })
    }

    /// Range length in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `other` lies entirely within this range.
    pub fn contains(&self, other: &TimeRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Whether `other` shares any interior point with this range.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}-{:.3}", self.start, self.end)
    }
}

/// Errors for time range construction.
#[derive(Debug, Error, PartialEq)]
pub enum TimeRangeError {
    #[error("Invalid time range: start={start}, end={end} (start must be < end and >= 0)")]
    Invalid { start: f64, end: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_inverted_range() {
        assert!(TimeRange::new(15.0, 10.0).is_err());
        assert!(TimeRange::new(10.0, 10.0).is_err());
        assert!(TimeRange::new(-1.0, 5.0).is_err());
        assert!(TimeRange::new(f64::NAN, 5.0).is_err());
    }

    #[test]
    fn test_duration() {
        let r = TimeRange::new(10.0, 15.5).unwrap();
        assert!((r.duration() - 5.5).abs() < 1e-9);
    }

    #[test]
    fn test_contains_and_overlaps() {
        let outer = TimeRange::new(0.0, 60.0).unwrap();
        let inner = TimeRange::new(10.0, 20.0).unwrap();
        let partial = TimeRange::new(50.0, 70.0).unwrap();

        assert!(outer.contains(&inner));
        assert!(!outer.contains(&partial));
        assert!(outer.overlaps(&partial));
        assert!(!inner.overlaps(&partial));
    }
}
