//! Half-open time intervals with an optionally open end.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `[start, end)`. `end == None` means the interval is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: Option<DateTime<Utc>>) -> Self {
        Self { start, end }
    }

    pub fn closed(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn open(start: DateTime<Utc>) -> Self {
        Self { start, end: None }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// True when no instant lies inside the interval.
    pub fn is_empty(&self) -> bool {
        self.end.is_some_and(|end| end <= self.start)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && self.end.map_or(true, |end| at < end)
    }

    /// Whether `at` lies strictly between the bounds, i.e. is a cut point
    /// that would split this interval in two non-empty halves.
    pub fn splits_at(&self, at: DateTime<Utc>) -> bool {
        at > self.start && self.end.map_or(true, |end| at < end)
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.intersect(other).is_some()
    }

    pub fn intersect(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let start = self.start.max(other.start);
        let end = match (self.end, other.end) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (Some(a), None) | (None, Some(a)) => Some(a),
            (None, None) => None,
        };
        let interval = TimeInterval { start, end };
        (!interval.is_empty()).then_some(interval)
    }

    /// `self` ends exactly where `next` begins.
    pub fn adjoins(&self, next: &TimeInterval) -> bool {
        self.end == Some(next.start)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {})", self.start.to_rfc3339(), end.to_rfc3339()),
            None => write!(f, "[{}, open)", self.start.to_rfc3339()),
        }
    }
}
