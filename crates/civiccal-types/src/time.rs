//! Time-window value type shared by slots, appointments, and queries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` interval in UTC.
///
/// Used both for generated slot windows and for repository window queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window spanning `days` days forward from `from`.
    pub fn forward_days(from: DateTime<Utc>, days: i64) -> Self {
        Self {
            start: from,
            end: from + Duration::days(days),
        }
    }

    /// Length of the window.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True when `start < end`.
    pub fn is_well_formed(&self) -> bool {
        self.start < self.end
    }

    /// Three-way overlap test against another interval.
    ///
    /// An interval intersects this window when it starts inside it, ends
    /// inside it, or spans it entirely. Half-open semantics: an interval
    /// that ends exactly at `self.start` or starts exactly at `self.end`
    /// does not overlap.
    pub fn overlaps(&self, other_start: DateTime<Utc>, other_end: DateTime<Utc>) -> bool {
        let starts_inside = other_start >= self.start && other_start < self.end;
        let ends_inside = other_end > self.start && other_end <= self.end;
        let spans = other_start < self.start && other_end > self.end;
        starts_inside || ends_inside || spans
    }

    /// True when the other window's start falls inside this window.
    pub fn contains_start(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}
