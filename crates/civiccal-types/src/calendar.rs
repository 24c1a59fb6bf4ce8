//! Derived calendar projections: per-slot availability and unified events.
//!
//! Nothing in this module is persisted. Slots are recomputed on every
//! availability query; calendar events are produced only by the aggregator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;

use crate::time::TimeWindow;

/// Per-slot occupancy snapshot for one candidate window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Slot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Non-cancelled appointments overlapping this window.
    pub booked_count: u32,
    /// Capacity minus occupancy, clamped at zero.
    pub remaining_capacity: u32,
    pub available: bool,
    /// Whether any overlapping appointment belongs to the requesting user.
    pub booked_by_caller: bool,
}

impl Slot {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }
}

/// The perspective a calendar is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewRole {
    Patient,
    Clinician,
    Both,
}

impl ViewRole {
    pub fn includes_patient(&self) -> bool {
        matches!(self, ViewRole::Patient | ViewRole::Both)
    }

    pub fn includes_clinician(&self) -> bool {
        matches!(self, ViewRole::Clinician | ViewRole::Both)
    }
}

/// Which source produced a calendar event.
///
/// A slot-booking record and an appointment record can describe the same
/// visit; the aggregator does not reconcile them, so callers that need to
/// can key on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Slot,
    Appointment,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Slot => write!(f, "slot"),
            EventKind::Appointment => write!(f, "appointment"),
        }
    }
}

/// Display color assigned to an event by role and booking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventColor {
    /// Clinician viewing a slot they staff.
    Teal,
    /// Patient's own booking.
    Blue,
    /// Pending (unconfirmed) appointment.
    Amber,
}

/// One entry in the unified calendar feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: uuid::Uuid,
    pub kind: EventKind,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub title: String,
    pub color: EventColor,
    pub role: ViewRole,
}

/// Result of a calendar aggregation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarFeed {
    /// Events sorted by start time.
    pub events: Vec<CalendarEvent>,
    /// True when at least one source failed but at least one succeeded.
    pub partial: bool,
    /// Instant the feed was computed, for staleness checks by callers.
    pub computed_at: Option<DateTime<Utc>>,
}

impl CalendarFeed {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
