use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::business::BusinessId;
use crate::clinic::ClinicId;
use crate::time::TimeWindow;
use crate::user::UserId;

/// Unique identifier for an appointment, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentId(pub Uuid);

impl AppointmentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppointmentId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A booked visit between a patient and a clinician.
///
/// Created by a successful reservation, mutated only through explicit
/// status transitions, never hard-deleted: cancellation flips the status
/// and leaves the record retrievable for audit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: UserId,
    pub clinician_id: UserId,
    pub business_id: BusinessId,
    /// Clinic the slot belongs to; lets the store answer occupancy queries
    /// with an indexed lookup instead of filtering by business.
    pub clinic_id: ClinicId,
    /// Interval invariant: `start < end`, enforced at reservation time.
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Appointment {
    /// The appointment's interval as a window.
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// True when the user is the patient or the clinician on this record.
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.patient_id == *user_id || self.clinician_id == *user_id
    }
}

/// Appointment lifecycle states.
///
/// - Pending: reserved, awaiting clinician confirmation
/// - Booked: confirmed by the clinician
/// - Completed: the visit took place
/// - Cancelled: terminal; the record stays for audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Booked,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Whether a transition from `self` to `next` is legal.
    ///
    /// Forward-only lifecycle: pending -> booked -> completed; cancellation
    /// is reachable from any non-terminal state.
    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Booked)
                | (Pending, Cancelled)
                | (Booked, Completed)
                | (Booked, Cancelled)
        )
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Completed | AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pending => write!(f, "pending"),
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Completed => write!(f, "completed"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(AppointmentStatus::Pending),
            "booked" => Ok(AppointmentStatus::Booked),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("invalid appointment status: '{other}'")),
        }
    }
}

impl Default for AppointmentStatus {
    fn default() -> Self {
        AppointmentStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions_are_forward_only() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Booked));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Booked.can_transition_to(Completed));
        assert!(Booked.can_transition_to(Cancelled));

        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!Booked.can_transition_to(Pending));
    }

    #[test]
    fn terminal_states() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(!AppointmentStatus::Pending.is_terminal());
    }

    #[test]
    fn status_round_trips_through_str() {
        assert_eq!(
            "booked".parse::<AppointmentStatus>().unwrap(),
            AppointmentStatus::Booked
        );
        assert_eq!(AppointmentStatus::Cancelled.to_string(), "cancelled");
        assert!("rescheduled".parse::<AppointmentStatus>().is_err());
    }
}
