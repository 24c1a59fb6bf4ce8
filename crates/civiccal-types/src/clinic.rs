use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::business::BusinessId;
use crate::user::UserId;

/// Unique identifier for a clinic, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClinicId(pub Uuid);

impl ClinicId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ClinicId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClinicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClinicId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Daily operating window expressed as whole hours (e.g. 9..17).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatingHours {
    /// First hour of the day the clinic accepts bookings (0..=23).
    pub open_hour: u32,
    /// Hour the clinic closes; no slot may end after it (1..=24).
    pub close_hour: u32,
}

/// A clinic belonging to a business.
///
/// Slot duration and capacity are per-clinic settings; the platform
/// defaults are 60-minute slots with capacity 20.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clinic {
    pub id: ClinicId,
    pub business_id: BusinessId,
    pub title: String,
    /// `None` means the clinic has no operating day and generates no slots.
    pub operating_hours: Option<OperatingHours>,
    pub slot_duration_minutes: u32,
    /// Maximum bookings per slot window.
    pub slot_capacity: u32,
}

/// Unique identifier for a persisted slot-booking record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotId(pub Uuid);

impl SlotId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SlotId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SlotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A persisted slot-booking record under a clinic.
///
/// Distinct from the derived [`crate::calendar::Slot`] projection: this is
/// the stored form with its clinician and booked-member list, walked by the
/// calendar aggregator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotRecord {
    pub id: SlotId,
    pub clinic_id: ClinicId,
    pub clinician_id: UserId,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: SlotRecordStatus,
    /// Users holding a booking in this slot.
    pub booked_user_ids: Vec<UserId>,
}

impl SlotRecord {
    /// True when the user appears as the slot's clinician or in its
    /// booked-member list.
    pub fn involves(&self, user_id: &UserId) -> bool {
        self.clinician_id == *user_id || self.booked_user_ids.contains(user_id)
    }
}

/// Lifecycle state of a persisted slot record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotRecordStatus {
    Open,
    Closed,
}

impl fmt::Display for SlotRecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotRecordStatus::Open => write!(f, "open"),
            SlotRecordStatus::Closed => write!(f, "closed"),
        }
    }
}

impl FromStr for SlotRecordStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(SlotRecordStatus::Open),
            "closed" => Ok(SlotRecordStatus::Closed),
            other => Err(format!("invalid slot status: '{other}'")),
        }
    }
}
