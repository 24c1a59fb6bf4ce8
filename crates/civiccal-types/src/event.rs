//! Change-notification types for the appointment change bus.
//!
//! `AppointmentChange` is broadcast after every successful booking write.
//! All variants are Clone + Send + Sync for use with tokio broadcast
//! channels.

use serde::{Deserialize, Serialize};

use crate::appointment::AppointmentId;
use crate::business::BusinessId;
use crate::user::UserId;

/// What happened to an appointment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Created,
    Updated,
    Cancelled,
}

/// Notification emitted when an appointment record changes.
///
/// Carries both party ids so subscribers can filter by "user as patient"
/// and "user as clinician" without a store round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentChange {
    pub appointment_id: AppointmentId,
    pub patient_id: UserId,
    pub clinician_id: UserId,
    pub business_id: BusinessId,
    pub kind: ChangeKind,
}

impl AppointmentChange {
    /// True when the notification concerns the given user as either party.
    pub fn concerns(&self, user_id: &UserId) -> bool {
        self.patient_id == *user_id || self.clinician_id == *user_id
    }
}
