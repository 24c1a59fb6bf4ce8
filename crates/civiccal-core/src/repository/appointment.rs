//! Appointment repository trait definition, including the atomic
//! slot-reservation primitive.

use chrono::{DateTime, Utc};
use civiccal_types::appointment::{Appointment, AppointmentId, AppointmentStatus};
use civiccal_types::business::BusinessId;
use civiccal_types::clinic::ClinicId;
use civiccal_types::error::RepositoryError;
use civiccal_types::time::TimeWindow;
use civiccal_types::user::UserId;

/// Everything the storage layer needs to reserve a slot in one shot.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub clinic_id: ClinicId,
    pub business_id: BusinessId,
    pub patient_id: UserId,
    pub clinician_id: UserId,
    pub window: TimeWindow,
    /// Maximum bookings for this slot window; the store rejects the write
    /// when occupancy has already reached it.
    pub capacity: u32,
    pub reason: Option<String>,
}

/// Result of the atomic reservation primitive.
///
/// `SlotFull` is an expected outcome, not a storage failure, so it is
/// carried in the Ok variant rather than the error channel.
#[derive(Debug, Clone)]
pub enum ReserveOutcome {
    Reserved(Appointment),
    SlotFull,
}

/// Repository trait for appointment persistence.
///
/// `reserve_slot` is required to be a single atomic read-check-write:
/// count occupancy, compare against capacity, and insert, with no
/// interleaving writer. The engine holds no lock of its own; "at most
/// capacity bookings per slot" rests entirely on this contract.
pub trait AppointmentRepository: Send + Sync {
    /// Get an appointment by its unique ID.
    fn get(
        &self,
        id: &AppointmentId,
    ) -> impl std::future::Future<Output = Result<Option<Appointment>, RepositoryError>> + Send;

    /// List appointments for a clinic whose interval overlaps the window.
    fn find_overlapping(
        &self,
        clinic_id: &ClinicId,
        window: TimeWindow,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, RepositoryError>> + Send;

    /// List appointments where the user is the patient, starting at or
    /// after `from`.
    fn list_for_patient(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, RepositoryError>> + Send;

    /// List appointments where the user is the clinician, starting at or
    /// after `from`.
    fn list_for_clinician(
        &self,
        user_id: &UserId,
        from: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<Vec<Appointment>, RepositoryError>> + Send;

    /// Atomically reserve a slot: count non-cancelled appointments
    /// overlapping the window, reject with `SlotFull` at capacity,
    /// otherwise insert a pending appointment and return it.
    fn reserve_slot(
        &self,
        request: ReserveRequest,
    ) -> impl std::future::Future<Output = Result<ReserveOutcome, RepositoryError>> + Send;

    /// Update an appointment's status and return the updated record.
    ///
    /// Returns `RepositoryError::NotFound` for an unknown id. Legality of
    /// the transition is the coordinator's concern, not the store's.
    fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> impl std::future::Future<Output = Result<Appointment, RepositoryError>> + Send;
}
