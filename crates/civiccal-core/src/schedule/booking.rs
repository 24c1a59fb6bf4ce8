//! Booking coordination: reserve and cancel against a specific slot.
//!
//! The coordinator validates the caller and the window, then delegates the
//! capacity check and the write to the storage layer's atomic
//! `reserve_slot` primitive, so a concurrent reservation of the same slot
//! cannot slip between check and write. Errors propagate unchanged to the
//! caller; nothing here retries.

use chrono::Duration;
use civiccal_types::appointment::{Appointment, AppointmentId, AppointmentStatus};
use civiccal_types::clinic::ClinicId;
use civiccal_types::error::BookingError;
use civiccal_types::event::{AppointmentChange, ChangeKind};
use civiccal_types::time::TimeWindow;
use tracing::info;

use crate::event::ChangeBus;
use crate::repository::appointment::{AppointmentRepository, ReserveOutcome, ReserveRequest};
use crate::repository::auth::AuthProvider;
use crate::repository::business::BusinessRepository;
use crate::repository::clinic::ClinicRepository;

/// Orchestrates slot reservation and appointment cancellation.
///
/// Generic over its ports to maintain clean architecture (civiccal-core
/// never depends on civiccal-infra). Successful writes are announced on
/// the change bus for the realtime calendar path.
pub struct BookingCoordinator<A, C, B, P> {
    appointment_repo: A,
    clinic_repo: C,
    business_repo: B,
    auth: P,
    bus: ChangeBus,
}

impl<A, C, B, P> BookingCoordinator<A, C, B, P>
where
    A: AppointmentRepository,
    C: ClinicRepository,
    B: BusinessRepository,
    P: AuthProvider,
{
    pub fn new(appointment_repo: A, clinic_repo: C, business_repo: B, auth: P, bus: ChangeBus) -> Self {
        Self {
            appointment_repo,
            clinic_repo,
            business_repo,
            auth,
            bus,
        }
    }

    /// Reserve a slot window at a clinic for the authenticated user.
    ///
    /// The created appointment is `pending`, its clinician is the owning
    /// business's owner, and its interval is exactly the slot window.
    /// Fails with `SlotUnavailable` when the slot is at capacity at write
    /// time, regardless of what an earlier availability snapshot showed.
    pub async fn reserve(
        &self,
        clinic_id: &ClinicId,
        window: TimeWindow,
        reason: Option<String>,
    ) -> Result<Appointment, BookingError> {
        let patient_id = self
            .auth
            .authenticated_user()
            .await
            .map_err(|_| BookingError::AuthenticationRequired)?;

        let clinic = self
            .clinic_repo
            .get(clinic_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if !window.is_well_formed() {
            return Err(BookingError::InvalidWindow(
                "window start must precede its end".to_string(),
            ));
        }
        let granularity = Duration::minutes(i64::from(clinic.slot_duration_minutes));
        if window.duration() > granularity {
            return Err(BookingError::InvalidWindow(format!(
                "window exceeds the clinic's {}-minute slot duration",
                clinic.slot_duration_minutes
            )));
        }

        let business = self
            .business_repo
            .get(&clinic.business_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let outcome = self
            .appointment_repo
            .reserve_slot(ReserveRequest {
                clinic_id: *clinic_id,
                business_id: business.id,
                patient_id,
                clinician_id: business.owner_id,
                window,
                capacity: clinic.slot_capacity,
                reason,
            })
            .await?;

        match outcome {
            ReserveOutcome::Reserved(appointment) => {
                info!(
                    appointment_id = %appointment.id,
                    clinic_id = %clinic_id,
                    slot_start = %window.start,
                    "slot reserved"
                );
                self.bus.publish(AppointmentChange {
                    appointment_id: appointment.id,
                    patient_id: appointment.patient_id,
                    clinician_id: appointment.clinician_id,
                    business_id: appointment.business_id,
                    kind: ChangeKind::Created,
                });
                Ok(appointment)
            }
            ReserveOutcome::SlotFull => Err(BookingError::SlotUnavailable),
        }
    }

    /// Cancel an appointment as its patient or clinician.
    ///
    /// Cancellation is a status transition; the record stays retrievable
    /// for audit. Any other caller gets `PermissionDenied` and the store
    /// is left untouched.
    pub async fn cancel(&self, appointment_id: &AppointmentId) -> Result<Appointment, BookingError> {
        self.transition(appointment_id, AppointmentStatus::Cancelled, ChangeKind::Cancelled)
            .await
    }

    /// Confirm a pending appointment (clinician side).
    pub async fn confirm(&self, appointment_id: &AppointmentId) -> Result<Appointment, BookingError> {
        self.transition(appointment_id, AppointmentStatus::Booked, ChangeKind::Updated)
            .await
    }

    /// Mark a booked appointment completed after the visit.
    pub async fn complete(&self, appointment_id: &AppointmentId) -> Result<Appointment, BookingError> {
        self.transition(appointment_id, AppointmentStatus::Completed, ChangeKind::Updated)
            .await
    }

    async fn transition(
        &self,
        appointment_id: &AppointmentId,
        next: AppointmentStatus,
        change_kind: ChangeKind,
    ) -> Result<Appointment, BookingError> {
        let caller = self
            .auth
            .authenticated_user()
            .await
            .map_err(|_| BookingError::AuthenticationRequired)?;

        let appointment = self
            .appointment_repo
            .get(appointment_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        if !appointment.involves(&caller) {
            return Err(BookingError::PermissionDenied);
        }
        // Confirmation and completion are clinician acts; cancellation is
        // open to either party.
        if next != AppointmentStatus::Cancelled && appointment.clinician_id != caller {
            return Err(BookingError::PermissionDenied);
        }
        if !appointment.status.can_transition_to(next) {
            return Err(BookingError::IllegalTransition {
                from: appointment.status.to_string(),
                to: next.to_string(),
            });
        }

        let updated = self.appointment_repo.update_status(appointment_id, next).await?;
        info!(
            appointment_id = %appointment_id,
            status = %next,
            "appointment status updated"
        );
        self.bus.publish(AppointmentChange {
            appointment_id: updated.id,
            patient_id: updated.patient_id,
            clinician_id: updated.clinician_id,
            business_id: updated.business_id,
            kind: change_kind,
        });
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use civiccal_types::business::{Business, BusinessId, BusinessStatus};
    use civiccal_types::clinic::Clinic;
    use civiccal_types::error::{AuthError, RepositoryError};
    use civiccal_types::user::UserId;
    use std::sync::Mutex;

    use crate::repository::appointment::ReserveOutcome;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, 0, 0).unwrap()
    }

    // --- In-memory fakes ---

    struct FakeAuth {
        user: Option<UserId>,
    }

    impl AuthProvider for FakeAuth {
        async fn authenticated_user(&self) -> Result<UserId, AuthError> {
            self.user.ok_or(AuthError::NotAuthenticated)
        }
    }

    struct FakeBusinessRepo {
        businesses: Vec<Business>,
    }

    impl BusinessRepository for FakeBusinessRepo {
        async fn get(&self, id: &BusinessId) -> Result<Option<Business>, RepositoryError> {
            Ok(self.businesses.iter().find(|b| b.id == *id).cloned())
        }

        async fn list_owned(&self, user_id: &UserId) -> Result<Vec<Business>, RepositoryError> {
            Ok(self
                .businesses
                .iter()
                .filter(|b| b.owner_id == *user_id)
                .cloned()
                .collect())
        }

        async fn list_member_of(&self, user_id: &UserId) -> Result<Vec<Business>, RepositoryError> {
            Ok(self
                .businesses
                .iter()
                .filter(|b| b.member_ids.contains(user_id))
                .cloned()
                .collect())
        }
    }

    struct FakeClinicRepo {
        clinics: Vec<Clinic>,
    }

    impl ClinicRepository for FakeClinicRepo {
        async fn get(&self, id: &ClinicId) -> Result<Option<Clinic>, RepositoryError> {
            Ok(self.clinics.iter().find(|c| c.id == *id).cloned())
        }

        async fn list_for_business(
            &self,
            business_id: &BusinessId,
        ) -> Result<Vec<Clinic>, RepositoryError> {
            Ok(self
                .clinics
                .iter()
                .filter(|c| c.business_id == *business_id)
                .cloned()
                .collect())
        }
    }

    /// Appointment store with the atomic reserve semantics faked over a
    /// mutex-guarded Vec.
    struct FakeAppointmentRepo {
        appointments: Mutex<Vec<Appointment>>,
    }

    impl FakeAppointmentRepo {
        fn new(seed: Vec<Appointment>) -> Self {
            Self {
                appointments: Mutex::new(seed),
            }
        }

        fn count(&self) -> usize {
            self.appointments.lock().unwrap().len()
        }
    }

    impl AppointmentRepository for FakeAppointmentRepo {
        async fn get(&self, id: &AppointmentId) -> Result<Option<Appointment>, RepositoryError> {
            Ok(self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == *id)
                .cloned())
        }

        async fn find_overlapping(
            &self,
            clinic_id: &ClinicId,
            window: TimeWindow,
        ) -> Result<Vec<Appointment>, RepositoryError> {
            Ok(self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.clinic_id == *clinic_id && window.overlaps(a.start, a.end))
                .cloned()
                .collect())
        }

        async fn list_for_patient(
            &self,
            user_id: &UserId,
            from: DateTime<Utc>,
        ) -> Result<Vec<Appointment>, RepositoryError> {
            Ok(self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.patient_id == *user_id && a.start >= from)
                .cloned()
                .collect())
        }

        async fn list_for_clinician(
            &self,
            user_id: &UserId,
            from: DateTime<Utc>,
        ) -> Result<Vec<Appointment>, RepositoryError> {
            Ok(self
                .appointments
                .lock()
                .unwrap()
                .iter()
                .filter(|a| a.clinician_id == *user_id && a.start >= from)
                .cloned()
                .collect())
        }

        async fn reserve_slot(
            &self,
            request: ReserveRequest,
        ) -> Result<ReserveOutcome, RepositoryError> {
            let mut appointments = self.appointments.lock().unwrap();
            let occupancy = appointments
                .iter()
                .filter(|a| {
                    a.clinic_id == request.clinic_id
                        && a.status != AppointmentStatus::Cancelled
                        && request.window.overlaps(a.start, a.end)
                })
                .count() as u32;
            if occupancy >= request.capacity {
                return Ok(ReserveOutcome::SlotFull);
            }
            let appointment = Appointment {
                id: AppointmentId::new(),
                patient_id: request.patient_id,
                clinician_id: request.clinician_id,
                business_id: request.business_id,
                clinic_id: request.clinic_id,
                start: request.window.start,
                end: request.window.end,
                status: AppointmentStatus::Pending,
                reason: request.reason,
                created_at: Utc::now(),
            };
            appointments.push(appointment.clone());
            Ok(ReserveOutcome::Reserved(appointment))
        }

        async fn update_status(
            &self,
            id: &AppointmentId,
            status: AppointmentStatus,
        ) -> Result<Appointment, RepositoryError> {
            let mut appointments = self.appointments.lock().unwrap();
            let appointment = appointments
                .iter_mut()
                .find(|a| a.id == *id)
                .ok_or(RepositoryError::NotFound)?;
            appointment.status = status;
            Ok(appointment.clone())
        }
    }

    // --- Fixture ---

    struct Fixture {
        clinic_id: ClinicId,
        owner: UserId,
        patient: UserId,
    }

    fn coordinator(
        capacity: u32,
        seed: Vec<Appointment>,
        auth_user: Option<UserId>,
        fixture: &Fixture,
    ) -> BookingCoordinator<FakeAppointmentRepo, FakeClinicRepo, FakeBusinessRepo, FakeAuth> {
        let business_id = BusinessId::new();
        let business = Business {
            id: business_id,
            owner_id: fixture.owner,
            member_ids: Vec::new(),
            title: "Harborview Health".to_string(),
            status: BusinessStatus::Active,
            created_at: Utc::now(),
        };
        let clinic = Clinic {
            id: fixture.clinic_id,
            business_id,
            title: "Walk-in Clinic".to_string(),
            operating_hours: Some(civiccal_types::clinic::OperatingHours {
                open_hour: 9,
                close_hour: 17,
            }),
            slot_duration_minutes: 60,
            slot_capacity: capacity,
        };
        BookingCoordinator::new(
            FakeAppointmentRepo::new(seed),
            FakeClinicRepo {
                clinics: vec![clinic],
            },
            FakeBusinessRepo {
                businesses: vec![business],
            },
            FakeAuth { user: auth_user },
            ChangeBus::new(16),
        )
    }

    fn fixture() -> Fixture {
        Fixture {
            clinic_id: ClinicId::new(),
            owner: UserId::new(),
            patient: UserId::new(),
        }
    }

    fn seeded_appointment(f: &Fixture, clinic_id: ClinicId, patient: UserId) -> Appointment {
        Appointment {
            id: AppointmentId::new(),
            patient_id: patient,
            clinician_id: f.owner,
            business_id: BusinessId::new(),
            clinic_id,
            start: at(9),
            end: at(10),
            status: AppointmentStatus::Pending,
            reason: None,
            created_at: Utc::now(),
        }
    }

    // --- Tests ---

    #[tokio::test]
    async fn reserve_requires_authentication() {
        let f = fixture();
        let coordinator = coordinator(20, Vec::new(), None, &f);

        let result = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(9), at(10)), None)
            .await;

        assert!(matches!(result, Err(BookingError::AuthenticationRequired)));
        assert_eq!(coordinator.appointment_repo.count(), 0);
    }

    #[tokio::test]
    async fn reserve_creates_pending_appointment_with_owner_as_clinician() {
        let f = fixture();
        let coordinator = coordinator(20, Vec::new(), Some(f.patient), &f);

        let appointment = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(9), at(10)), Some("checkup".to_string()))
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(appointment.patient_id, f.patient);
        assert_eq!(appointment.clinician_id, f.owner);
        assert_eq!(appointment.start, at(9));
        assert_eq!(appointment.end, at(10));
        assert_eq!(appointment.reason.as_deref(), Some("checkup"));
    }

    #[tokio::test]
    async fn reserve_full_slot_fails_and_creates_nothing() {
        let f = fixture();
        let seed = vec![seeded_appointment(&f, f.clinic_id, UserId::new())];
        let coordinator = coordinator(1, seed, Some(f.patient), &f);

        let result = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(9), at(10)), None)
            .await;

        assert!(matches!(result, Err(BookingError::SlotUnavailable)));
        assert_eq!(coordinator.appointment_repo.count(), 1);
    }

    #[tokio::test]
    async fn reserve_unknown_clinic_fails() {
        let f = fixture();
        let coordinator = coordinator(20, Vec::new(), Some(f.patient), &f);

        let result = coordinator
            .reserve(&ClinicId::new(), TimeWindow::new(at(9), at(10)), None)
            .await;

        assert!(matches!(result, Err(BookingError::NotFound)));
    }

    #[tokio::test]
    async fn reserve_rejects_window_exceeding_slot_duration() {
        let f = fixture();
        let coordinator = coordinator(20, Vec::new(), Some(f.patient), &f);

        let result = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(9), at(11)), None)
            .await;

        assert!(matches!(result, Err(BookingError::InvalidWindow(_))));
    }

    #[tokio::test]
    async fn reserve_rejects_inverted_window() {
        let f = fixture();
        let coordinator = coordinator(20, Vec::new(), Some(f.patient), &f);

        let result = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(10), at(9)), None)
            .await;

        assert!(matches!(result, Err(BookingError::InvalidWindow(_))));
    }

    #[tokio::test]
    async fn fourth_booking_under_capacity_twenty_succeeds() {
        let f = fixture();
        let seed: Vec<_> = (0..3)
            .map(|_| seeded_appointment(&f, f.clinic_id, UserId::new()))
            .collect();
        let coordinator = coordinator(20, seed, Some(f.patient), &f);

        let appointment = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(9), at(10)), None)
            .await
            .unwrap();

        assert_eq!(appointment.status, AppointmentStatus::Pending);
        assert_eq!(coordinator.appointment_repo.count(), 4);
    }

    #[tokio::test]
    async fn cancel_by_stranger_is_denied_and_store_unchanged() {
        let f = fixture();
        let target = seeded_appointment(&f, f.clinic_id, f.patient);
        let target_id = target.id;
        let stranger = UserId::new();
        let coordinator = coordinator(20, vec![target], Some(stranger), &f);

        let result = coordinator.cancel(&target_id).await;

        assert!(matches!(result, Err(BookingError::PermissionDenied)));
        let stored = coordinator.appointment_repo.get(&target_id).await.unwrap().unwrap();
        assert_eq!(stored.status, AppointmentStatus::Pending);
    }

    #[tokio::test]
    async fn cancel_by_patient_flips_status_and_keeps_record() {
        let f = fixture();
        let target = seeded_appointment(&f, f.clinic_id, f.patient);
        let target_id = target.id;
        let coordinator = coordinator(20, vec![target], Some(f.patient), &f);

        let cancelled = coordinator.cancel(&target_id).await.unwrap();

        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
        // Never hard-deleted.
        assert!(coordinator.appointment_repo.get(&target_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn cancel_by_clinician_is_allowed() {
        let f = fixture();
        let target = seeded_appointment(&f, f.clinic_id, f.patient);
        let target_id = target.id;
        let coordinator = coordinator(20, vec![target], Some(f.owner), &f);

        let cancelled = coordinator.cancel(&target_id).await.unwrap();
        assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    }

    #[tokio::test]
    async fn confirm_is_clinician_only() {
        let f = fixture();
        let target = seeded_appointment(&f, f.clinic_id, f.patient);
        let target_id = target.id;
        let coordinator = coordinator(20, vec![target], Some(f.patient), &f);

        let result = coordinator.confirm(&target_id).await;
        assert!(matches!(result, Err(BookingError::PermissionDenied)));
    }

    #[tokio::test]
    async fn cancelling_twice_is_an_illegal_transition() {
        let f = fixture();
        let mut target = seeded_appointment(&f, f.clinic_id, f.patient);
        target.status = AppointmentStatus::Cancelled;
        let target_id = target.id;
        let coordinator = coordinator(20, vec![target], Some(f.patient), &f);

        let result = coordinator.cancel(&target_id).await;
        assert!(matches!(result, Err(BookingError::IllegalTransition { .. })));
    }

    #[tokio::test]
    async fn successful_reserve_publishes_a_change() {
        let f = fixture();
        let coordinator = coordinator(20, Vec::new(), Some(f.patient), &f);
        let mut rx = coordinator.bus.subscribe();

        let appointment = coordinator
            .reserve(&f.clinic_id, TimeWindow::new(at(9), at(10)), None)
            .await
            .unwrap();

        let change = rx.recv().await.unwrap();
        assert_eq!(change.appointment_id, appointment.id);
        assert_eq!(change.kind, ChangeKind::Created);
    }
}
