//! Per-slot occupancy projection over candidate windows and appointments.

use chrono::NaiveDate;
use civiccal_types::appointment::{Appointment, AppointmentStatus};
use civiccal_types::calendar::{Slot, ViewRole};
use civiccal_types::clinic::ClinicId;
use civiccal_types::error::BookingError;
use civiccal_types::time::TimeWindow;
use civiccal_types::user::UserId;
use tracing::warn;

use crate::repository::appointment::AppointmentRepository;
use crate::repository::clinic::ClinicRepository;
use crate::schedule::slots::generate_slots;

/// Merge candidate windows with the day's appointments into per-slot
/// occupancy.
///
/// For each window, counts non-cancelled appointments overlapping it
/// (three-way test: starts inside, ends inside, or spans entirely).
/// Remaining capacity clamps at zero; occupancy above capacity is logged
/// as an inconsistency rather than surfaced as an error. Deterministic
/// pure projection over data already in memory -- no I/O, no locking.
pub fn compute_availability(
    windows: &[TimeWindow],
    appointments: &[Appointment],
    capacity: u32,
    caller: &UserId,
    role: ViewRole,
) -> Vec<Slot> {
    windows
        .iter()
        .map(|window| {
            let mut booked_count: u32 = 0;
            let mut booked_by_caller = false;

            for appointment in appointments {
                if appointment.status == AppointmentStatus::Cancelled {
                    continue;
                }
                if !window.overlaps(appointment.start, appointment.end) {
                    continue;
                }
                booked_count += 1;
                let is_callers = (role.includes_patient() && appointment.patient_id == *caller)
                    || (role.includes_clinician() && appointment.clinician_id == *caller);
                if is_callers {
                    booked_by_caller = true;
                }
            }

            if booked_count > capacity {
                warn!(
                    slot_start = %window.start,
                    booked_count,
                    capacity,
                    "slot occupancy exceeds capacity; clamping remaining to zero"
                );
            }
            let remaining_capacity = capacity.saturating_sub(booked_count);

            Slot {
                start: window.start,
                end: window.end,
                booked_count,
                remaining_capacity,
                available: remaining_capacity > 0,
                booked_by_caller,
            }
        })
        .collect()
}

/// Read-side composition of the generator and the availability projection.
///
/// Generic over `ClinicRepository` and `AppointmentRepository` so tests can
/// drive it with in-memory fakes.
pub struct AvailabilityService<C, A> {
    clinic_repo: C,
    appointment_repo: A,
}

impl<C: ClinicRepository, A: AppointmentRepository> AvailabilityService<C, A> {
    pub fn new(clinic_repo: C, appointment_repo: A) -> Self {
        Self {
            clinic_repo,
            appointment_repo,
        }
    }

    /// Compute the clinic's slot availability for one day, from the
    /// caller's perspective.
    ///
    /// Slots are recomputed on every call; nothing is cached.
    pub async fn day_availability(
        &self,
        clinic_id: &ClinicId,
        date: NaiveDate,
        caller: &UserId,
        role: ViewRole,
    ) -> Result<Vec<Slot>, BookingError> {
        let clinic = self
            .clinic_repo
            .get(clinic_id)
            .await?
            .ok_or(BookingError::NotFound)?;

        let Some(hours) = clinic.operating_hours else {
            return Ok(Vec::new());
        };

        let windows = generate_slots(&hours, clinic.slot_duration_minutes, date);
        let Some(day_window) = windows.first().map(|first| {
            TimeWindow::new(first.start, windows.last().map_or(first.end, |w| w.end))
        }) else {
            return Ok(Vec::new());
        };

        let appointments = self
            .appointment_repo
            .find_overlapping(clinic_id, day_window)
            .await?;

        Ok(compute_availability(
            &windows,
            &appointments,
            clinic.slot_capacity,
            caller,
            role,
        ))
    }
}
