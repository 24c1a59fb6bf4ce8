//! Mapping from stored records to calendar events.
//!
//! Titles and colors depend on which side of the visit the viewer is on:
//! a clinician sees the slots they staff, a patient sees their own
//! bookings. No cross-source reconciliation happens here; a slot-booking
//! record and an appointment record for the same visit each produce an
//! event, distinguished by `EventKind`.

use civiccal_types::appointment::{Appointment, AppointmentStatus};
use civiccal_types::calendar::{CalendarEvent, EventColor, EventKind, ViewRole};
use civiccal_types::clinic::SlotRecord;
use civiccal_types::user::UserId;

/// Map a slot-booking record to a calendar event from the user's
/// perspective.
pub fn slot_event(record: &SlotRecord, user_id: &UserId, role: ViewRole) -> CalendarEvent {
    let clinician_side = role.includes_clinician() && record.clinician_id == *user_id;
    let (title, color, event_role) = if clinician_side {
        (
            format!("Clinic slot ({} booked)", record.booked_user_ids.len()),
            EventColor::Teal,
            ViewRole::Clinician,
        )
    } else {
        (
            format!("Clinic booking ({})", record.status),
            EventColor::Blue,
            ViewRole::Patient,
        )
    };

    CalendarEvent {
        id: record.id.0,
        kind: EventKind::Slot,
        start: record.start,
        end: record.end,
        title,
        color,
        role: event_role,
    }
}

/// Map a direct appointment record to a calendar event from the user's
/// perspective.
pub fn appointment_event(appointment: &Appointment, user_id: &UserId) -> CalendarEvent {
    let clinician_side = appointment.clinician_id == *user_id;
    let (title, color, role) = if clinician_side {
        (
            format!("Patient visit ({})", appointment.status),
            EventColor::Teal,
            ViewRole::Clinician,
        )
    } else {
        let color = if appointment.status == AppointmentStatus::Pending {
            EventColor::Amber
        } else {
            EventColor::Blue
        };
        (
            format!("Appointment ({})", appointment.status),
            color,
            ViewRole::Patient,
        )
    };

    CalendarEvent {
        id: appointment.id.0,
        kind: EventKind::Appointment,
        start: appointment.start,
        end: appointment.end,
        title,
        color,
        role,
    }
}
