//! Candidate slot-window generation from clinic operating hours.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use civiccal_types::clinic::OperatingHours;
use civiccal_types::time::TimeWindow;

/// Derive the day's candidate slot windows.
///
/// Produces ordered, contiguous, non-overlapping `[start, end)` windows
/// stepping through the operating day; a final partial window that would
/// cross the closing hour is not emitted. Closed or inverted hours yield
/// an empty sequence. Pure function, no I/O.
///
/// A 9..17 day at 60-minute duration yields exactly eight slots.
pub fn generate_slots(
    hours: &OperatingHours,
    slot_duration_minutes: u32,
    date: NaiveDate,
) -> Vec<TimeWindow> {
    if slot_duration_minutes == 0 || hours.open_hour >= hours.close_hour || hours.close_hour > 24 {
        return Vec::new();
    }

    let open = match date.and_hms_opt(hours.open_hour, 0, 0) {
        Some(naive) => Utc.from_utc_datetime(&naive),
        None => return Vec::new(),
    };
    let close = open + Duration::hours(i64::from(hours.close_hour - hours.open_hour));
    let step = Duration::minutes(i64::from(slot_duration_minutes));

    let mut windows = Vec::new();
    let mut cursor = open;
    while cursor + step <= close {
        windows.push(TimeWindow::new(cursor, cursor + step));
        cursor += step;
    }
    windows
}
