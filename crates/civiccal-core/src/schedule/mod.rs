//! Slot scheduling: candidate window generation, availability projection,
//! and booking coordination.
//!
//! Data flows generator -> availability -> coordinator: candidate windows
//! are derived from the clinic's operating hours, merged with the day's
//! appointments into per-slot occupancy, and a selected slot is reserved
//! through the storage layer's atomic primitive.

pub mod availability;
pub mod booking;
pub mod slots;

pub use availability::{AvailabilityService, compute_availability};
pub use booking::BookingCoordinator;
pub use slots::generate_slots;
