//! Change-notification bus for appointment writes.
//!
//! Provides a `ChangeBus` that distributes `AppointmentChange` messages to
//! all subscribers via a `tokio::sync::broadcast` channel.

pub mod bus;

pub use bus::ChangeBus;
