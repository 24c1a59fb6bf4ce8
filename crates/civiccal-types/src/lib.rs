//! Shared domain types for Civiccal.
//!
//! This crate contains the core domain types used across the Civiccal
//! scheduling engine: Business, Clinic, Appointment, the derived Slot and
//! CalendarEvent projections, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod appointment;
pub mod business;
pub mod calendar;
pub mod clinic;
pub mod config;
pub mod error;
pub mod event;
pub mod time;
pub mod user;
