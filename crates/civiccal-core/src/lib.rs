//! Scheduling engine and repository trait definitions for Civiccal.
//!
//! This crate defines the "ports" (repository traits) that the
//! infrastructure layer implements, plus the four engine components: slot
//! generation, availability computation, booking coordination, and calendar
//! aggregation. It depends only on `civiccal-types` -- never on
//! `civiccal-infra` or any database/IO crate.

pub mod calendar;
pub mod event;
pub mod repository;
pub mod schedule;
