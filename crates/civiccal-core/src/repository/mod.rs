//! Repository trait definitions (ports).
//!
//! These traits define the storage and auth interfaces that the
//! infrastructure layer (civiccal-infra) implements. The core crate never
//! depends on any specific storage technology; tests fake these ports
//! in memory.
//!
//! Queries are parameterized on the caller's window or party id so that
//! implementations can answer them with indexed lookups -- the engine never
//! filters unrelated records client-side.

pub mod appointment;
pub mod auth;
pub mod business;
pub mod clinic;
pub mod slot;
