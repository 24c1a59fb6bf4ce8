//! Infrastructure layer for Civiccal.
//!
//! Contains implementations of the repository traits defined in
//! `civiccal-core`: SQLite storage, the session auth provider, and the
//! configuration loader.

pub mod auth;
pub mod config;
pub mod sqlite;
