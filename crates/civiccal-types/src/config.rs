//! Engine configuration types.
//!
//! `EngineConfig` represents the top-level `config.toml` controlling slot
//! granularity, capacity, and the calendar window.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Civiccal scheduling engine.
///
/// Loaded from `{data_dir}/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Platform default slot length in minutes for clinics without an
    /// explicit setting.
    #[serde(default = "default_slot_duration_minutes")]
    pub slot_duration_minutes: u32,

    /// Platform default bookings-per-slot cap.
    #[serde(default = "default_slot_capacity")]
    pub slot_capacity: u32,

    /// Length of the forward-looking calendar window in days.
    #[serde(default = "default_calendar_window_days")]
    pub calendar_window_days: i64,

    /// Capacity of the appointment change broadcast channel.
    #[serde(default = "default_change_bus_capacity")]
    pub change_bus_capacity: usize,
}

fn default_slot_duration_minutes() -> u32 {
    60
}

fn default_slot_capacity() -> u32 {
    20
}

fn default_calendar_window_days() -> i64 {
    7
}

fn default_change_bus_capacity() -> usize {
    256
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            slot_duration_minutes: default_slot_duration_minutes(),
            slot_capacity: default_slot_capacity(),
            calendar_window_days: default_calendar_window_days(),
            change_bus_capacity: default_change_bus_capacity(),
        }
    }
}
