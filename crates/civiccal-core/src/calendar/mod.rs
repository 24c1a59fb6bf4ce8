//! Unified calendar aggregation over slot records and appointments.
//!
//! The aggregator is an independent read path: it discovers the user's
//! businesses, walks their clinics' slot records, merges in the user's
//! direct appointments, and produces one time-bounded event feed. Each
//! source is individually guarded so one failing fetch degrades the feed
//! instead of aborting it.

pub mod aggregator;
pub mod events;

pub use aggregator::CalendarAggregator;
