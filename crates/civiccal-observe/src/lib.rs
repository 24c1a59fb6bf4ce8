//! Observability for Civiccal: tracing subscriber setup with optional
//! OpenTelemetry export.

pub mod tracing_setup;
