//! Observability setup for Codipop: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
