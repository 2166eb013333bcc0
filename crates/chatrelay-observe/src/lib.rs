//! Observability setup for the chat relay: structured logging with optional
//! OpenTelemetry span export.

pub mod tracing_setup;
