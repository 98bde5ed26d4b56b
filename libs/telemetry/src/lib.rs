//! Telemetry helpers for wa-relay: subscriber installation (fmt/JSON, optional
//! OTLP span export) and the handful of counters the relay records.

use anyhow::Result;

mod config;
mod metrics;
mod tracing_init;

pub use config::{TelemetryConfig, TelemetryProtocol};
pub use metrics::{SendOutcome, record_send, record_session_event};
pub use tracing_init::init_telemetry;

/// Installs the subscriber configured from the environment (`RUST_LOG`,
/// `LOG_FORMAT`, `OTEL_*`).
pub fn install(service_name: &str) -> Result<()> {
    init_telemetry(TelemetryConfig::from_env(
        service_name,
        env!("CARGO_PKG_VERSION"),
    ))
}
