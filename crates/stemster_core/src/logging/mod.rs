//! Logging infrastructure.
//!
//! Two layers, with different audiences:
//! - `tracing` for developer diagnostics throughout the crate
//! - [`JobLogger`] for the per-job capture of external tool output that
//!   backs `JobOutcome.log_lines` and failure diagnostics

mod job_logger;
mod types;

pub use job_logger::JobLogger;
pub use types::{LineCallback, LogConfig, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to the provided default directive.
/// Should be called once at application startup, by the binary rather
/// than the library.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
