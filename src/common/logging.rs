//! Logging and tracing configuration
//!
//! The session controller emits `tracing` events for lifecycle changes,
//! dropped messages, and unrecognized tags. Hosts that already install a
//! subscriber can ignore this module; the helpers here cover standalone
//! harnesses and tests.

use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize a compact stdout subscriber.
///
/// Log level is controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("remote_debugger=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Initialize with an explicit filter directive, e.g. `"remote_debugger=trace"`.
///
/// Returns quietly if a global subscriber is already installed, so tests can
/// call it from every case.
pub fn init_with_filter(directives: &str) {
    let filter = EnvFilter::new(directives);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).compact())
        .try_init();
}
