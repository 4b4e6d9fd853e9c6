//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global subscriber with the given default filter.
///
/// `RUST_LOG` takes precedence when set. Installation failures are ignored
/// so tests can call this repeatedly.
pub fn init_tracing(default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .try_init();
}

/// Initialize with the default `info` filter.
pub fn init_default() {
    init_tracing("info");
}
