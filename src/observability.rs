//! Process-wide tracing setup.

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

fn resolve_env_filter() -> EnvFilter {
    if let Ok(level) = std::env::var("FOUNDRY_LOG_LEVEL") {
        if let Ok(filter) = EnvFilter::try_new(level) {
            return filter;
        }
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn json_requested() -> bool {
    std::env::var("FOUNDRY_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialize tracing output once per process. Logs go to stderr so that
/// command output on stdout stays clean.
///
/// Environment variables:
/// - `FOUNDRY_LOG_LEVEL`: level/filter override (`info`, `foundry_kit=debug`, ...).
/// - `RUST_LOG`: used when `FOUNDRY_LOG_LEVEL` is unset or invalid.
/// - `FOUNDRY_LOG_FORMAT=json`: emit JSON lines instead of human-readable text.
pub fn init_tracing() {
    INIT.get_or_init(|| {
        let registry = tracing_subscriber::registry().with(resolve_env_filter());
        let result = if json_requested() {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            registry
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        // Another subscriber may already be installed (e.g. by a host application).
        let _ = result;
    });
}
