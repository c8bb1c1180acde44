//! `ledgeriq-observability` — tracing setup for engine hosts.
//!
//! Hosts embedding `AnalyticsEngine` call `init()` once at startup. Engine
//! and metric code logs through `tracing` macros and stays agnostic of the
//! subscriber; output is JSON lines so cache-hit and degradation events can
//! be ingested directly.

use tracing_subscriber::EnvFilter;

/// Fallback directive when `RUST_LOG` is unset: engine internals at debug
/// (cache hits, degradations), everything else at info.
const DEFAULT_FILTER: &str = "info,ledgeriq_engine=debug";

/// Initialize process-wide tracing.
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    init_with(DEFAULT_FILTER);
}

/// Initialize with an explicit fallback filter. `RUST_LOG` still wins when
/// set; tests pin a quiet fallback so assertion output stays readable.
pub fn init_with(fallback: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
