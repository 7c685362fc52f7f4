//! Process-wide logging setup shared by the service binaries.

/// Initialize JSON logging filtered by `RUST_LOG` (default `info`).
///
/// Safe to call multiple times; subsequent calls are no-ops.
pub fn init() {
    tracing::init(DEFAULT_FILTER);
}

/// Initialize logging for tests: human-readable output captured by the test harness.
pub fn init_for_tests() {
    tracing::init_test(DEFAULT_FILTER);
}

const DEFAULT_FILTER: &str = "info,sqlx=warn";

/// Subscriber construction.
pub mod tracing;
