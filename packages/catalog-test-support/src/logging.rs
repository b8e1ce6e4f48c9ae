//! Tracing subscriber for test binaries.
//!
//! Unit and integration tests call [`init`] from a `ctor` hook so catalog
//! events (request ids, compensation warnings) show up in captured output.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INSTALLED: OnceCell<()> = OnceCell::new();

/// Filter precedence: `TEST_LOG`, then `RUST_LOG`, then this.
const FALLBACK_FILTER: &str = "warn,catalog=info";

fn test_filter() -> EnvFilter {
    ["TEST_LOG", "RUST_LOG"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .map(EnvFilter::new)
        .unwrap_or_else(|| EnvFilter::new(FALLBACK_FILTER))
}

/// Install the subscriber once per process. Safe to call repeatedly.
pub fn init() {
    INSTALLED.get_or_init(|| {
        // Another harness may already own the global subscriber.
        let _ = fmt()
            .with_env_filter(test_filter())
            .with_test_writer()
            .without_time()
            .with_target(false)
            .try_init();
    });
}
