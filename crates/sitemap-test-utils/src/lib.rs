//! Test doubles for the sitemap workspace
//!
//! Extracted into its own crate so the unit tests in `sitemap-core` and
//! the integration suite drive the same in-memory platform.

pub mod platform;

pub use platform::{CallCounts, MemoryPlatform};

/// Route engine tracing to the test harness.
///
/// Safe to call from every test; only the first call installs a
/// subscriber. Enable output with `RUST_LOG=sitemap_core=debug`.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
