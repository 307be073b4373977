//! Tracing setup for test binaries.
//!
//! Substitutes log intercepted calls and programmed stubs at `debug` level
//! under the `mimic_core` target. Nothing is printed unless a subscriber is
//! installed, e.g. with [`init_test_tracing`].

use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_DIRECTIVES: &str = "mimic_core=debug";

/// Install a test-writer subscriber. `RUST_LOG` takes precedence over the
/// default `mimic_core=debug`; repeated calls are no-ops.
pub fn init_test_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer()
        .try_init();
}
