//! Utility modules

pub mod memory_matcher;
pub mod validation;

pub use memory_matcher::*;
pub use validation::*;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Default log directive when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "expense_reconcile=info";

/// Install a global fmt subscriber once; later calls are no-ops.
///
/// `RUST_LOG` takes precedence over `directive`.
pub fn init_tracing(directive: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(directive))
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        if fmt().with_env_filter(filter).try_init().is_ok() {
            tracing::info!("expense reconciliation tracing initialized");
        }
    });
}
