//! Diagnostics setup.
//!
//! The library only emits `tracing` events. Hosts that have no subscriber of
//! their own can call [`init`] to print them to stderr.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the filter directives, e.g. `pointbridge=debug`.
pub const LOG_ENV: &str = "POINTBRIDGE_LOG";

/// Install a global `fmt` subscriber filtered by `POINTBRIDGE_LOG` (default
/// `warn`). Returns `false` when a global subscriber is already set.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_once() {
        init();
        // A second global subscriber is always refused.
        assert!(!init());
    }
}
