#![forbid(unsafe_code)]

//! Subscriber setup for hosts that want engine logs.
//!
//! The filter is read from `TRAINBOARD_LOG` (same syntax as `RUST_LOG`),
//! defaulting to `info`. Output is human-readable text, or JSON lines with the
//! `tracing-json` feature.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "TRAINBOARD_LOG";

/// Default directive when `TRAINBOARD_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// Build the filter from the environment.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init() -> Result<(), TryInitError> {
    init_with_filter(env_filter())
}

/// Install the global subscriber with an explicit filter.
pub fn init_with_filter(filter: EnvFilter) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(filter);

    #[cfg(feature = "tracing-json")]
    let registry = registry.with(tracing_subscriber::fmt::layer().json());
    #[cfg(not(feature = "tracing-json"))]
    let registry = registry.with(tracing_subscriber::fmt::layer().with_target(true));

    registry.try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_fails() {
        // The first call may race with other tests in this binary; only the
        // second one is guaranteed to fail.
        let _ = init_with_filter(EnvFilter::new("debug"));
        assert!(init_with_filter(EnvFilter::new("debug")).is_err());
    }
}
