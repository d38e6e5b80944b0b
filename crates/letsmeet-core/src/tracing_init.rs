//! Tracing/logging initialization for the `letsmeet` binary.
//!
//! Sets up `tracing_subscriber` with an env-filter and optional JSON output.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Build the default filter directive for a log level, scoped to our crates.
pub fn default_filter(level: &str) -> String {
    format!("letsmeet_server={level},letsmeet_core={level},letsmeet={level}")
}

/// Initialise the global tracing subscriber. Logs go to stderr so stdout
/// stays free for command output.
///
/// * `default_filter` -- directive used when `RUST_LOG` is not set.
/// * `log_json` -- when `true`, emit structured JSON log lines instead of the
///   human-readable format.
pub fn init_tracing(default_filter: &str, log_json: bool) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| Error::Config(format!("Invalid log filter {default_filter:?}: {e}")))?;

    let fmt = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);
    let registry = tracing_subscriber::registry().with(env_filter);
    let result = if log_json {
        registry.with(fmt.json()).try_init()
    } else {
        registry.with(fmt).try_init()
    };

    result.map_err(|e| Error::Config(format!("Tracing already initialised: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_all_crates() {
        let filter = default_filter("debug");
        assert!(filter.contains("letsmeet_server=debug"));
        assert!(filter.contains("letsmeet_core=debug"));
        assert!(EnvFilter::try_new(&filter).is_ok());
    }
}
