//! Tracing subscriber setup
//!
//! Installs a global `tracing-subscriber` fmt subscriber. `RUST_LOG` takes
//! precedence over the default filter passed in. Installation happens at
//! most once per process; later calls are no-ops.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Output format for log lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the global subscriber with human-readable output
///
/// Returns `true` if this call installed it.
pub fn init_tracing(default_filter: &str) -> bool {
    init_tracing_with_format(default_filter, LogFormat::Pretty)
}

/// Install the global subscriber with the given format
///
/// Returns `true` if this call installed it. Returns `false` when a
/// subscriber was already set, by this module or by someone else.
pub fn init_tracing_with_format(default_filter: &str, format: LogFormat) -> bool {
    let mut installed_now = false;

    INSTALLED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter));
        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

        let result = match format {
            LogFormat::Pretty => builder.try_init(),
            LogFormat::Json => builder.json().try_init(),
        };
        installed_now = result.is_ok();
        installed_now
    });

    if installed_now {
        tracing::debug!(?format, "Tracing subscriber installed");
    }
    installed_now
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_is_a_noop() {
        let _first = init_tracing("storedesk_infra=debug");
        assert!(!init_tracing("storedesk_infra=debug"));
        assert!(!init_tracing_with_format("info", LogFormat::Json));
    }
}
