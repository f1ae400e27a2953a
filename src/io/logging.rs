use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::model::config::LogConfig;

/// Log file inside the project directory
pub const LOG_FILE: &str = "todoliez.log";

/// Filter from `RUST_LOG`, falling back to the configured level.
/// A level that does not parse falls back to `info`.
pub fn env_filter(config: &LogConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber, writing to `dir/todoliez.log`.
///
/// Output never goes to the terminal so the TUI's alternate screen stays
/// clean. Keep the returned guard alive until exit; dropping it flushes.
/// Returns `None` if a subscriber was already installed.
pub fn init_logging(dir: &Path, config: &LogConfig) -> Option<WorkerGuard> {
    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .ok()?;
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_is_used() {
        // RUST_LOG may be set by the harness; only check the fallback path
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = env_filter(&LogConfig {
            level: "debug".into(),
        });
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn bad_level_falls_back_to_info() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = env_filter(&LogConfig {
            level: "todoliez=loud".into(),
        });
        assert_eq!(filter.to_string(), "info");
    }
}
