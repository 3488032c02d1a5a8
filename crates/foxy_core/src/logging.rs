use anyhow::Result;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::FoxyConfig;

/// Builds the filter: `RUST_LOG` wins, otherwise `level` for everything and
/// debug for the staking crates when `level` is a bare level name.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if level.contains('=') {
            EnvFilter::new(level)
        } else {
            EnvFilter::new(format!("{level},foxy_core={level},foxy_staking={level}"))
        }
    })
}

/// Initializes file + console logging under `~/.foxy/logs` at the configured
/// level. Returns a guard that must be kept alive for the duration of the app.
pub fn init_logging(config: &FoxyConfig) -> Result<WorkerGuard> {
    let logs_dir = FoxyConfig::logs_dir()?;
    std::fs::create_dir_all(&logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(&logs_dir, "foxy");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(&config.log_level))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .with(fmt::layer().with_target(false).compact())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

/// Initialize file-only logging to a custom directory with a custom filter.
/// Useful for tests or embedding hosts that own the console.
pub fn init_logging_to_dir(logs_dir: &std::path::Path, filter: &str) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "foxy");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(env_filter(filter))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_to_dir_creates_directory() {
        let tmp = tempfile::tempdir().expect("Failed to create tempdir");
        let logs_dir = tmp.path().join("nested").join("logs");
        assert!(!logs_dir.exists());

        // The global subscriber can only be set once per process, so the
        // result may be an error; the directory must exist either way.
        let result = init_logging_to_dir(&logs_dir, "warn");
        assert!(logs_dir.exists());

        if let Err(e) = result {
            assert!(e.to_string().contains("logging"), "unexpected error: {e}");
        }
    }

    #[test]
    fn env_filter_accepts_levels_and_directives() {
        for f in ["info", "debug", "warn", "trace", "foxy_staking=debug,warn"] {
            drop(env_filter(f));
        }
    }
}
