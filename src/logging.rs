//! Tracing subscriber setup
//!
//! Logs always go to stderr. When `logging.file` is set, a second layer
//! writes plain-text lines to a rolling file through a non-blocking writer.

use std::path::Path;

use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogRotation, LoggingConfig};
use crate::error::{self, Result};

/// Filter for one layer: `--verbose` forces debug, otherwise `RUST_LOG`
/// directives apply on top of the configured level
fn env_filter(level: LevelFilter, verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn appender(path: &Path, rotation: LogRotation) -> Result<RollingFileAppender> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = path
        .file_name()
        .ok_or_else(|| error::config::invalid(format!("logging.file '{}' has no file name", path.display())))?;

    std::fs::create_dir_all(dir).map_err(|e| error::fs::write_failed(dir, e))?;

    Ok(match rotation {
        LogRotation::Never => rolling::never(dir, prefix),
        LogRotation::Hourly => rolling::hourly(dir, prefix),
        LogRotation::Daily => rolling::daily(dir, prefix),
    })
}

fn file_writer(config: &LoggingConfig) -> Result<Option<(NonBlocking, WorkerGuard)>> {
    config
        .file
        .as_deref()
        .map(|path| appender(path, config.rotation).map(tracing_appender::non_blocking))
        .transpose()
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop and must be held
/// until the process exits.
pub fn init(config: &LoggingConfig, verbose: bool) -> Result<Option<WorkerGuard>> {
    let level = config.level_filter()?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(level, verbose));

    let (file_layer, guard) = match file_writer(config)? {
        Some((writer, guard)) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(env_filter(level, verbose)),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(error::config::logging_failed)?;

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_verbose_forces_debug() {
        assert_eq!(env_filter(LevelFilter::WARN, true).to_string(), "debug");
    }

    #[test]
    fn test_file_writer_absent_without_file() {
        assert!(file_writer(&LoggingConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_file_writer_creates_log_directory() {
        let temp = TempDir::new().unwrap();
        let config = LoggingConfig {
            file: Some(temp.path().join("logs/dumpmirror.log")),
            rotation: LogRotation::Never,
            ..LoggingConfig::default()
        };

        let writer = file_writer(&config).unwrap();

        assert!(writer.is_some());
        assert!(temp.path().join("logs").is_dir());
    }
}
