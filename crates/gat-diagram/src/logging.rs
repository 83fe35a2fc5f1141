//! Logging bootstrap.
//!
//! Console output filtered by `RUST_LOG` (or the configured level), plus an
//! hourly rolling JSON file when a log directory is given.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{fmt, prelude::*, registry::Registry, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

const LOG_FILE_PREFIX: &str = "gat-diagram.log";

/// Install the global subscriber. Fails if one is already installed.
///
/// # Example
/// ```ignore
/// init_logging(Some(Path::new("./logs")), "info")?;
/// ```
pub fn init_logging(log_dir: Option<&Path>, default_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| Error::Config(format!("invalid log level '{default_level}': {e}")))?;

    let console_layer = fmt::layer().with_writer(std::io::stdout);

    let file_layer = log_dir.map(|dir| {
        fmt::layer()
            .json()
            .with_writer(rolling::hourly(dir, LOG_FILE_PREFIX))
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
    });

    Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Config(format!("logging already initialized: {e}")))
}

pub fn init_from_config(config: &LoggingConfig) -> Result<()> {
    init_logging(config.log_dir.as_deref(), &config.level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        // The global subscriber can only be installed once per process.
        let _ = init_logging(None, "debug");
        assert!(matches!(init_logging(None, "debug"), Err(Error::Config(_))));
    }
}
