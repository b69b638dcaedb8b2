// Logging: one small capability trait that every component receives at
// construction, plus the tracing-based implementation and the subscriber
// setup that writes to the log file.

use anyhow::{Context, Result};
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Logging capability shared by the client, the store and the poller.
pub trait Logger: Send + Sync {
    fn info(&self, msg: &str);

    /// Formatted variant of `info`, used through `format_args!`.
    fn infof(&self, args: fmt::Arguments<'_>);

    fn error(&self, msg: &str);

    /// Non-fatal problems that do not change a result already computed.
    fn warn(&self, msg: &str) {
        self.error(msg);
    }
}

/// `Logger` backed by the global `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, msg: &str) {
        tracing::info!("{}", msg);
    }

    fn infof(&self, args: fmt::Arguments<'_>) {
        tracing::info!("{}", args);
    }

    fn error(&self, msg: &str) {
        tracing::error!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        tracing::warn!("{}", msg);
    }
}

/// Install the global subscriber, appending to `log_path`.
///
/// `RUST_LOG` wins over the configured level when it is set. Failing to
/// open the log file is fatal for the process.
pub fn init(settings: &LoggingSettings, log_path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Could not create log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .context("Invalid logging level in settings")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(settings.color)
        .with_target(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::MemoryLogger;
    use super::*;

    #[test]
    fn infof_formats_arguments() {
        let logger = MemoryLogger::default();
        logger.infof(format_args!("Making a {} request to url: {}", "GET", "/game/status"));
        assert_eq!(
            logger.lines(),
            vec!["INFO Making a GET request to url: /game/status".to_string()]
        );
    }

    #[test]
    fn warn_defaults_to_error() {
        struct ErrorsOnly(Mutex<Vec<String>>);
        impl Logger for ErrorsOnly {
            fn info(&self, _msg: &str) {}
            fn infof(&self, _args: fmt::Arguments<'_>) {}
            fn error(&self, msg: &str) {
                self.0.lock().unwrap().push(msg.to_string());
            }
        }

        let logger = ErrorsOnly(Mutex::new(Vec::new()));
        logger.warn("close failed");
        assert_eq!(*logger.0.lock().unwrap(), vec!["close failed".to_string()]);
    }

    #[test]
    fn init_fails_when_log_directory_is_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("latest.log");
        let settings = LoggingSettings::default();
        assert!(init(&settings, &path).is_err());
    }
}
