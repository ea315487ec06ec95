use crate::config::LoggingConfig;
use crate::error::{CertSplitError, Result};
use std::fs::{self, File};
use std::sync::Mutex;
use tracing::Dispatch;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// A tracing subscriber that is active only inside [`Logger::in_scope`].
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Build from the logging section and the `-v` count. `RUST_LOG` wins when set.
    pub fn new(config: &LoggingConfig, verbosity: u8) -> Result<Self> {
        let filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => {
                let level = effective_level(&config.level, verbosity);
                EnvFilter::try_new(level).map_err(|e| CertSplitError::Config {
                    message: format!("Invalid log level '{}': {}", config.level, e),
                })?
            }
        };

        let builder = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_level(true);

        let dispatch = match &config.file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent)?;
                    }
                }
                let file = File::create(path)?;
                Dispatch::new(
                    builder
                        .with_ansi(false)
                        .with_writer(Mutex::new(file))
                        .finish(),
                )
            }
            None => Dispatch::new(builder.with_writer(std::io::stderr).finish()),
        };

        Ok(Self { dispatch })
    }

    pub fn in_scope<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }
}

fn effective_level(configured: &str, verbosity: u8) -> &str {
    match verbosity {
        0 => configured,
        1 => "info",
        _ => "debug",
    }
}
