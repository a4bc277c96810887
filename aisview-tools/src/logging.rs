//! Log output for the tools.
//!
//! The viewer owns the terminal, so nothing is logged unless a log file is
//! configured. The `AISVIEW_LOG` environment variable takes precedence over
//! the configured level and accepts full filter directives.

use crate::config::ViewerConfig;
use crate::error::ConfigError;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "AISVIEW_LOG";

/// Installs the global subscriber. Returns `Ok(false)` when logging is off.
pub fn init(config: &ViewerConfig) -> Result<bool, ConfigError> {
    let path = match &config.log_file {
        Some(path) => path,
        None => return Ok(false),
    };
    let filter = filter(config)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| ConfigError::File {
            path: path.clone(),
            source,
        })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;
    Ok(true)
}

fn filter(config: &ViewerConfig) -> Result<EnvFilter, ConfigError> {
    match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.log_level).map_err(|_| ConfigError::InvalidValue {
            flag: "log-level",
            value: config.log_level.clone(),
        }),
    }
}
