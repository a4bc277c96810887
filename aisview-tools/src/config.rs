//! Viewer configuration
//!
//! Every setting has a default; a YAML file may override any subset of
//! them, and command line flags override the file.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Host running gpsd.
    pub host: String,
    pub port: u16,
    /// Ask gpsd for human-scaled values instead of raw units.
    pub scaled: bool,
    /// Seconds between unconditional redraws.
    pub interval: u64,
    /// Logs are only written when this is set; the terminal belongs to the UI.
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        ViewerConfig {
            host: "localhost".to_string(),
            port: aisview::gpsd::GPSD_DEFAULT_PORT,
            scaled: false,
            interval: aisview::view::DEFAULT_REFRESH_INTERVAL.as_secs(),
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ViewerConfig, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::File {
            path: path.to_path_buf(),
            source,
        })?;
        ViewerConfig::from_yaml(&text)
    }

    pub fn from_yaml(text: &str) -> Result<ViewerConfig, ConfigError> {
        // An empty document means "all defaults".
        if text.trim().is_empty() {
            return Ok(ViewerConfig::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn daemon_url(&self) -> String {
        aisview::gpsd::daemon_url(&self.host, self.port)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ViewerConfig::from_yaml("scaled: true\nlog_file: /tmp/ais.log\n").unwrap();
        assert!(config.scaled);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/ais.log")));
        assert_eq!(config.host, "localhost");
        assert_eq!(config.refresh_interval(), Duration::from_secs(2));
        assert_eq!(ViewerConfig::from_yaml("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            ViewerConfig::from_yaml("hostname: x\n"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            ViewerConfig::from_yaml("port: 99999\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn missing_file() {
        assert!(matches!(
            ViewerConfig::load("/nonexistent/aisview.yaml"),
            Err(ConfigError::File { .. })
        ));
    }

    #[test]
    fn url() {
        let config = ViewerConfig {
            host: "::1".into(),
            ..Default::default()
        };
        assert_eq!(config.daemon_url(), "tcp://[::1]:2947");
    }
}
