use aisview::vessel::TableError;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Options(#[from] getopts::Fail),

    #[error("cannot open {}: {source}", path.display())]
    File { path: PathBuf, source: io::Error },

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid value for --{flag}: {value}")]
    InvalidValue { flag: &'static str, value: String },

    #[error("cannot set up logging: {0}")]
    Logging(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot connect to gpsd at {url}: {source}")]
    Connect { url: String, source: io::Error },

    #[error("cannot send command to gpsd: {0}")]
    Command(String),

    #[error("lost connection to gpsd: {0}")]
    Disconnected(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    #[error("vessel view out of sync: {0}")]
    Desync(#[from] TableError),
}
