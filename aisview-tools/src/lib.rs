pub mod config;
pub mod error;
pub mod listview;
pub mod logging;
pub mod tui;
pub mod vesselview;

pub use config::ViewerConfig;
pub use error::{ConfigError, ViewerError};

use getopts::Options;

/// Options shared by every tool talking to gpsd.
pub fn gpsd_opts() -> Options {
    let mut opts = Options::new();
    opts.optopt("", "host", "host running gpsd (default localhost)", "host");
    opts.optopt(
        "",
        "port",
        &format!(
            "port gpsd is listening on (default {})",
            aisview::gpsd::GPSD_DEFAULT_PORT
        ),
        "port",
    );
    opts.optflag(
        "",
        "scaled",
        "show values scaled to readable units instead of raw numbers",
    );
    opts.optopt(
        "",
        "interval",
        "screen refresh interval in seconds (default 2)",
        "sec",
    );
    opts.optopt("", "config", "YAML configuration file", "file");
    opts.optopt("", "log", "write logs to this file", "file");
    opts.optopt(
        "",
        "log-level",
        "log level or filter directive (default info)",
        "level",
    );
    opts
}

/// Parses `args` (without the program name) into matches and the effective
/// configuration: defaults, then the `--config` file, then flags.
pub fn gpsd_parseopts(
    opts: &Options,
    args: &[String],
) -> Result<(getopts::Matches, ViewerConfig), ConfigError> {
    let matches = opts.parse(args)?;
    let mut config = match matches.opt_str("config") {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    if let Some(host) = matches.opt_str("host") {
        config.host = host;
    }
    if let Some(port) = matches.opt_str("port") {
        config.port = parse_value("port", &port)?;
    }
    if matches.opt_present("scaled") {
        config.scaled = true;
    }
    if let Some(interval) = matches.opt_str("interval") {
        config.interval = parse_value("interval", &interval)?;
    }
    if let Some(path) = matches.opt_str("log") {
        config.log_file = Some(path.into());
    }
    if let Some(level) = matches.opt_str("log-level") {
        config.log_level = level;
    }
    Ok((matches, config))
}

/// Parses the value of `flag`, reporting which flag was wrong on failure.
pub fn parse_value<T: std::str::FromStr>(flag: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        flag,
        value: value.to_string(),
    })
}
