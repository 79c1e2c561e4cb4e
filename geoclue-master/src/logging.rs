//! Logging setup for the geoclue master
//!
//! The library only emits `tracing` events. A daemon embedding the broker
//! picks one of these modes once at startup to decide where they go.

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the logging mode
pub const LOG_MODE_ENV: &str = "GEOCLUE_LOG_MODE";

/// Environment variable overriding the log filter
pub const LOG_LEVEL_ENV: &str = "GEOCLUE_LOG_LEVEL";

/// Where and how verbosely to log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoggingMode {
    /// No subscriber is installed
    #[default]
    Silent,
    /// Compact stderr output at `info`
    Development,
    /// Verbose output with thread ids and source locations at `debug`
    Debug,
}

impl LoggingMode {
    /// Filter used when neither environment variable is set
    ///
    /// `None` means no subscriber is installed.
    pub fn default_level(self) -> Option<&'static str> {
        match self {
            LoggingMode::Silent => None,
            LoggingMode::Development => Some("info"),
            LoggingMode::Debug => Some("debug"),
        }
    }
}

impl FromStr for LoggingMode {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "silent" | "" => Ok(LoggingMode::Silent),
            "development" | "dev" => Ok(LoggingMode::Development),
            "debug" => Ok(LoggingMode::Debug),
            other => Err(LoggingError::InvalidEnv(format!("{LOG_MODE_ENV}={other}"))),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    #[error("Invalid environment variable: {0}")]
    InvalidEnv(String),
}

/// Install a global subscriber for `mode`
///
/// # Environment Variables
///
/// - `GEOCLUE_LOG_LEVEL`: filter directives, e.g. `geoclue_master=debug`
/// - `RUST_LOG`: used when `GEOCLUE_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    let Some(default_level) = mode.default_level() else {
        return Ok(());
    };
    let filter = create_env_filter(default_level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match mode {
        LoggingMode::Debug => builder
            .pretty()
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .try_init(),
        _ => builder.compact().with_target(false).try_init(),
    };
    installed.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Initialize logging from `GEOCLUE_LOG_MODE`
///
/// An unset variable means silent. An unrecognised value is an error rather
/// than a silent fallback, so a typo in a unit file shows up at startup.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = match std::env::var(LOG_MODE_ENV) {
        Ok(value) => value.parse()?,
        Err(std::env::VarError::NotPresent) => LoggingMode::Silent,
        Err(e) => return Err(LoggingError::InvalidEnv(format!("{LOG_MODE_ENV}: {e}"))),
    };

    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> Result<EnvFilter, LoggingError> {
    let directives = std::env::var(LOG_LEVEL_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_level.to_string());

    EnvFilter::try_new(&directives)
        .map_err(|e| LoggingError::InvalidEnv(format!("{directives}: {e}")))
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[rstest]
    #[case("silent", LoggingMode::Silent)]
    #[case("", LoggingMode::Silent)]
    #[case("Development", LoggingMode::Development)]
    #[case("dev", LoggingMode::Development)]
    #[case(" debug ", LoggingMode::Debug)]
    fn test_parse_mode(#[case] value: &str, #[case] expected: LoggingMode) {
        assert_eq!(value.parse::<LoggingMode>().unwrap(), expected);
    }

    #[rstest]
    #[case(LoggingMode::Silent, None)]
    #[case(LoggingMode::Development, Some("info"))]
    #[case(LoggingMode::Debug, Some("debug"))]
    fn test_default_level(#[case] mode: LoggingMode, #[case] expected: Option<&str>) {
        assert_eq!(mode.default_level(), expected);
    }

    #[test]
    fn test_parse_unknown_mode() {
        let result = "chatty".parse::<LoggingMode>();
        assert!(matches!(result, Err(LoggingError::InvalidEnv(ref v)) if v.contains("chatty")));
    }
}
