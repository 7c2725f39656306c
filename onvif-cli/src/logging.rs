//! Logging setup for the command-line client
//!
//! Logs go to stderr so command output on stdout stays machine readable.

use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Logging mode selected from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No output (`--quiet`)
    Silent,
    /// Compact warnings and progress on stderr
    Development,
    /// Verbose diagnostics with source locations (`--verbose`)
    Debug,
}

impl LoggingMode {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            LoggingMode::Silent
        } else if verbose {
            LoggingMode::Debug
        } else {
            LoggingMode::Development
        }
    }
}

/// Logging configuration error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Initialize logging with the specified mode
///
/// # Environment Variables
///
/// - `ONVIF_LOG_LEVEL`: Override the filter (e.g. `debug`, `onvif_api=trace`)
/// - `RUST_LOG`: Used when `ONVIF_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    match mode {
        LoggingMode::Silent => Ok(()),
        LoggingMode::Development => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(false)
                        .without_time()
                        .compact(),
                )
                .with(create_env_filter("warn"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
        LoggingMode::Debug => {
            let subscriber = Registry::default()
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_file(true)
                        .with_line_number(true),
                )
                .with(create_env_filter("debug"));

            subscriber
                .try_init()
                .map_err(|e| LoggingError::TracingInit(e.to_string()))
        }
    }
}

/// Filter from `ONVIF_LOG_LEVEL`, then `RUST_LOG`, then the mode default
fn create_env_filter(default_level: &str) -> EnvFilter {
    filter_directive(
        std::env::var("ONVIF_LOG_LEVEL").ok(),
        std::env::var("RUST_LOG").ok(),
        default_level,
    )
    .parse()
    .unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn filter_directive(onvif: Option<String>, rust_log: Option<String>, default_level: &str) -> String {
    onvif
        .filter(|v| !v.trim().is_empty())
        .or(rust_log.filter(|v| !v.trim().is_empty()))
        .unwrap_or_else(|| default_level.to_string())
}
