//! Configuration derived from command-line arguments and environment variables

use std::time::Duration;

use onvif_api::{ClientConfig, Credentials, Ttl, WakeupMode};

use crate::cli::GlobalArgs;
use crate::logging::LoggingMode;

/// Configuration problems found before any network activity
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no device address given (use --host or ONVIF_HOST)")]
    MissingHost,

    #[error("--user and --password must be given together")]
    PartialCredentials,

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// How results are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Quiet,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub credentials: Option<Credentials>,
    pub client: ClientConfig,
    pub output: OutputMode,
    pub logging: LoggingMode,
    /// Surface raw responses
    pub verbose: bool,
}

impl Config {
    pub fn from_args(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let host = args
            .host
            .as_deref()
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHost)?
            .to_string();

        let credentials = match (&args.user, &args.password) {
            (Some(user), Some(password)) => Some(Credentials::new(user.as_str(), password.as_str())),
            (None, None) => None,
            _ => return Err(ConfigError::PartialCredentials),
        };

        let wakeup: WakeupMode = args.wakeup.parse().map_err(|e| ConfigError::Invalid {
            name: "--wakeup",
            reason: format!("{e}"),
        })?;

        let client = ClientConfig::new()
            .with_timeout(Duration::from_secs(args.timeout_secs))
            .with_settle_delay(Duration::from_millis(args.settle_ms))
            .with_wakeup(wakeup)
            .with_preset_recovery(!args.no_preset_recovery);
        client.validate().map_err(|e| ConfigError::Invalid {
            name: "client settings",
            reason: e.to_string(),
        })?;

        let output = if args.quiet {
            OutputMode::Quiet
        } else if args.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Ok(Self {
            host,
            credentials,
            client,
            output,
            logging: LoggingMode::from_flags(args.verbose, args.quiet),
            verbose: args.verbose && !args.quiet,
        })
    }
}

/// Parse a TTL argument
pub fn parse_ttl(text: &str) -> Result<Ttl, ConfigError> {
    text.parse().map_err(|e: onvif_api::ApiError| ConfigError::Invalid {
        name: "--ttl",
        reason: e.to_string(),
    })
}
