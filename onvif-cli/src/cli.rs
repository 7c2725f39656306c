//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use onvif_api::Service;

/// ONVIF camera control
///
/// Talks to one device per invocation. The device address and credentials
/// can come from the environment so they stay out of shell history.
#[derive(Parser, Debug)]
#[command(name = "onvif-ctl")]
#[command(about = "Control ONVIF cameras: device info, media, PTZ and events")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Device address (`192.168.1.64`, `cam:8080` or `http://cam`)
    #[arg(long, env = "ONVIF_HOST", global = true)]
    pub host: Option<String>,

    /// Username for WS-Security digest authentication
    #[arg(short, long, env = "ONVIF_USER", global = true)]
    pub user: Option<String>,

    /// Password for WS-Security digest authentication
    #[arg(short, long, env = "ONVIF_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10", global = true)]
    pub timeout_secs: u64,

    /// Pause after wakeup steps and preset refreshes, in milliseconds
    #[arg(long, default_value = "1000", global = true)]
    pub settle_ms: u64,

    /// PTZ wakeup chain run before PTZ commands (none, short, full)
    #[arg(long, default_value = "none", global = true)]
    pub wakeup: String,

    /// Do not refresh presets and retry when GotoPreset reports an unknown token
    #[arg(long, global = true)]
    pub no_preset_recovery: bool,

    /// Verbose logs and raw responses
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print nothing; only the exit code reports the outcome
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Manufacturer, model and firmware
    Info,

    /// Discover and list service endpoints
    Endpoints,

    /// List media profiles
    Profiles,

    /// Stream URI for a media profile
    StreamUri {
        #[arg(long)]
        profile: String,

        /// Transport protocol
        #[arg(long, default_value = "RTSP")]
        protocol: String,
    },

    /// List PTZ presets of a profile
    Presets {
        #[arg(long)]
        profile: String,
    },

    /// Move to a preset
    Goto {
        #[arg(long)]
        profile: String,

        #[arg(long)]
        preset: String,
    },

    /// Start a continuous move
    Move {
        #[arg(long)]
        profile: String,

        /// Pan velocity, -1.0 to 1.0
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        pan: f32,

        /// Tilt velocity, -1.0 to 1.0
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        tilt: f32,

        /// Zoom velocity, -1.0 to 1.0
        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        zoom: f32,

        /// Let the device stop on its own after this many seconds
        #[arg(long)]
        duration_secs: Option<u64>,
    },

    /// Stop all PTZ movement
    Stop {
        #[arg(long)]
        profile: String,
    },

    /// Move to the home position
    Home {
        #[arg(long)]
        profile: String,
    },

    /// Current PTZ position and movement state
    Status {
        #[arg(long)]
        profile: String,
    },

    /// Subscribe to events and keep the subscription alive until Ctrl-C
    Subscribe(SubscribeArgs),

    /// Create a pull point, fetch pending messages once, then unsubscribe
    Pull {
        /// Requested lifetime (`300`, `45s`, `PT5M`)
        #[arg(long, default_value = "PT60S")]
        ttl: String,

        /// Seconds the device may hold the request waiting for messages
        #[arg(long, default_value = "5")]
        wait_secs: u64,

        /// Maximum number of messages
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Send an arbitrary request
    Raw(RawArgs),
}

#[derive(Args, Debug, Clone)]
pub struct SubscribeArgs {
    /// Delivery mode (push or pull)
    #[arg(long, default_value = "pull")]
    pub mode: String,

    /// Consumer URL the device posts notifications to (push mode)
    #[arg(long)]
    pub push_url: Option<String>,

    /// Requested lifetime (`300`, `45s`, `PT5M`)
    #[arg(long, default_value = "PT300S")]
    pub ttl: String,

    /// Leave the subscription to expire instead of unsubscribing on exit
    #[arg(long)]
    pub keep: bool,

    /// Seconds each PullMessages request may wait (pull mode)
    #[arg(long, default_value = "5")]
    pub wait_secs: u64,

    /// Maximum messages per PullMessages request (pull mode)
    #[arg(long, default_value = "10")]
    pub limit: u32,
}

#[derive(Args, Debug, Clone)]
pub struct RawArgs {
    /// Logical service the action belongs to
    #[arg(long, value_enum)]
    pub service: ServiceArg,

    /// Action name, e.g. `GetNodes`
    #[arg(long)]
    pub action: String,

    /// Inner payload wrapped in the action element
    #[arg(long, default_value = "", conflicts_with = "body")]
    pub payload: String,

    /// Complete SOAP body fragment, sent unchanged
    #[arg(long)]
    pub body: Option<String>,

    /// Absolute URL to post to, bypassing endpoint discovery
    #[arg(long)]
    pub url: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceArg {
    Device,
    Media,
    Media1,
    Media2,
    Ptz,
    Events,
}

impl From<ServiceArg> for Service {
    fn from(arg: ServiceArg) -> Self {
        match arg {
            ServiceArg::Device => Service::Device,
            ServiceArg::Media => Service::Media,
            ServiceArg::Media1 => Service::Media1,
            ServiceArg::Media2 => Service::Media2,
            ServiceArg::Ptz => Service::Ptz,
            ServiceArg::Events => Service::Events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_goto_with_globals_after_subcommand() {
        let cli = Cli::try_parse_from([
            "onvif-ctl", "goto", "--profile", "main", "--preset", "4", "--host", "cam", "--json",
        ])
        .unwrap();

        assert_eq!(cli.global.host.as_deref(), Some("cam"));
        assert!(cli.global.json);
        match cli.command {
            Command::Goto { profile, preset } => {
                assert_eq!(profile, "main");
                assert_eq!(preset, "4");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_negative_velocity() {
        let cli = Cli::try_parse_from(["onvif-ctl", "move", "--profile", "p", "--pan", "-0.5"]).unwrap();
        assert!(matches!(cli.command, Command::Move { pan, .. } if pan == -0.5));
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["onvif-ctl", "info", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_raw_service_values() {
        let cli = Cli::try_parse_from([
            "onvif-ctl", "raw", "--service", "ptz", "--action", "GetNodes",
        ])
        .unwrap();
        match cli.command {
            Command::Raw(args) => {
                assert_eq!(Service::from(args.service), Service::Ptz);
                assert!(args.body.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
