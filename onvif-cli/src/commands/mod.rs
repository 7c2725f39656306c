//! Command handlers
//!
//! Each handler runs one command against a prepared client and prints the
//! result. Handlers hold no recovery logic of their own.

mod device;
mod events;
mod media;
mod ptz;
mod raw;

use anyhow::Result;
use onvif_api::OnvifClient;

use crate::cli::Command;
use crate::config::Config;
use crate::output::Printer;

pub async fn run(command: Command, client: OnvifClient, config: &Config) -> Result<()> {
    let printer = Printer::new(config.output);

    match command {
        Command::Info => device::info(&client, &printer).await,
        Command::Endpoints => device::endpoints(&client, &printer).await,
        Command::Profiles => media::profiles(&client, &printer).await,
        Command::StreamUri { profile, protocol } => {
            media::stream_uri(&client, &printer, profile, protocol).await
        }
        Command::Presets { profile } => ptz::presets(&client, &printer, profile).await,
        Command::Goto { profile, preset } => ptz::goto(&client, &printer, profile, preset).await,
        Command::Move {
            profile,
            pan,
            tilt,
            zoom,
            duration_secs,
        } => ptz::continuous_move(&client, &printer, profile, (pan, tilt, zoom), duration_secs).await,
        Command::Stop { profile } => ptz::stop(&client, &printer, profile).await,
        Command::Home { profile } => ptz::home(&client, &printer, profile).await,
        Command::Status { profile } => ptz::status(&client, &printer, profile).await,
        Command::Subscribe(args) => events::subscribe(client, &printer, args).await,
        Command::Pull {
            ttl,
            wait_secs,
            limit,
        } => events::pull_once(client, &printer, &ttl, wait_secs, limit).await,
        Command::Raw(args) => raw::send(&client, &printer, args, config.verbose).await,
    }
}
