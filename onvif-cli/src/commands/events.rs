use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use onvif_api::operations::events::{NotificationMessage, PullMessagesRequest};
use onvif_api::{OnvifClient, SubscriptionManager, SubscriptionMode, SubscriptionState};
use onvif_events::{AutoRenewer, RenewalConfig, RenewalEvent};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use crate::cli::SubscribeArgs;
use crate::config::{parse_ttl, ConfigError};
use crate::output::{field, or_dash, Printer};

#[derive(Serialize)]
struct StreamedEvent<'a> {
    kind: &'static str,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a NotificationMessage>,
}

const MIN_PULL_BACKOFF: Duration = Duration::from_secs(1);

/// Subscribe and keep renewing until Ctrl-C
pub async fn subscribe(client: OnvifClient, printer: &Printer, args: SubscribeArgs) -> Result<()> {
    let mode: SubscriptionMode = args.mode.parse().map_err(|e| ConfigError::Invalid {
        name: "--mode",
        reason: format!("{e}"),
    })?;
    let ttl = parse_ttl(&args.ttl)?;
    let renewal = RenewalConfig::default()
        .with_renew_ttl(ttl)
        .with_unsubscribe_on_exit(!args.keep)
        .with_shutdown_grace(client.config().timeout + Duration::from_secs(5));

    let manager = SubscriptionManager::new(client);
    let state = manager
        .subscribe(mode, args.push_url.as_deref(), ttl)
        .await?;
    print_state(printer, &state)?;

    let pull_state = state.clone();
    let mut renewer = AutoRenewer::start(manager.clone(), state, renewal)?;
    let mut events = renewer
        .take_events()
        .context("renewal events already taken")?;
    let request = PullMessagesRequest {
        timeout: Duration::from_secs(args.wait_secs),
        message_limit: args.limit,
    };

    stream_until(
        tokio::signal::ctrl_c(),
        printer,
        &manager,
        &pull_state,
        &request,
        &mut events,
    )
    .await?;
    printer.note("stopping");

    let state = renewer.shutdown().await?;
    while let Ok(event) = events.try_recv() {
        print_renewal(printer, &event)?;
    }
    if !state.is_cancelled() {
        printer.note(format!("subscription left to expire: {}", state.manager_url));
    }
    Ok(())
}

/// Print renewal events and pulled messages until `shutdown` resolves
///
/// A failed pull is retried after the pull wait time. The shutdown future
/// is polled throughout, including during that backoff.
async fn stream_until<F>(
    shutdown: F,
    printer: &Printer,
    manager: &SubscriptionManager,
    state: &SubscriptionState,
    request: &PullMessagesRequest,
    events: &mut mpsc::Receiver<RenewalEvent>,
) -> Result<()>
where
    F: Future,
{
    tokio::pin!(shutdown);
    let pulling = state.mode == SubscriptionMode::Pull;
    let backoff = request.timeout.max(MIN_PULL_BACKOFF);
    let mut retry_at: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(()),
            Some(event) = events.recv() => print_renewal(printer, &event)?,
            _ = sleep_until(retry_at.unwrap_or_else(Instant::now)), if retry_at.is_some() => {
                retry_at = None;
            }
            pulled = manager.pull_messages(state, request), if pulling && retry_at.is_none() => {
                match pulled {
                    Ok(response) => {
                        for message in &response.messages {
                            print_message(printer, message)?;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, retry_in = ?backoff, "pull failed");
                        retry_at = Some(Instant::now() + backoff);
                    }
                }
            }
        }
    }
}

/// Create a pull point, fetch once, unsubscribe
pub async fn pull_once(
    client: OnvifClient,
    printer: &Printer,
    ttl: &str,
    wait_secs: u64,
    limit: u32,
) -> Result<()> {
    let ttl = parse_ttl(ttl)?;
    let manager = SubscriptionManager::new(client);
    let mut state = manager.subscribe(SubscriptionMode::Pull, None, ttl).await?;

    let request = PullMessagesRequest {
        timeout: Duration::from_secs(wait_secs),
        message_limit: limit,
    };
    let pulled = manager.pull_messages(&state, &request).await;
    manager.unsubscribe(&mut state).await;

    let response = pulled?;
    if response.messages.is_empty() {
        printer.note("no messages");
    }
    for message in &response.messages {
        print_message(printer, message)?;
    }
    Ok(())
}

fn print_state(printer: &Printer, state: &SubscriptionState) -> Result<()> {
    printer.emit(state, || {
        vec![
            field("Mode:", state.mode),
            field("Manager:", &state.manager_url),
            field("Terminates:", or_dash(state.termination_time.map(|t| t.to_rfc3339()))),
            field("Granted TTL:", format!("{}s", state.server_ttl().as_secs())),
        ]
    })
}

fn print_renewal(printer: &Printer, event: &RenewalEvent) -> Result<()> {
    let kind = match event {
        RenewalEvent::Renewed { .. } => "renewed",
        RenewalEvent::RenewFailed { .. } => "renew_failed",
        RenewalEvent::Unsubscribed { .. } => "unsubscribed",
        RenewalEvent::Stopped => "stopped",
    };
    let streamed = StreamedEvent {
        kind,
        detail: event.to_string(),
        message: None,
    };
    printer.emit(&streamed, || vec![streamed.detail.clone()])
}

fn print_message(printer: &Printer, message: &NotificationMessage) -> Result<()> {
    let streamed = StreamedEvent {
        kind: "notification",
        detail: message.topic.clone().unwrap_or_default(),
        message: Some(message),
    };
    printer.emit(&streamed, || {
        let time = or_dash(message.utc_time.map(|t| t.to_rfc3339()));
        let mut lines = vec![format!("[{}] {}", time, or_dash(message.topic.as_ref()))];
        lines.extend(
            message
                .source
                .iter()
                .chain(message.data.iter())
                .map(|(k, v)| format!("    {k} = {v}")),
        );
        lines
    })
}
