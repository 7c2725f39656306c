//! Background renewal of one event subscription.
//!
//! The loop owns the [`SubscriptionState`] while it runs:
//! - sleeps until the next renewal is due, or until shutdown is requested
//! - renews against the subscription manager URL and reschedules from the
//!   granted lifetime, or backs off after a failure
//! - optionally unsubscribes on the way out
//!
//! Only one renew is ever in flight; the next sleep starts after the current
//! exchange settles.

use std::time::Duration;

use onvif_api::{SubscriptionManager, SubscriptionState};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};

use crate::config::RenewalConfig;
use crate::error::{RenewalError, Result};
use crate::event::RenewalEvent;
use crate::schedule;

/// Handle to a running auto-renew loop.
///
/// Dropping the handle without calling [`shutdown`](Self::shutdown) aborts
/// the loop without unsubscribing.
pub struct AutoRenewer {
    /// Handle to the background renewal task
    task: Option<JoinHandle<SubscriptionState>>,
    /// Channel for signaling shutdown
    shutdown_tx: Option<mpsc::Sender<()>>,
    events: Option<mpsc::Receiver<RenewalEvent>>,
    shutdown_grace: Duration,
}

impl AutoRenewer {
    /// Start renewing `state` in a background task.
    ///
    /// The first renewal is scheduled from the lifetime the device granted
    /// when the subscription was created.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the subscription
    /// is already cancelled.
    pub fn start(
        manager: SubscriptionManager,
        state: SubscriptionState,
        config: RenewalConfig,
    ) -> Result<Self> {
        config.validate()?;
        if state.is_cancelled() {
            return Err(RenewalError::Cancelled(state.manager_url));
        }

        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let (event_tx, event_rx) = mpsc::channel(config.event_buffer);
        let shutdown_grace = config.shutdown_grace;

        let task = tokio::spawn(Self::renewal_task(
            manager,
            state,
            config,
            event_tx,
            shutdown_rx,
        ));

        Ok(Self {
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            events: Some(event_rx),
            shutdown_grace,
        })
    }

    /// Take the lifecycle event receiver; `None` after the first call
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<RenewalEvent>> {
        self.events.take()
    }

    /// Stop the loop and hand the subscription back.
    ///
    /// Cancels any pending renewal timer, runs the final unsubscribe if
    /// configured and waits up to the configured grace period. A task that
    /// overruns the grace period is aborted.
    ///
    /// # Errors
    ///
    /// Returns an error if the task overran the grace period or panicked.
    pub async fn shutdown(mut self) -> Result<SubscriptionState> {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(()).await;
        }

        let Some(mut task) = self.task.take() else {
            return Err(RenewalError::Shutdown("renewal task already stopped".to_string()));
        };

        match timeout(self.shutdown_grace, &mut task).await {
            Ok(Ok(state)) => Ok(state),
            Ok(Err(e)) => Err(RenewalError::Shutdown(format!("renewal task failed: {e}"))),
            Err(_) => {
                task.abort();
                Err(RenewalError::Shutdown(format!(
                    "renewal task did not stop within {}s",
                    self.shutdown_grace.as_secs()
                )))
            }
        }
    }

    async fn renewal_task(
        manager: SubscriptionManager,
        mut state: SubscriptionState,
        config: RenewalConfig,
        events: mpsc::Sender<RenewalEvent>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) -> SubscriptionState {
        let mut delay = schedule::after_success(state.server_ttl());
        tracing::info!(
            manager = %state.manager_url,
            next_in = delay.as_secs(),
            "auto-renew started"
        );

        loop {
            tokio::select! {
                _ = sleep(delay) => {}
                _ = shutdown_rx.recv() => break,
            }

            match manager.renew(&mut state, config.renew_ttl).await {
                Ok(()) => {
                    delay = schedule::after_success(state.server_ttl());
                    tracing::info!(
                        termination = ?state.termination_time,
                        next_in = delay.as_secs(),
                        "subscription renewed"
                    );
                    emit(
                        &events,
                        RenewalEvent::Renewed {
                            termination: state.termination_time,
                            next_in: delay,
                        },
                    );
                }
                Err(e) => {
                    delay = schedule::after_failure(delay);
                    tracing::warn!(error = %e, next_in = delay.as_secs(), "renew failed");
                    emit(
                        &events,
                        RenewalEvent::RenewFailed {
                            error: e.to_string(),
                            next_in: delay,
                        },
                    );
                }
            }
        }

        if config.unsubscribe_on_exit {
            let acknowledged = manager.unsubscribe(&mut state).await;
            emit(&events, RenewalEvent::Unsubscribed { acknowledged });
        }

        tracing::info!(manager = %state.manager_url, "auto-renew stopped");
        emit(&events, RenewalEvent::Stopped);
        state
    }
}

impl Drop for AutoRenewer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

fn emit(events: &mpsc::Sender<RenewalEvent>, event: RenewalEvent) {
    if let Err(e) = events.try_send(event) {
        tracing::debug!(error = %e, "renewal event dropped");
    }
}
