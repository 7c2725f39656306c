//! Event subscription lifecycle
//!
//! [`SubscriptionManager`] creates, renews and cancels one WS-BaseNotification
//! subscription. The state it hands back tracks the manager URL and the
//! device-reported instants; scheduling renewals is left to the caller (see
//! the `onvif-events` crate).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::client::OnvifClient;
use crate::error::{ApiError, Result};
use crate::operations::events::{
    CreatePullPointSubscriptionOperation, CreatePullPointSubscriptionRequest,
    PullMessagesOperation, PullMessagesRequest, PullMessagesResponse, RenewOperation,
    RenewRequest, SubscribeOperation, SubscribeRequest, SubscriptionFields,
    UnsubscribeOperation,
};
use crate::service::Service;

/// Delivery mode of a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubscriptionMode {
    /// The device posts `Notify` messages to a consumer URL
    Push,
    /// The client polls with `PullMessages`
    Pull,
}

impl FromStr for SubscriptionMode {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "push" => Ok(SubscriptionMode::Push),
            "pull" => Ok(SubscriptionMode::Pull),
            other => Err(ApiError::Configuration(format!(
                "unknown subscription mode '{}' (expected push or pull)",
                other
            ))),
        }
    }
}

impl fmt::Display for SubscriptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubscriptionMode::Push => "push",
            SubscriptionMode::Pull => "pull",
        })
    }
}

/// Requested subscription lifetime, written as `PT{n}S`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Ttl(Duration);

impl Ttl {
    pub fn from_secs(secs: u64) -> Self {
        Ttl(Duration::from_secs(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }
}

impl Default for Ttl {
    fn default() -> Self {
        Ttl::from_secs(300)
    }
}

impl fmt::Display for Ttl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PT{}S", self.0.as_secs())
    }
}

impl FromStr for Ttl {
    type Err = ApiError;

    /// Accepts plain seconds (`300`, `300s`) or an ISO-8601 time duration (`PT5M`, `PT1H30M`)
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ApiError::Configuration(format!("invalid TTL '{}'", s));
        let text = s.trim();

        let secs = if let Some(rest) = text
            .strip_prefix("PT")
            .or_else(|| text.strip_prefix("pt"))
        {
            let mut total = 0u64;
            let mut number = String::new();
            for c in rest.chars() {
                if c.is_ascii_digit() {
                    number.push(c);
                    continue;
                }
                let value: u64 = number.parse().map_err(|_| invalid())?;
                number.clear();
                let unit = match c.to_ascii_uppercase() {
                    'H' => 3600,
                    'M' => 60,
                    'S' => 1,
                    _ => return Err(invalid()),
                };
                total = value
                    .checked_mul(unit)
                    .and_then(|secs| total.checked_add(secs))
                    .ok_or_else(invalid)?;
            }
            if !number.is_empty() {
                return Err(invalid());
            }
            total
        } else {
            text.trim_end_matches(['s', 'S'])
                .parse()
                .map_err(|_| invalid())?
        };

        if secs == 0 {
            return Err(ApiError::Configuration("TTL must be greater than 0".to_string()));
        }
        Ok(Ttl::from_secs(secs))
    }
}

/// Lifecycle phase of a subscription that exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubscriptionPhase {
    Subscribed,
    /// A renew exchange is in flight
    Renewing,
    Cancelled,
}

/// One live subscription, as reported by the device
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionState {
    /// Server-issued absolute URL for Renew/Unsubscribe/PullMessages
    pub manager_url: String,
    pub mode: SubscriptionMode,
    pub current_time: Option<DateTime<Utc>>,
    pub termination_time: Option<DateTime<Utc>>,
    pub requested_ttl: Ttl,
    phase: SubscriptionPhase,
}

impl SubscriptionState {
    pub fn new(mode: SubscriptionMode, fields: SubscriptionFields, requested_ttl: Ttl) -> Self {
        Self {
            manager_url: fields.address,
            mode,
            current_time: fields.current_time,
            termination_time: fields.termination_time,
            requested_ttl,
            phase: SubscriptionPhase::Subscribed,
        }
    }

    pub fn phase(&self) -> SubscriptionPhase {
        self.phase
    }

    pub fn is_cancelled(&self) -> bool {
        self.phase == SubscriptionPhase::Cancelled
    }

    /// Lifetime granted by the device.
    ///
    /// Uses the device's own instants to stay immune to clock skew. With only
    /// a termination time the local clock stands in for the current time;
    /// with neither, or a non-positive result, the requested TTL is used.
    pub fn server_ttl(&self) -> Duration {
        let granted = match (self.current_time, self.termination_time) {
            (Some(current), Some(termination)) => Some(termination - current),
            (None, Some(termination)) => Some(termination - Utc::now()),
            _ => None,
        };

        granted
            .and_then(|delta| delta.to_std().ok())
            .filter(|ttl| !ttl.is_zero())
            .unwrap_or_else(|| self.requested_ttl.as_duration())
    }
}

/// Creates, renews and cancels event subscriptions for one device
#[derive(Debug, Clone)]
pub struct SubscriptionManager {
    client: OnvifClient,
}

impl SubscriptionManager {
    pub fn new(client: OnvifClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &OnvifClient {
        &self.client
    }

    /// Create a subscription
    ///
    /// Push mode requires `push_url` and subscribes on the Events endpoint,
    /// repeating the exchange on the Device endpoint if Events answers 404/405
    /// or times out. Pull mode creates a pull point and falls back to a plain
    /// `Subscribe` without consumer when the device refuses or returns no
    /// subscription reference.
    pub async fn subscribe(
        &self,
        mode: SubscriptionMode,
        push_url: Option<&str>,
        ttl: Ttl,
    ) -> Result<SubscriptionState> {
        let fields = match mode {
            SubscriptionMode::Push => {
                let consumer = validate_push_url(push_url)?;
                self.subscribe_push(consumer, ttl).await?
            }
            SubscriptionMode::Pull => self.subscribe_pull(ttl).await?,
        };

        tracing::info!(
            %mode,
            manager = %fields.address,
            termination = ?fields.termination_time,
            "subscription created"
        );
        Ok(SubscriptionState::new(mode, fields, ttl))
    }

    async fn subscribe_push(&self, consumer: String, ttl: Ttl) -> Result<SubscriptionFields> {
        let request = SubscribeRequest {
            consumer: Some(consumer),
            ttl,
        };

        match self.client.execute::<SubscribeOperation>(&request).await {
            Ok(fields) => Ok(fields),
            Err(e) if matches!(e.http_status(), Some(404 | 405)) || e.is_timeout() => {
                tracing::warn!(error = %e, "events endpoint refused Subscribe, retrying on device endpoint");
                let device = self.client.resolve(Service::Device).await?;
                self.client
                    .execute_at::<SubscribeOperation>(&device.url, &request)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    async fn subscribe_pull(&self, ttl: Ttl) -> Result<SubscriptionFields> {
        let request = CreatePullPointSubscriptionRequest { ttl };
        match self
            .client
            .execute::<CreatePullPointSubscriptionOperation>(&request)
            .await
        {
            Ok(fields) => Ok(fields),
            Err(e) if e.is_fault() || matches!(e, ApiError::MissingField { .. }) => {
                tracing::warn!(error = %e, "pull point creation failed, falling back to Subscribe");
                self.client
                    .execute::<SubscribeOperation>(&SubscribeRequest {
                        consumer: None,
                        ttl,
                    })
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Extend a subscription; posted directly to the manager URL
    pub async fn renew(&self, state: &mut SubscriptionState, ttl: Ttl) -> Result<()> {
        if state.is_cancelled() {
            return Err(ApiError::Subscription(
                "cannot renew a cancelled subscription".to_string(),
            ));
        }

        state.phase = SubscriptionPhase::Renewing;
        let result = self
            .client
            .execute_at::<RenewOperation>(&state.manager_url, &RenewRequest { ttl })
            .await;
        state.phase = SubscriptionPhase::Subscribed;

        let response = result?;
        state.requested_ttl = ttl;
        // both instants are replaced so server_ttl never pairs a stale
        // creation-time clock with the new termination
        state.current_time = response.current_time;
        state.termination_time = response.termination_time;

        tracing::debug!(
            manager = %state.manager_url,
            termination = ?state.termination_time,
            "subscription renewed"
        );
        Ok(())
    }

    /// Cancel a subscription. Best effort: failures are logged, never returned.
    ///
    /// Returns whether the device acknowledged the request. The state is
    /// marked cancelled either way.
    pub async fn unsubscribe(&self, state: &mut SubscriptionState) -> bool {
        if state.is_cancelled() {
            return true;
        }

        let acknowledged = match self
            .client
            .execute_at::<UnsubscribeOperation>(&state.manager_url, &())
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(manager = %state.manager_url, error = %e, "unsubscribe failed");
                false
            }
        };

        state.phase = SubscriptionPhase::Cancelled;
        acknowledged
    }

    /// Fetch pending notifications from a pull-point subscription
    pub async fn pull_messages(
        &self,
        state: &SubscriptionState,
        request: &PullMessagesRequest,
    ) -> Result<PullMessagesResponse> {
        if state.is_cancelled() {
            return Err(ApiError::Subscription(
                "cannot pull from a cancelled subscription".to_string(),
            ));
        }
        self.client
            .execute_at::<PullMessagesOperation>(&state.manager_url, request)
            .await
    }
}

fn validate_push_url(push_url: Option<&str>) -> Result<String> {
    let url = push_url
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| {
            ApiError::Configuration("push subscriptions require a consumer URL".to_string())
        })?;

    let parsed = url::Url::parse(url)
        .map_err(|e| ApiError::Configuration(format!("invalid push URL '{}': {}", url, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ApiError::Configuration(format!(
            "push URL must be http or https, got '{}'",
            parsed.scheme()
        )));
    }
    Ok(url.to_string())
}
