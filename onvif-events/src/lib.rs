//! Automatic renewal of ONVIF event subscriptions
//!
//! [`AutoRenewer`] takes ownership of a live subscription and keeps it alive
//! until shut down, renewing ahead of the device-reported expiry and backing
//! off when renewals fail. Lifecycle events are reported on a bounded channel.
//!
//! ```rust,ignore
//! use onvif_api::{SubscriptionManager, SubscriptionMode, Ttl};
//! use onvif_events::{AutoRenewer, RenewalConfig};
//!
//! let manager = SubscriptionManager::new(client);
//! let state = manager.subscribe(SubscriptionMode::Pull, None, Ttl::default()).await?;
//!
//! let mut renewer = AutoRenewer::start(manager, state, RenewalConfig::default())?;
//! let mut events = renewer.take_events().expect("events taken once");
//! tokio::spawn(async move {
//!     while let Some(event) = events.recv().await {
//!         println!("{event}");
//!     }
//! });
//!
//! tokio::signal::ctrl_c().await?;
//! let state = renewer.shutdown().await?;
//! ```

pub mod config;
pub mod error;
pub mod event;
pub mod renewal;
pub mod schedule;

pub use config::RenewalConfig;
pub use error::{RenewalError, Result};
pub use event::RenewalEvent;
pub use renewal::AutoRenewer;
