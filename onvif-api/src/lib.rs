//! ONVIF client engine
//!
//! This crate resolves ONVIF services to device endpoints, dispatches
//! digest-authenticated SOAP requests with bounded recovery, and manages the
//! lifecycle of event subscriptions. It uses the private `soap-client` crate
//! for envelopes and transport.
//!
//! ```rust,ignore
//! use onvif_api::{ClientConfig, OnvifClient};
//! use onvif_api::operations::GetProfilesOperation;
//! use soap_client::Credentials;
//!
//! let client = OnvifClient::new(
//!     "192.168.1.64",
//!     Some(Credentials::new("admin", "secret")),
//!     ClientConfig::default(),
//! )?;
//! let profiles = client.execute::<GetProfilesOperation>(&()).await?;
//! ```

pub mod client;
pub mod config;
pub mod directory;
pub mod error;
pub mod exchange;
pub mod operation;
pub mod operations;
pub mod reply;
pub mod request;
pub mod service;
pub mod subscription;
pub mod wakeup;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use client::OnvifClient;
pub use config::ClientConfig;
pub use directory::{Endpoint, EndpointDirectory};
pub use error::{ApiError, Result};
pub use exchange::Exchange;
pub use operation::{Acknowledged, OnvifOperation};
pub use reply::SoapReply;
pub use request::{RequestBody, ServiceRequest};
pub use service::Service;
pub use soap_client::Credentials;
pub use subscription::{
    SubscriptionManager, SubscriptionMode, SubscriptionPhase, SubscriptionState, Ttl,
};
pub use wakeup::WakeupMode;
