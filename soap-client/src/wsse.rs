//! WS-Security UsernameToken with password digest
//!
//! Implements the client side of the OASIS UsernameToken Profile 1.1:
//! `digest = base64(sha1(nonce + created + password))`

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use rand::RngCore;
use sha1::{Digest, Sha1};

/// Length of the random nonce in bytes
pub const NONCE_LEN: usize = 16;

/// Username and password used to sign requests
///
/// The password never leaves this type except as input to [`compute_digest`].
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A single-use UsernameToken ready to be placed in a Security header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameToken {
    pub username: String,
    /// Base64 SHA-1 of nonce, created and password
    pub password_digest: String,
    /// Base64-encoded nonce
    pub nonce: String,
    /// UTC timestamp, second precision
    pub created: String,
}

impl UsernameToken {
    /// Generate a fresh token with a random nonce.
    ///
    /// Must be called once per outbound request.
    pub fn generate(credentials: &Credentials, now: DateTime<Utc>) -> Self {
        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);
        Self::with_nonce(credentials, &nonce, now)
    }

    /// Build a token from an explicit nonce
    pub fn with_nonce(credentials: &Credentials, nonce: &[u8], now: DateTime<Utc>) -> Self {
        let created = now.format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let password_digest = compute_digest(nonce, &created, &credentials.password);

        Self {
            username: credentials.username.clone(),
            password_digest,
            nonce: STANDARD.encode(nonce),
            created,
        }
    }
}

/// Compute the WS-Security password digest
///
/// Formula: `base64(sha1(nonce_bytes || created_bytes || password_bytes))`
pub fn compute_digest(nonce: &[u8], created: &str, password: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(nonce);
    hasher.update(created.as_bytes());
    hasher.update(password.as_bytes());
    STANDARD.encode(hasher.finalize())
}
