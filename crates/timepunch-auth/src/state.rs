//! Anti-forgery state tokens for the authorization round-trip.
//!
//! A state token correlates the outbound authorization redirect with the
//! inbound callback. Tokens are opaque to the identity provider: a random
//! nonce and an expiry timestamp, HMAC-SHA256 signed. Validation consumes
//! the token, so a token validates at most once.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use rand::Rng as _;
use sha2::Sha256;

use crate::error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Default validity window for a state token.
pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(360);

/// The nonce length (in bytes, before base64 encoding).
const NONCE_LENGTH: usize = 16;

/// Issues and validates single-use, time-bounded state tokens.
///
/// The signing key is generated per issuer; a restart invalidates any
/// outstanding tokens, which simply sends the user back to the auth page.
#[derive(Debug)]
pub struct StateTokenIssuer {
    key: Vec<u8>,
    ttl: Duration,
    /// Consumed nonces, mapped to their expiry for pruning.
    consumed: Mutex<HashMap<String, i64>>,
}

impl StateTokenIssuer {
    /// Creates an issuer with a random signing key and the default TTL.
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let key: Vec<u8> = (0..32).map(|_| rng.random()).collect();
        Self {
            key,
            ttl: DEFAULT_STATE_TTL,
            consumed: Mutex::new(HashMap::new()),
        }
    }

    /// Sets the validity window for issued tokens.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Sets the signing key (useful for deterministic tests).
    #[must_use]
    pub fn with_key(mut self, key: impl Into<Vec<u8>>) -> Self {
        self.key = key.into();
        self
    }

    /// Issues a new state token.
    pub fn issue(&self) -> String {
        self.issue_at(Utc::now().timestamp())
    }

    /// Validates and consumes a state token.
    ///
    /// # Errors
    ///
    /// Rejects malformed tokens, bad signatures, expired tokens, and
    /// tokens that were already validated once.
    pub fn validate(&self, token: &str) -> AuthResult<()> {
        self.validate_at(token, Utc::now().timestamp())
    }

    fn issue_at(&self, now: i64) -> String {
        let mut rng = rand::rng();
        let nonce_bytes: Vec<u8> = (0..NONCE_LENGTH).map(|_| rng.random()).collect();
        let nonce = URL_SAFE_NO_PAD.encode(&nonce_bytes);

        let expires_at = now + self.ttl.as_secs() as i64;
        let payload = format!("{}.{}", nonce, expires_at);
        format!("{}.{}", payload, self.sign(&payload))
    }

    fn validate_at(&self, token: &str, now: i64) -> AuthResult<()> {
        let parts: Vec<&str> = token.split('.').collect();
        let [nonce, expires_at, signature] = parts.as_slice() else {
            return Err(AuthError::state("malformed state token"));
        };

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::state("malformed state token signature"))?;

        let payload = format!("{}.{}", nonce, expires_at);
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature_bytes)
            .map_err(|_| AuthError::state("state token signature mismatch"))?;

        let expires_at: i64 = expires_at
            .parse()
            .map_err(|_| AuthError::state("malformed state token expiry"))?;
        if now > expires_at {
            return Err(AuthError::state("state token expired"));
        }

        let mut consumed = self.consumed.lock().unwrap();
        consumed.retain(|_, expiry| *expiry >= now);
        if consumed.insert((*nonce).to_string(), expires_at).is_some() {
            return Err(AuthError::state("state token already used"));
        }

        Ok(())
    }

    fn sign(&self, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes())
    }
}

impl Default for StateTokenIssuer {
    fn default() -> Self {
        Self::new()
    }
}
