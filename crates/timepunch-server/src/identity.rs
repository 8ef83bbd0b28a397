//! Caller identity resolution.
//!
//! The server never authenticates users itself. Identity is an opaque
//! collaborator behind a trait: whatever sits in front of the server (an
//! authenticating reverse proxy, an SSO gateway) is trusted to say who the
//! caller is.

use axum::http::HeaderMap;

/// Resolves the email address of the calling user.
pub trait UserIdentity: Send + Sync {
    /// Returns the caller's email, or `None` if it cannot be determined.
    fn email(&self, headers: &HeaderMap) -> Option<String>;
}

/// Trusts an authenticating reverse proxy to supply the caller's email in a
/// request header, with an optional configured fallback for single-user
/// deployments.
#[derive(Debug, Clone)]
pub struct HeaderIdentity {
    header: String,
    fallback: Option<String>,
}

impl HeaderIdentity {
    /// Creates an identity resolver reading the given header.
    pub fn new(header: impl Into<String>, fallback: Option<String>) -> Self {
        Self {
            header: header.into(),
            fallback,
        }
    }
}

impl UserIdentity for HeaderIdentity {
    fn email(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .or_else(|| self.fallback.clone())
    }
}
