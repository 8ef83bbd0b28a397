//! Token-endpoint response types.

use serde::Deserialize;

/// A token pair as returned by the OAuth token endpoint.
///
/// The authorization-code exchange returns both tokens; a refresh returns a
/// new `access_token` only (no `refresh_token`). `expires_in` is the access
/// token's lifetime in seconds and becomes the cache TTL. Anything else the
/// endpoint sends (`token_type`, granted scopes) is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential for API calls.
    pub access_token: String,

    /// Long-lived credential used to mint new access tokens.
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Access-token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
}
