//! OAuth client credentials.

use std::path::Path;

use serde::Deserialize;

use crate::error::{AuthError, AuthResult};

/// OAuth 2.0 client credentials.
///
/// Provisioned once when the OAuth client is registered, then held in the
/// credential store. Operators must supply their own client ID and secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The OAuth 2.0 client ID from the Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from the Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth credentials JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level (e.g., from gcloud)
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    /// Credentials for installed (desktop) applications.
    installed: Option<NestedCredentials>,
    /// Credentials for web applications.
    web: Option<NestedCredentials>,
    /// Direct client_id (flat format).
    client_id: Option<String>,
    /// Direct client_secret (flat format).
    client_secret: Option<String>,
}

/// OAuth credentials within a nested section of the credentials JSON file.
#[derive(Debug, Deserialize)]
struct NestedCredentials {
    client_id: String,
    client_secret: String,
}

impl ClientCredentials {
    /// Creates new client credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads client credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> AuthResult<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AuthError::configuration(format!("failed to read credentials file: {}", e))
        })?;
        Self::from_json(&content)
    }

    /// Parses client credentials from a credentials JSON string.
    ///
    /// Supports multiple formats:
    /// 1. Google Cloud Console format: `{"web": {"client_id": "...", "client_secret": "..."}}`
    /// 2. Flat format: `{"client_id": "...", "client_secret": "..."}`
    pub fn from_json(json: &str) -> AuthResult<Self> {
        let file: CredentialsFile = serde_json::from_str(json).map_err(|e| {
            AuthError::configuration(format!("failed to parse credentials JSON: {}", e))
        })?;

        // Try nested format first (web or installed section)
        if let Some(creds) = file.web.or(file.installed) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        // Try flat format (client_id and client_secret at root level)
        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err(AuthError::configuration(
            "credentials must contain a 'web'/'installed' section or \
             'client_id'/'client_secret' at root level",
        ))
    }

    /// Validates that the credentials appear to be correctly formatted.
    ///
    /// This checks that:
    /// - Client ID ends with `.apps.googleusercontent.com`
    /// - Client secret is non-empty
    pub fn validate(&self) -> AuthResult<()> {
        if self.client_id.is_empty() {
            return Err(AuthError::configuration("client_id is required"));
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err(AuthError::configuration(
                "client_id should end with .apps.googleusercontent.com",
            ));
        }
        if self.client_secret.is_empty() {
            return Err(AuthError::configuration("client_secret is required"));
        }
        Ok(())
    }
}
