//! Server configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/timepunch/config.toml` by default.
//!
//! Credential values (`client_id`, `client_secret`) support secret references:
//! - `env::VAR_NAME` — resolved from the environment
//! - `file::/path/to/secret` — first line of a file (mounted secrets)
//! - `pass::path/in/store` — resolved via `pass show`
//! - plain text — used as-is

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use timepunch_auth::ClientCredentials;

/// The suffix the deployment's public URL must end with.
///
/// The callback URL is derived by swapping this suffix for `usercallback`,
/// so `https://host/app/exec` becomes `https://host/app/usercallback`.
pub const DEPLOYMENT_SUFFIX: &str = "/exec";

/// Default OAuth scope: enough to learn the authorizing user's email.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/userinfo.email";

// ---------------------------------------------------------------------------
// ServerConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the timepunch server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server settings.
    pub server: ServerSettings,

    /// Timesheet backend settings.
    pub timesheet: TimesheetSettings,

    /// Google OAuth settings.
    pub google: GoogleSettings,

    /// Caller identity settings.
    pub identity: IdentitySettings,
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to listen on.
    pub listen: String,

    /// Public base URL of the deployment.
    ///
    /// Must end with `/exec`; the OAuth callback URL is derived from it.
    pub public_url: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: "127.0.0.1:8710".to_string(),
            public_url: None,
        }
    }
}

/// Timesheet backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimesheetSettings {
    /// URL the clock payload is POSTed to.
    pub api_url: Option<String>,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for TimesheetSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: 30,
        }
    }
}

/// Google OAuth settings.
///
/// Credentials (`client_id`, `client_secret`) are stored inline and support
/// secret references (`env::…`, `file::…`, `pass::…`); alternatively
/// `credentials_file` points at a Google Cloud Console JSON download.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleSettings {
    /// OAuth client ID (supports secret-reference prefixes).
    pub client_id: Option<String>,

    /// OAuth client secret (supports secret-reference prefixes).
    pub client_secret: Option<String>,

    /// Path to a Google Cloud Console credentials JSON file.
    pub credentials_file: Option<PathBuf>,

    /// OAuth scopes to request.
    pub scopes: Vec<String>,

    /// Path to the durable credential store.
    pub store_path: Option<PathBuf>,

    /// State-token validity window in seconds.
    pub state_ttl: u64,

    /// Token-endpoint request timeout in seconds.
    pub timeout: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            credentials_file: None,
            scopes: vec![DEFAULT_SCOPE.to_string()],
            store_path: None,
            state_ttl: 360,
            timeout: 30,
        }
    }
}

/// Caller identity settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Header an authenticating reverse proxy sets to the caller's email.
    pub header: String,

    /// Email to fall back to when the header is absent (single-user setups).
    pub fallback_email: Option<String>,
}

impl Default for IdentitySettings {
    fn default() -> Self {
        Self {
            header: "x-authenticated-email".to_string(),
            fallback_email: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the default path.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, String> {
        let content =
            std::fs::read_to_string(path).map_err(|e| format!("failed to read config: {}", e))?;
        toml::from_str(&content).map_err(|e| format!("failed to parse config: {}", e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timepunch")
    }

    /// Returns the default data directory path.
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timepunch")
    }

    /// Derives the OAuth callback URL from the public base URL.
    ///
    /// The base URL must end with [`DEPLOYMENT_SUFFIX`]; the callback is the
    /// base with the trailing `exec` replaced by `usercallback`. Anything
    /// else is a configuration error, caught before the server starts.
    pub fn callback_url(&self) -> Result<String, String> {
        let base = self
            .server
            .public_url
            .as_deref()
            .ok_or_else(|| "server.public_url is not set".to_string())?;

        url::Url::parse(base).map_err(|e| format!("server.public_url is not a valid URL: {}", e))?;

        if !base.ends_with(DEPLOYMENT_SUFFIX) {
            return Err(format!(
                "server.public_url must end with {}: {}",
                DEPLOYMENT_SUFFIX, base
            ));
        }

        Ok(format!("{}usercallback", &base[..base.len() - 4]))
    }

    /// Resolves the OAuth client credentials.
    ///
    /// Inline `client_id`/`client_secret` win (each passed through
    /// [`secret::resolve`](crate::secret::resolve)); otherwise
    /// `credentials_file` is read.
    pub fn resolve_credentials(&self) -> Result<ClientCredentials, String> {
        if let (Some(raw_id), Some(raw_secret)) = (
            self.google.client_id.as_deref(),
            self.google.client_secret.as_deref(),
        ) {
            let client_id = crate::secret::resolve(raw_id)
                .map_err(|e| format!("failed to resolve client_id: {}", e))?;
            let client_secret = crate::secret::resolve(raw_secret)
                .map_err(|e| format!("failed to resolve client_secret: {}", e))?;
            return Ok(ClientCredentials::new(client_id, client_secret));
        }

        if let Some(ref path) = self.google.credentials_file {
            return ClientCredentials::from_file(path).map_err(|e| e.to_string());
        }

        Err(format!(
            "Google credentials not found. Add to {}:\n  \
             [google]\n  \
             client_id = \"YOUR_ID.apps.googleusercontent.com\"\n  \
             client_secret = \"YOUR_SECRET\"",
            Self::default_path().display()
        ))
    }

    /// Returns the space-separated scope string for the authorization URL.
    pub fn scope(&self) -> String {
        self.google.scopes.join(" ")
    }

    /// Returns the credential-store path.
    pub fn store_path(&self) -> PathBuf {
        self.google
            .store_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join("credentials.json"))
    }

    /// Returns the timesheet API URL.
    pub fn timesheet_api_url(&self) -> Result<String, String> {
        self.timesheet
            .api_url
            .clone()
            .ok_or_else(|| "timesheet.api_url is not set".to_string())
    }

    /// Returns the state-token validity window.
    pub fn state_ttl(&self) -> Duration {
        Duration::from_secs(self.google.state_ttl)
    }

    /// Validates the configuration, failing fast on anything the server
    /// would otherwise trip over mid-flow.
    pub fn validate(&self) -> Result<(), String> {
        self.callback_url()?;
        self.timesheet_api_url()?;

        let credentials = self.resolve_credentials()?;
        credentials
            .validate()
            .map_err(|e| format!("invalid credentials: {}", e))?;

        if self.google.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        Ok(())
    }
}
