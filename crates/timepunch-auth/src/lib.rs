//! OAuth2 token lifecycle for the timepunch web app.
//!
//! This crate implements the authorization-code-with-refresh flow against
//! Google's token endpoint and the storage around it:
//!
//! - [`TokenManager`] - orchestrates the whole lifecycle
//! - [`OAuthClient`] - authorization URL, code exchange, token refresh
//! - [`CredentialStore`] - durable client credentials + refresh token
//! - [`TokenCache`] - expiring cache for the short-lived access token
//! - [`StateTokenIssuer`] - single-use, time-bounded anti-forgery tokens
//! - [`AuthError`] - error types for lifecycle operations
//!
//! # Lifecycle
//!
//! ```text
//!  UNAUTHENTICATED ──authorization_url()──▶ user grants access
//!          ▲                                      │
//!          │                             callback {code, state}
//!   clear_authorization()                         │
//!          │                                      ▼
//!  AUTHENTICATED ◀──────────── complete_authorization(code, state)
//!          │
//!          └─ access_token(): cache hit, or one refresh call on miss
//! ```
//!
//! The refresh token is long-lived and persisted durably; the access token
//! is short-lived and only ever lives in the expiring cache, with its TTL
//! set to the `expires_in` the token endpoint declared.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use timepunch_auth::{
//!     ClientCredentials, MemoryCredentialStore, MemoryTokenCache, OAuthClient, TokenManager,
//! };
//!
//! let credentials = ClientCredentials::new(
//!     "your-client-id.apps.googleusercontent.com",
//!     "your-client-secret",
//! );
//!
//! let manager = TokenManager::new(
//!     OAuthClient::new(Duration::from_secs(30)),
//!     Arc::new(MemoryCredentialStore::new(credentials)),
//!     Arc::new(MemoryTokenCache::new()),
//!     "https://app.example.com/usercallback",
//!     "https://www.googleapis.com/auth/userinfo.email",
//! );
//!
//! let url = manager.authorization_url()?;
//! // ...user visits the URL, provider redirects back with {code, state}...
//! manager.complete_authorization(&code, &state).await?;
//! let token = manager.access_token().await?;
//! ```

pub mod cache;
pub mod credentials;
pub mod error;
pub mod manager;
pub mod oauth;
pub mod state;
pub mod store;
pub mod tokens;

// Re-export main types at crate root
pub use cache::{ACCESS_TOKEN_KEY, MemoryTokenCache, TokenCache};
pub use credentials::ClientCredentials;
pub use error::{AuthError, AuthErrorCode, AuthResult};
pub use manager::TokenManager;
pub use oauth::{GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, OAuthClient};
pub use state::{DEFAULT_STATE_TTL, StateTokenIssuer};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use tokens::TokenPair;
