//! Token lifecycle orchestration.
//!
//! [`TokenManager`] ties the OAuth client, the credential store, the token
//! cache, and the state-token issuer into the three-phase flow:
//!
//! 1. No refresh token stored: [`authorization_url`] starts the flow
//! 2. Callback received: [`complete_authorization`] exchanges the code,
//!    persists the refresh token, and caches the access token
//! 3. Authorized: [`access_token`] serves from the cache, refreshing on miss
//!
//! [`authorization_url`]: TokenManager::authorization_url
//! [`complete_authorization`]: TokenManager::complete_authorization
//! [`access_token`]: TokenManager::access_token

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{ACCESS_TOKEN_KEY, TokenCache};
use crate::error::{AuthError, AuthResult};
use crate::oauth::OAuthClient;
use crate::state::StateTokenIssuer;
use crate::store::CredentialStore;

/// Cache TTL applied when the token endpoint omits `expires_in`.
const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Orchestrates the OAuth token lifecycle.
pub struct TokenManager {
    oauth: OAuthClient,
    store: Arc<dyn CredentialStore>,
    cache: Arc<dyn TokenCache>,
    states: StateTokenIssuer,
    redirect_uri: String,
    scope: String,
}

impl TokenManager {
    /// Creates a manager over the given collaborators.
    ///
    /// `redirect_uri` is the callback URL registered with the OAuth client;
    /// `scope` is the space-separated scope list to request.
    pub fn new(
        oauth: OAuthClient,
        store: Arc<dyn CredentialStore>,
        cache: Arc<dyn TokenCache>,
        redirect_uri: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            oauth,
            store,
            cache,
            states: StateTokenIssuer::new(),
            redirect_uri: redirect_uri.into(),
            scope: scope.into(),
        }
    }

    /// Sets the validity window for state tokens.
    #[must_use]
    pub fn with_state_ttl(mut self, ttl: Duration) -> Self {
        self.states = StateTokenIssuer::new().with_ttl(ttl);
        self
    }

    /// Returns the callback URL this manager was built with.
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Returns true if a refresh token is stored (the flow has completed).
    pub fn is_authorized(&self) -> AuthResult<bool> {
        Ok(self.store.refresh_token()?.is_some())
    }

    /// Issues a fresh state token and builds the authorization URL.
    pub fn authorization_url(&self) -> AuthResult<String> {
        let credentials = self.store.client_credentials()?;
        let state = self.states.issue();
        Ok(self.oauth.build_authorization_url(
            &credentials,
            &self.redirect_uri,
            &self.scope,
            &state,
        ))
    }

    /// Completes the authorization flow from a callback.
    ///
    /// Validates (and consumes) the state token, exchanges the code,
    /// persists the refresh token (overwriting any previous one), and
    /// caches the access token with TTL equal to `expires_in`.
    ///
    /// # Errors
    ///
    /// State validation failures reject the callback before any network
    /// call; exchange failures leave the store untouched, and the user may
    /// retry from the auth page.
    pub async fn complete_authorization(&self, code: &str, state: &str) -> AuthResult<()> {
        self.states.validate(state)?;

        let credentials = self.store.client_credentials()?;
        let pair = self
            .oauth
            .exchange_code(&credentials, code, &self.redirect_uri)
            .await?;

        let refresh_token = pair
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::exchange("token response is missing a refresh token"))?;

        self.store.set_refresh_token(refresh_token)?;
        self.cache
            .put(ACCESS_TOKEN_KEY, &pair.access_token, access_token_ttl(pair.expires_in));

        info!("authorization complete, refresh token stored");
        Ok(())
    }

    /// Returns a valid access token.
    ///
    /// Serves from the cache when possible; on a miss, performs one refresh
    /// call and caches the result with TTL equal to `expires_in`.
    ///
    /// # Errors
    ///
    /// Fails with `NotAuthorized` when no refresh token is stored, and with
    /// `RefreshFailed` when the refresh is rejected (e.g. revoked token) -
    /// in that case nothing is cached and the caller should
    /// [`clear_authorization`](Self::clear_authorization) and re-authorize.
    pub async fn access_token(&self) -> AuthResult<String> {
        if let Some(token) = self.cache.get(ACCESS_TOKEN_KEY) {
            debug!("access token served from cache");
            return Ok(token);
        }

        let refresh_token = self.store.refresh_token()?.ok_or_else(|| {
            AuthError::not_authorized("no refresh token stored, authorization required")
        })?;

        debug!("access token cache miss, refreshing");
        let credentials = self.store.client_credentials()?;
        let pair = self
            .oauth
            .refresh_access_token(&credentials, &refresh_token)
            .await?;

        self.cache
            .put(ACCESS_TOKEN_KEY, &pair.access_token, access_token_ttl(pair.expires_in));
        Ok(pair.access_token)
    }

    /// Discards the stored refresh token and the cached access token,
    /// returning the lifecycle to its unauthorized starting point.
    pub fn clear_authorization(&self) -> AuthResult<()> {
        self.store.clear_refresh_token()?;
        self.cache.remove(ACCESS_TOKEN_KEY);
        info!("authorization cleared");
        Ok(())
    }
}

/// Maps the token endpoint's `expires_in` to a cache TTL.
fn access_token_ttl(expires_in: Option<u64>) -> Duration {
    expires_in
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryTokenCache;
    use crate::credentials::ClientCredentials;
    use crate::error::AuthErrorCode;
    use crate::store::MemoryCredentialStore;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials() -> ClientCredentials {
        ClientCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    fn manager_with(
        server: &MockServer,
        store: Arc<MemoryCredentialStore>,
        cache: Arc<MemoryTokenCache>,
    ) -> TokenManager {
        let oauth = OAuthClient::new(Duration::from_secs(5))
            .with_token_url(format!("{}/token", server.uri()));
        TokenManager::new(
            oauth,
            store,
            cache,
            "https://app.example.com/usercallback",
            "https://www.googleapis.com/auth/userinfo.email",
        )
    }

    /// Pulls the state parameter out of an authorization URL.
    fn state_param(auth_url: &str) -> String {
        let parsed = url::Url::parse(auth_url).unwrap();
        parsed
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn complete_authorization_stores_tokens_exactly_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.first",
                "refresh_token": "1//refresh",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new(test_credentials()));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store.clone(), cache.clone());

        let state = state_param(&manager.authorization_url().unwrap());
        manager
            .complete_authorization("auth-code", &state)
            .await
            .unwrap();

        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("1//refresh"));
        assert_eq!(cache.get(ACCESS_TOKEN_KEY).as_deref(), Some("ya29.first"));
        assert!(manager.is_authorized().unwrap());
    }

    #[tokio::test]
    async fn replayed_state_is_rejected_without_a_second_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.first",
                "refresh_token": "1//refresh",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new(test_credentials()));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store, cache);

        let state = state_param(&manager.authorization_url().unwrap());
        manager
            .complete_authorization("auth-code", &state)
            .await
            .unwrap();

        let err = manager
            .complete_authorization("auth-code", &state)
            .await
            .unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::StateRejected);
    }

    #[tokio::test]
    async fn failed_exchange_leaves_store_untouched() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new(test_credentials()));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store.clone(), cache.clone());

        let state = state_param(&manager.authorization_url().unwrap());
        let err = manager
            .complete_authorization("bad-code", &state)
            .await
            .unwrap_err();

        assert_eq!(err.code(), AuthErrorCode::ExchangeFailed);
        assert!(store.refresh_token().unwrap().is_none());
        assert!(cache.get(ACCESS_TOKEN_KEY).is_none());
        assert!(!manager.is_authorized().unwrap());
    }

    #[tokio::test]
    async fn exchange_without_refresh_token_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.only",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::new(test_credentials()));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store.clone(), cache);

        let state = state_param(&manager.authorization_url().unwrap());
        let err = manager
            .complete_authorization("auth-code", &state)
            .await
            .unwrap_err();

        assert_eq!(err.code(), AuthErrorCode::ExchangeFailed);
        assert!(store.refresh_token().unwrap().is_none());
    }

    #[tokio::test]
    async fn access_token_refreshes_exactly_once_on_cache_miss() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_refresh_token(
            test_credentials(),
            "1//refresh",
        ));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store, cache);

        // First call refreshes, second is served from the cache; the mock's
        // expect(1) verifies only one refresh happened.
        assert_eq!(manager.access_token().await.unwrap(), "ya29.fresh");
        assert_eq!(manager.access_token().await.unwrap(), "ya29.fresh");
    }

    #[tokio::test]
    async fn access_token_without_authorization_fails() {
        let server = MockServer::start().await;

        let store = Arc::new(MemoryCredentialStore::new(test_credentials()));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store, cache);

        let err = manager.access_token().await.unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::NotAuthorized);
        assert!(err.code().requires_reauthorization());
    }

    #[tokio::test]
    async fn revoked_refresh_token_fails_and_caches_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_refresh_token(
            test_credentials(),
            "revoked",
        ));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store, cache.clone());

        let err = manager.access_token().await.unwrap_err();
        assert_eq!(err.code(), AuthErrorCode::RefreshFailed);
        assert!(err.code().requires_reauthorization());
        assert!(cache.get(ACCESS_TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn clear_authorization_resets_the_lifecycle() {
        let server = MockServer::start().await;

        let store = Arc::new(MemoryCredentialStore::with_refresh_token(
            test_credentials(),
            "1//refresh",
        ));
        let cache = Arc::new(MemoryTokenCache::new());
        cache.put(ACCESS_TOKEN_KEY, "ya29.cached", Duration::from_secs(60));

        let manager = manager_with(&server, store.clone(), cache.clone());
        assert!(manager.is_authorized().unwrap());

        manager.clear_authorization().unwrap();

        assert!(!manager.is_authorized().unwrap());
        assert!(store.refresh_token().unwrap().is_none());
        assert!(cache.get(ACCESS_TOKEN_KEY).is_none());
    }

    #[tokio::test]
    async fn new_refresh_token_overwrites_the_old_one() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.second",
                "refresh_token": "1//second",
                "expires_in": 3599
            })))
            .mount(&server)
            .await;

        let store = Arc::new(MemoryCredentialStore::with_refresh_token(
            test_credentials(),
            "1//first",
        ));
        let cache = Arc::new(MemoryTokenCache::new());
        let manager = manager_with(&server, store.clone(), cache);

        let state = state_param(&manager.authorization_url().unwrap());
        manager
            .complete_authorization("auth-code", &state)
            .await
            .unwrap();

        assert_eq!(store.refresh_token().unwrap().as_deref(), Some("1//second"));
    }
}
