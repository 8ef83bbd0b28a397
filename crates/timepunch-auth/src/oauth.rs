//! OAuth 2.0 authorization-code flow client for Google's token endpoint.
//!
//! Three operations, each a single HTTP round-trip with no retry logic:
//!
//! 1. Build the authorization URL the user visits to grant access
//! 2. Exchange the callback's authorization code for a token pair
//! 3. Refresh an expired access token using the refresh token

use std::time::Duration;

use tracing::info;

use crate::credentials::ClientCredentials;
use crate::error::{AuthError, AuthResult};
use crate::tokens::TokenPair;

/// Google OAuth endpoints.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// OAuth client for the authorization-code flow.
#[derive(Debug)]
pub struct OAuthClient {
    http_client: reqwest::Client,
    token_url: String,
}

impl OAuthClient {
    /// Creates a new OAuth client with the given request timeout.
    pub fn new(timeout: Duration) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to create HTTP client");

        Self {
            http_client,
            token_url: GOOGLE_TOKEN_URL.to_string(),
        }
    }

    /// Overrides the token endpoint (used in tests).
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Builds the authorization URL the user visits to grant access.
    ///
    /// `access_type=offline` asks for a refresh token; `approval_prompt=force`
    /// makes the consent screen reappear so a refresh token is issued even if
    /// the user authorized before.
    pub fn build_authorization_url(
        &self,
        credentials: &ClientCredentials,
        redirect_uri: &str,
        scope: &str,
        state: &str,
    ) -> String {
        format!(
            "{}?state={}&scope={}&client_id={}&redirect_uri={}&\
             response_type=code&access_type=offline&approval_prompt=force",
            GOOGLE_AUTH_URL,
            urlencoding::encode(state),
            urlencoding::encode(scope),
            urlencoding::encode(&credentials.client_id),
            urlencoding::encode(redirect_uri),
        )
    }

    /// Exchanges an authorization code for a token pair.
    ///
    /// # Errors
    ///
    /// Any non-2xx or malformed response fails with
    /// [`AuthErrorCode::ExchangeFailed`](crate::error::AuthErrorCode).
    pub async fn exchange_code(
        &self,
        credentials: &ClientCredentials,
        code: &str,
        redirect_uri: &str,
    ) -> AuthResult<TokenPair> {
        let params = [
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::network(format!("token exchange request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AuthError::exchange(format!(
                "token exchange failed ({}): {}",
                status, body
            )));
        }

        let pair: TokenPair = serde_json::from_str(&body)
            .map_err(|e| AuthError::exchange(format!("invalid token response: {}", e)))?;

        info!("exchanged authorization code for tokens");
        Ok(pair)
    }

    /// Refreshes the access token using the refresh token.
    ///
    /// Does not prompt the user.
    ///
    /// # Errors
    ///
    /// Any non-2xx or malformed response fails with
    /// [`AuthErrorCode::RefreshFailed`](crate::error::AuthErrorCode) - the
    /// caller should discard the refresh token and re-authorize.
    pub async fn refresh_access_token(
        &self,
        credentials: &ClientCredentials,
        refresh_token: &str,
    ) -> AuthResult<TokenPair> {
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .http_client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| AuthError::network(format!("token refresh request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AuthError::network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(AuthError::refresh(format!(
                "token refresh failed ({}): {}",
                status, body
            )));
        }

        let pair: TokenPair = serde_json::from_str(&body)
            .map_err(|e| AuthError::refresh(format!("invalid token response: {}", e)))?;

        info!("refreshed access token");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorCode;
    use std::collections::HashMap;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_credentials() -> ClientCredentials {
        ClientCredentials::new("test-client.apps.googleusercontent.com", "test-secret")
    }

    fn test_client() -> OAuthClient {
        OAuthClient::new(Duration::from_secs(5))
    }

    #[test]
    fn authorization_url_contains_exactly_the_required_parameters() {
        let client = test_client();
        let url = client.build_authorization_url(
            &test_credentials(),
            "https://app.example.com/usercallback",
            "https://www.googleapis.com/auth/userinfo.email",
            "state-token-123",
        );

        let parsed = url::Url::parse(&url).unwrap();
        assert_eq!(
            format!(
                "{}://{}{}",
                parsed.scheme(),
                parsed.host_str().unwrap(),
                parsed.path()
            ),
            GOOGLE_AUTH_URL
        );

        let params: HashMap<String, String> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(params.len(), 7);
        assert_eq!(params["state"], "state-token-123");
        assert_eq!(
            params["scope"],
            "https://www.googleapis.com/auth/userinfo.email"
        );
        assert_eq!(params["client_id"], "test-client.apps.googleusercontent.com");
        assert_eq!(
            params["redirect_uri"],
            "https://app.example.com/usercallback"
        );
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["access_type"], "offline");
        assert_eq!(params["approval_prompt"], "force");
    }

    #[test]
    fn authorization_url_percent_encodes_values() {
        let client = test_client();
        let url = client.build_authorization_url(
            &test_credentials(),
            "https://app.example.com/usercallback",
            "https://www.googleapis.com/auth/userinfo.email",
            "a b&c",
        );

        assert!(url.contains("state=a%20b%26c"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fusercallback"));
        assert!(url.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fuserinfo.email"));
    }

    #[tokio::test]
    async fn exchange_code_posts_expected_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=authorization_code"))
            .and(body_string_contains("code=auth-code-1"))
            .and(body_string_contains(
                "client_id=test-client.apps.googleusercontent.com",
            ))
            .and(body_string_contains("client_secret=test-secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.access",
                "refresh_token": "1//refresh",
                "expires_in": 3599,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client().with_token_url(format!("{}/token", server.uri()));
        let pair = client
            .exchange_code(
                &test_credentials(),
                "auth-code-1",
                "https://app.example.com/usercallback",
            )
            .await
            .unwrap();

        assert_eq!(pair.access_token, "ya29.access");
        assert_eq!(pair.refresh_token.as_deref(), Some("1//refresh"));
        assert_eq!(pair.expires_in, Some(3599));
    }

    #[tokio::test]
    async fn exchange_code_non_2xx_fails_with_exchange_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let client = test_client().with_token_url(format!("{}/token", server.uri()));
        let err = client
            .exchange_code(&test_credentials(), "bad-code", "https://cb")
            .await
            .unwrap_err();

        assert_eq!(err.code(), AuthErrorCode::ExchangeFailed);
        assert!(err.message().contains("invalid_grant"));
    }

    #[tokio::test]
    async fn exchange_code_malformed_body_fails_with_exchange_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client().with_token_url(format!("{}/token", server.uri()));
        let err = client
            .exchange_code(&test_credentials(), "code", "https://cb")
            .await
            .unwrap_err();

        assert_eq!(err.code(), AuthErrorCode::ExchangeFailed);
    }

    #[tokio::test]
    async fn refresh_posts_expected_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("refresh_token=1%2F%2Frefresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "ya29.fresh",
                "expires_in": 3600,
                "token_type": "Bearer"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client().with_token_url(format!("{}/token", server.uri()));
        let pair = client
            .refresh_access_token(&test_credentials(), "1//refresh")
            .await
            .unwrap();

        assert_eq!(pair.access_token, "ya29.fresh");
        assert!(pair.refresh_token.is_none());
    }

    #[tokio::test]
    async fn refresh_revoked_token_fails_with_refresh_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"error": "invalid_grant"})),
            )
            .mount(&server)
            .await;

        let client = test_client().with_token_url(format!("{}/token", server.uri()));
        let err = client
            .refresh_access_token(&test_credentials(), "revoked")
            .await
            .unwrap_err();

        assert_eq!(err.code(), AuthErrorCode::RefreshFailed);
    }
}
