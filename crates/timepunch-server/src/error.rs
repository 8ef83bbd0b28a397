//! Server error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use timepunch_auth::{AuthError, AuthErrorCode};

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Token lifecycle error.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The timesheet API rejected or failed the request.
    #[error("timesheet API error: {0}")]
    Timesheet(String),

    /// The caller's identity could not be resolved.
    #[error("identity error: {0}")]
    Identity(String),

    /// The request was malformed.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Returns the HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Auth(err) => auth_status(err.code()),
            Self::Timesheet(_) => StatusCode::BAD_GATEWAY,
            Self::Identity(_) => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Maps a token-lifecycle error code to an HTTP status.
pub fn auth_status(code: AuthErrorCode) -> StatusCode {
    match code {
        AuthErrorCode::StateRejected => StatusCode::BAD_REQUEST,
        AuthErrorCode::NotAuthorized => StatusCode::UNAUTHORIZED,
        AuthErrorCode::ExchangeFailed
        | AuthErrorCode::RefreshFailed
        | AuthErrorCode::NetworkError => StatusCode::BAD_GATEWAY,
        AuthErrorCode::ConfigurationError
        | AuthErrorCode::StorageError
        | AuthErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
