//! Error types for the token lifecycle.

use std::fmt;
use thiserror::Error;

/// The category of an authorization error.
///
/// This enum provides a high-level classification of errors for use in
/// HTTP responses and caller decisions (e.g. whether to re-authorize).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthErrorCode {
    /// The authorization-code exchange failed (non-2xx or malformed response).
    ExchangeFailed,
    /// The access-token refresh failed (e.g. revoked refresh token).
    RefreshFailed,
    /// The state token was missing, expired, tampered with, or replayed.
    StateRejected,
    /// No refresh token is stored - the authorization flow has not completed.
    NotAuthorized,
    /// Network error - connection failed, timeout, DNS resolution, etc.
    NetworkError,
    /// Configuration error - missing or invalid credentials/settings.
    ConfigurationError,
    /// The credential store could not be read or written.
    StorageError,
    /// Internal error - unexpected state, bug.
    InternalError,
}

impl AuthErrorCode {
    /// Returns true if this error is transient and the operation may be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkError)
    }

    /// Returns true if the caller should discard the stored refresh token
    /// and restart the authorization flow.
    pub fn requires_reauthorization(&self) -> bool {
        matches!(self, Self::RefreshFailed | Self::NotAuthorized)
    }

    /// Returns a human-readable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExchangeFailed => "exchange_failed",
            Self::RefreshFailed => "refresh_failed",
            Self::StateRejected => "state_rejected",
            Self::NotAuthorized => "not_authorized",
            Self::NetworkError => "network_error",
            Self::ConfigurationError => "configuration_error",
            Self::StorageError => "storage_error",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred in the token lifecycle.
#[derive(Debug, Error)]
pub struct AuthError {
    /// The error code categorizing this error.
    code: AuthErrorCode,
    /// A human-readable message describing the error.
    message: String,
}

impl AuthError {
    /// Creates a new error with the given code and message.
    pub fn new(code: AuthErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an authorization-code exchange error.
    pub fn exchange(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::ExchangeFailed, message)
    }

    /// Creates a token refresh error.
    pub fn refresh(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::RefreshFailed, message)
    }

    /// Creates a state-token rejection error.
    pub fn state(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::StateRejected, message)
    }

    /// Creates a not-authorized error.
    pub fn not_authorized(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::NotAuthorized, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::NetworkError, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::ConfigurationError, message)
    }

    /// Creates a storage error.
    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::StorageError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(AuthErrorCode::InternalError, message)
    }

    /// Returns the error code.
    pub fn code(&self) -> AuthErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error is transient and may be retried.
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for token-lifecycle operations.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_retryable() {
        assert!(AuthErrorCode::NetworkError.is_retryable());
        assert!(!AuthErrorCode::ExchangeFailed.is_retryable());
        assert!(!AuthErrorCode::RefreshFailed.is_retryable());
        assert!(!AuthErrorCode::StateRejected.is_retryable());
    }

    #[test]
    fn error_code_reauthorization() {
        assert!(AuthErrorCode::RefreshFailed.requires_reauthorization());
        assert!(AuthErrorCode::NotAuthorized.requires_reauthorization());
        assert!(!AuthErrorCode::ExchangeFailed.requires_reauthorization());
        assert!(!AuthErrorCode::NetworkError.requires_reauthorization());
    }

    #[test]
    fn error_code_display() {
        assert_eq!(AuthErrorCode::ExchangeFailed.as_str(), "exchange_failed");
        assert_eq!(AuthErrorCode::RefreshFailed.as_str(), "refresh_failed");
        assert_eq!(AuthErrorCode::StateRejected.as_str(), "state_rejected");
    }

    #[test]
    fn error_creation() {
        let err = AuthError::refresh("refresh token revoked");
        assert_eq!(err.code(), AuthErrorCode::RefreshFailed);
        assert_eq!(err.message(), "refresh token revoked");
        assert!(!err.is_retryable());
    }

    #[test]
    fn error_display() {
        let err = AuthError::exchange("token endpoint returned 400");
        let display = format!("{}", err);
        assert!(display.contains("exchange_failed"));
        assert!(display.contains("400"));
    }
}
