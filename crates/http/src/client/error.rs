//! Client error types

use biomentor_core::{CoreError, ExpiryReason};
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The session was terminated and credentials were cleared
    #[error("Session expired: {0}")]
    SessionExpired(ExpiryReason),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Forbidden
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Input rejected before any request was sent
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Credential store failure
    #[error("Credential store error: {0}")]
    Credentials(#[from] CoreError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Whether the user has to authenticate again
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationFailed(_) | Self::SessionExpired(_)
        )
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        Self::Configuration(format!("invalid URL: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_from_status() {
        assert!(matches!(
            ClientError::from_status(StatusCode::UNAUTHORIZED, "expired".into()),
            ClientError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::FORBIDDEN, "nope".into()),
            ClientError::Forbidden(_)
        ));
        assert!(matches!(
            ClientError::from_status(StatusCode::INTERNAL_SERVER_ERROR, "boom".into()),
            ClientError::ServerError { status: 500, .. }
        ));
    }

    #[test]
    fn test_auth_expired_classification() {
        assert!(ClientError::SessionExpired(ExpiryReason::MissingRefreshToken).is_auth_expired());
        assert!(ClientError::AuthenticationFailed(String::new()).is_auth_expired());
        assert!(!ClientError::Forbidden(String::new()).is_auth_expired());
    }
}
