//! Custom error types for the common library
//!
//! This module defines the error taxonomy shared by the API client and every
//! consumer built on top of it.

use reqwest::StatusCode;
use thiserror::Error;

/// Error returned by calls against the portfolio API
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The credential was missing, invalid or expired (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The credential is valid but lacks the required privilege (HTTP 403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A required field failed the client-side checks; no request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other non-2xx response, carrying the server's `detail` message
    #[error("Server error ({status}): {detail}")]
    Server { status: StatusCode, detail: String },

    /// The response body did not match the expected shape
    #[error("Invalid response body: {0}")]
    Decode(#[source] reqwest::Error),

    /// The API offers no endpoint for the requested operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// An authenticated call was attempted without a credential
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl ApiError {
    /// Build the error matching a non-2xx status and its `detail` message
    pub fn from_status(status: StatusCode, detail: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(detail),
            StatusCode::FORBIDDEN => ApiError::Forbidden(detail),
            status => ApiError::Server { status, detail },
        }
    }

    /// Message suitable for showing to the user verbatim
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized(detail)
            | ApiError::Forbidden(detail)
            | ApiError::Validation(detail)
            | ApiError::Unsupported(detail) => detail.clone(),
            ApiError::Server { detail, .. } => detail.clone(),
            ApiError::NotAuthenticated => "You must be logged in".to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the server rejected the credential itself
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::NotAuthenticated)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Transport(err)
        }
    }
}

/// Type alias for Result with ApiError
pub type ApiResult<T> = Result<T, ApiError>;

/// Error raised while loading the client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration sources could not be read or merged
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    /// The API base URL is not an absolute http(s) URL
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),
}

/// Type alias for Result with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;
