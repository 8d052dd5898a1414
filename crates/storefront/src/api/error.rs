//! Typed failures of the REST client.

use thiserror::Error;

/// Fallback message when a failed response carries no usable text.
pub const DEFAULT_ERROR_MESSAGE: &str = "Request failed";

/// Errors returned by [`ApiClient`](super::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// No response was received (connection refused, DNS, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A success response whose body did not have the expected shape.
    #[error("Invalid response (HTTP {status}): {message}")]
    Decode { status: u16, message: String },

    /// The endpoint path could not be joined onto the base URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status code, or `0` when no response was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Status { status, .. } | Self::Decode { status, .. } => *status,
            Self::Network(_) | Self::Url(_) => 0,
        }
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        self.status() == 401
    }

    /// Whether no response was received.
    #[must_use]
    pub const fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Message suitable for showing to a shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Network(_) => "Network error, please check your connection".to_string(),
            Self::Decode { .. } | Self::Url(_) => "Unexpected response from server".to_string(),
        }
    }
}
