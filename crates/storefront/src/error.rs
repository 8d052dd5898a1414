//! Unified error handling with Sentry integration.
//!
//! [`AppError`] gathers the subsystem errors for callers that drive several
//! stores at once (the CLI). Failures that point at the backend or the local
//! machine rather than at the user's input are reported to Sentry via
//! [`AppError::capture`].

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::AuthError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// REST API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Session operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Local storage could not be used.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Operation needs a signed-in (or admin) session.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl AppError {
    /// Whether this failure is worth an error report.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) => true,
            Self::Api(err) => matches!(err, ApiError::Decode { .. } | ApiError::Url(_))
                || err.status() >= 500,
            Self::Auth(AuthError::MissingToken) => true,
            Self::Auth(AuthError::Api { status, .. }) => *status >= 500,
            Self::Auth(_) | Self::NotFound(_) | Self::BadRequest(_) | Self::Unauthorized(_) => {
                false
            }
        }
    }

    /// Log the error and, if reportable, send it to Sentry.
    pub fn capture(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::debug!(error = %self, "Command error");
        }
    }

    /// Message for the person at the terminal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => err.user_message(),
            Self::Auth(err) => err.user_message(),
            Self::Storage(_) => "Local storage is unavailable".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("line", "3_-_-")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
