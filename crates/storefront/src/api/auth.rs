//! Authentication endpoints.

use kasra_core::models::User;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

/// Payload of a successful login or registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthPayload {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

impl ApiClient {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ApiError> {
        self.post("/auth/login", &LoginRequest { email, password })
            .await
    }

    /// Create an account. The backend normally logs the new user in too.
    ///
    /// # Errors
    ///
    /// Returns an error if the account cannot be created or the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthPayload, ApiError> {
        self.post(
            "/auth/register",
            &RegisterRequest {
                username,
                email,
                password,
            },
        )
        .await
    }

    /// Fetch the user the stored token belongs to, with roles and groups.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self))]
    pub async fn get_profile(&self) -> Result<User, ApiError> {
        self.get("/auth/profile").await
    }
}
