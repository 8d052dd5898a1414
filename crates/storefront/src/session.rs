//! Authenticated session store.
//!
//! The session moves through three states:
//!
//! ```text
//! Anonymous ──hydrate (token stored)──▶ Hydrating ──profile ok──▶ Authenticated
//!     ▲                                     │
//!     └──────────── 401 / logout ───────────┘
//! ```
//!
//! The bearer token lives in storage under [`keys::TOKEN`]; the API client
//! reads it from there on every request. Everything else (user, roles,
//! groups) is held in memory and rebuilt from `/auth/profile`.
//!
//! Operations return [`AuthError`] instead of panicking, and every failure
//! carries a message fit for showing next to a login form.

use std::sync::{Arc, PoisonError, RwLock};

use kasra_core::models::{Group, User};
use kasra_core::{Email, GroupId, validate_password};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::storage::{StorageBridge, keys};

/// Role names that grant back-office access.
const ADMIN_ROLES: [&str; 2] = ["admin", "administrator"];

// =============================================================================
// AuthError
// =============================================================================

/// Failure of a session operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Input rejected before any request was sent.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The backend rejected the email/password pair.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Login or registration succeeded without a token in the payload.
    #[error("no session token in response")]
    MissingToken,

    /// Any other non-2xx response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The backend could not be reached.
    #[error("network error")]
    Network,
}

impl AuthError {
    /// Message for display next to the form that triggered the failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Api { message, .. } => message.clone(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::MissingToken => "Sign-in did not complete, please try again".to_string(),
            Self::Network => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
        }
    }

    /// HTTP status behind the failure; `0` when nothing was received.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Api { status, .. } => *status,
            Self::InvalidCredentials => 401,
            Self::Validation(_) | Self::MissingToken | Self::Network => 0,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        if err.is_network() {
            return Self::Network;
        }
        Self::Api {
            status: err.status(),
            message: err.user_message(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Anonymous,
    /// A stored token is being checked against the profile endpoint.
    Hydrating,
    Authenticated,
}

/// Immutable snapshot of the current session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    /// Role names, in backend order.
    pub roles: Vec<String>,
    pub groups: Vec<Group>,
    pub state: SessionState,
}

impl Session {
    fn from_user(user: User) -> Self {
        let roles = user.role_names().map(String::from).collect();
        let groups = user.groups.clone();
        Self {
            user: Some(user),
            roles,
            groups,
            state: SessionState::Authenticated,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    /// True iff one of the roles is exactly `admin` or `administrator`.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|role| ADMIN_ROLES.contains(&role.as_str()))
    }

    /// Group ids for price resolution, in membership order.
    #[must_use]
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.groups
            .iter()
            .map(|g| g.id)
            .filter(|id| id.as_u32() > 0)
            .collect()
    }
}

// =============================================================================
// SessionStore
// =============================================================================

/// Process-wide session state. Cheaply cloneable; clones share one session.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionStoreInner>,
}

struct SessionStoreInner {
    api: ApiClient,
    storage: StorageBridge,
    session: RwLock<Arc<Session>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &self.session().state)
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an anonymous session. Call [`hydrate`](Self::hydrate) to pick up
    /// a stored token.
    #[must_use]
    pub fn new(api: ApiClient, storage: StorageBridge) -> Self {
        Self {
            inner: Arc::new(SessionStoreInner {
                api,
                storage,
                session: RwLock::new(Arc::new(Session::default())),
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn session(&self) -> Arc<Session> {
        let guard = self
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.session().user.clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.session().is_admin()
    }

    #[must_use]
    pub fn group_ids(&self) -> Vec<GroupId> {
        self.session().group_ids()
    }

    /// Whether a bearer token is stored, regardless of session state.
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.inner
            .storage
            .get_string(keys::TOKEN)
            .is_some_and(|t| !t.is_empty())
    }

    /// Advisory "remember me" flag. Nothing here acts on it.
    #[must_use]
    pub fn remember_me(&self) -> bool {
        self.inner
            .storage
            .get_string(keys::REMEMBER_ME)
            .is_some_and(|v| v == "true")
    }

    pub fn set_remember_me(&self, remember: bool) {
        if remember {
            self.inner.storage.set_string(keys::REMEMBER_ME, "true");
        } else {
            self.inner.storage.remove(keys::REMEMBER_ME);
        }
    }

    /// Restore the session from a stored token, if there is one.
    ///
    /// # Errors
    ///
    /// Returns the profile fetch failure; see
    /// [`refresh_profile`](Self::refresh_profile).
    #[instrument(skip(self))]
    pub async fn hydrate(&self) -> Result<(), AuthError> {
        if !self.has_token() {
            debug!("No stored token, staying anonymous");
            return Ok(());
        }
        self.update(|session| session.state = SessionState::Hydrating);
        self.refresh_profile().await
    }

    /// Sign in and load the profile.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for a malformed email or empty password
    /// - [`AuthError::InvalidCredentials`] when the backend answers 401
    /// - any error from the follow-up profile fetch
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), AuthError> {
        let email = Email::parse(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        if password.is_empty() {
            return Err(AuthError::Validation("password is required".to_string()));
        }

        let payload = self
            .inner
            .api
            .login(email.as_str(), password)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    AuthError::InvalidCredentials
                } else {
                    AuthError::from(e)
                }
            })?;

        let token = payload
            .token
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.start(&token).await
    }

    /// Create an account and sign in as it.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Validation`] for an empty username, a malformed email or
    ///   a password that breaks the account rules
    /// - [`AuthError::Api`] when the backend refuses the account (409 for a
    ///   taken email or username)
    /// - any error from the follow-up login or profile fetch
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::Validation("username is required".to_string()));
        }
        let email = Email::parse(email).map_err(|e| AuthError::Validation(e.to_string()))?;
        validate_password(password).map_err(|e| AuthError::Validation(e.to_string()))?;

        let payload = self
            .inner
            .api
            .register(username, email.as_str(), password)
            .await?;
        info!(username, "Account registered");

        match payload.token.filter(|t| !t.is_empty()) {
            Some(token) => self.start(&token).await,
            None => self.login(email.as_str(), password).await,
        }
    }

    /// Re-fetch the profile for the stored token.
    ///
    /// A 401 clears the token and resets the session. Any other failure keeps
    /// the previous user but marks the session as not authenticated. A profile
    /// that arrives after [`logout`](Self::logout) is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Network`] or [`AuthError::Api`] for the failed
    /// fetch, and [`AuthError::MissingToken`] when the token was removed while
    /// the request was in flight.
    #[instrument(skip(self))]
    pub async fn refresh_profile(&self) -> Result<(), AuthError> {
        match self.inner.api.get_profile().await {
            Ok(user) => {
                if !self.replace_if_signed_in(Session::from_user(user.clone())) {
                    debug!("Signed out while the profile was loading");
                    return Err(AuthError::MissingToken);
                }
                set_sentry_user(&user.id, Some(&user.email));
                debug!(user_id = %user.id, "Profile loaded");
                Ok(())
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Stored token rejected, signing out");
                self.logout();
                Err(AuthError::from(e))
            }
            Err(e) => {
                warn!(error = %e, "Profile refresh failed");
                self.update(|session| session.state = SessionState::Anonymous);
                Err(AuthError::from(e))
            }
        }
    }

    /// Forget the token and all session data. Always succeeds.
    pub fn logout(&self) {
        self.inner.storage.remove(keys::TOKEN);
        self.inner.storage.remove(keys::REMEMBER_ME);
        self.replace(Session::default());
        self.inner.api.invalidate_catalog();
        clear_sentry_user();
        add_breadcrumb("auth", "Signed out", None);
        debug!("Session cleared");
    }

    /// Store a fresh token and load the profile behind it.
    async fn start(&self, token: &str) -> Result<(), AuthError> {
        self.inner.storage.set_string(keys::TOKEN, token);
        // Catalog prices depend on the caller's groups.
        self.inner.api.invalidate_catalog();
        add_breadcrumb("auth", "Signed in", None);
        self.refresh_profile().await
    }

    fn replace(&self, session: Session) {
        let mut guard = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(session);
    }

    /// Publish `session` unless the token was removed in the meantime.
    fn replace_if_signed_in(&self, session: Session) -> bool {
        let mut guard = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        if !self.has_token() {
            return false;
        }
        *guard = Arc::new(session);
        true
    }

    fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut Session),
    {
        let mut guard = self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = Session::clone(&guard);
        change(&mut next);
        *guard = Arc::new(next);
    }
}
