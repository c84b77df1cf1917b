//! Session lifecycle: restore on startup, login and logout.

use crate::api::AuthApi;
use crate::api::common::validate_payload;
use crate::auth::models::Credentials;
use crate::auth::session::SessionHandle;
use crate::auth::storage::{TOKEN_KEY, USER_KEY};
use crate::errors::{ClientError, ClientResult};
use crate::models::User;
use tracing::{debug, info, warn};

/// Drives the session through its lifecycle against the auth endpoints.
#[derive(Clone)]
pub struct SessionStore {
    api: AuthApi,
    session: SessionHandle,
}

impl SessionStore {
    pub fn new(api: AuthApi, session: SessionHandle) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Re-validates the persisted session against `GET /auth/me/`.
    ///
    /// Any failure leaves the session empty. Loading is marked finished
    /// exactly once, whatever the outcome.
    pub async fn restore(&self) {
        self.restore_persisted().await;
        if self.session.finish_loading() {
            debug!("Session restore finished");
        }
    }

    async fn restore_persisted(&self) {
        let storage = self.session.storage().clone();

        let token = match storage.get(TOKEN_KEY).await {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(error) => {
                warn!("Could not read persisted token: {}", error);
                None
            }
        };

        let Some(token) = token else {
            // a cached user without its token is useless
            if let Ok(Some(_)) = storage.get(USER_KEY).await {
                info!("Dropping cached user without a token");
                self.session.clear_local().await;
            }
            return;
        };

        match storage.get(USER_KEY).await {
            Ok(Some(raw)) => {
                if let Err(error) = serde_json::from_str::<User>(&raw) {
                    warn!("Ignoring unreadable cached user: {}", error);
                }
            }
            Ok(None) => {}
            Err(error) => warn!("Could not read cached user: {}", error),
        }

        self.session.adopt_token(token);
        match self.api.me().await {
            Ok(response) => match response.user {
                Some(user) => {
                    info!("Restored session for {}", user.username);
                    self.session.replace_user(user).await;
                }
                None => {
                    warn!("/auth/me/ answered without a user, clearing session");
                    self.session.clear_local().await;
                }
            },
            Err(error) => {
                info!("Persisted session is no longer valid: {}", error);
                self.session.clear_local().await;
            }
        }
    }

    /// Exchanges credentials for a token and profile and persists both.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<User> {
        validate_payload(credentials)?;

        let response = self.api.login(&credentials.to_request()).await?;
        let token = response
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::invalid_response("login response has no token"))?;
        let user = response
            .user
            .ok_or_else(|| ClientError::invalid_response("login response has no user"))?;

        self.session.establish(token, user.clone()).await;
        info!("Logged in as {}", user.username);
        Ok(user)
    }

    /// Best-effort server logout followed by an unconditional local clear.
    pub async fn logout(&self) {
        if self.session.token().is_some() {
            if let Err(error) = self.api.logout().await {
                warn!("Server logout failed, clearing locally anyway: {}", error);
            }
        }
        self.session.clear_local().await;
        info!("Logged out");
    }
}
