//! In-memory session state shared by every component.
//!
//! [`SessionHandle`] is the only writer of the token. The HTTP client reads it
//! at call time, the router and the CLI observe changes through [`SessionHandle::subscribe`].

use crate::auth::roles::resolve_role;
use crate::auth::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use crate::models::{Role, User};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<User>,
    /// True until the startup restore has finished.
    pub loading: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            token: None,
            user: None,
            loading: true,
        }
    }
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        resolve_role(self.user.as_ref())
    }
}

struct SessionInner {
    state: watch::Sender<Session>,
    storage: Arc<dyn SessionStorage>,
}

#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<SessionInner>,
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.inner.state.borrow();
        f.debug_struct("SessionHandle")
            .field("authenticated", &session.is_authenticated())
            .field("loading", &session.loading)
            .finish()
    }
}

impl SessionHandle {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let (state, _) = watch::channel(Session::default());
        Self {
            inner: Arc::new(SessionInner { state, storage }),
        }
    }

    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.inner.storage
    }

    pub fn snapshot(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.inner.state.borrow().token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.inner.state.borrow().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.inner.state.borrow().role()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.borrow().loading
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Attaches a token in memory only, so the next request carries it.
    pub fn adopt_token(&self, token: impl Into<String>) {
        let token = token.into();
        self.inner.state.send_modify(|session| session.token = Some(token));
    }

    /// Stores a fresh token/user pair in memory and in persisted storage.
    pub async fn establish(&self, token: String, user: User) {
        self.persist(TOKEN_KEY, &token).await;
        self.persist_user(&user).await;
        self.inner.state.send_modify(|session| {
            session.token = Some(token);
            session.user = Some(user);
        });
    }

    /// Replaces the cached profile, keeping the current token.
    pub async fn replace_user(&self, user: User) {
        self.persist_user(&user).await;
        self.inner
            .state
            .send_modify(|session| session.user = Some(user));
    }

    /// Drops token and user from memory and from persisted storage.
    pub async fn clear_local(&self) {
        self.inner.state.send_if_modified(|session| {
            let changed = session.token.is_some() || session.user.is_some();
            session.token = None;
            session.user = None;
            changed
        });
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(error) = self.inner.storage.remove(key).await {
                warn!("Failed to remove {} from session storage: {}", key, error);
            }
        }
    }

    /// Marks the startup restore as done. Returns false when it already was.
    pub fn finish_loading(&self) -> bool {
        self.inner.state.send_if_modified(|session| {
            if !session.loading {
                return false;
            }
            session.loading = false;
            true
        })
    }

    async fn persist_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.persist(USER_KEY, &json).await,
            Err(error) => warn!("Failed to serialize user {}: {}", user.id, error),
        }
    }

    async fn persist(&self, key: &str, value: &str) {
        match self.inner.storage.set(key, value).await {
            Ok(()) => debug!("Persisted {}", key),
            Err(error) => warn!("Failed to persist {}: {}", key, error),
        }
    }
}
