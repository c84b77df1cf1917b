//! The explicitly constructed application context.
//!
//! Owns the session, the flash store, the router and one instance of every
//! resource client. Views receive a reference and clone what they need; all
//! clones share the same session and flash slot.

use crate::api::{
    AuthApi, CategoriesApi, CommentsApi, HealthApi, HttpClient, TicketsApi, UsersApi,
};
use crate::auth::{Capabilities, FileStorage, SessionHandle, SessionStorage, SessionStore};
use crate::config::Config;
use crate::errors::ClientResult;
use crate::ui::{FlashStore, Navigation, Router};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: SessionHandle,
    pub session_store: SessionStore,
    pub flash: FlashStore,
    pub router: Router,
    pub http: HttpClient,
    pub tickets: TicketsApi,
    pub comments: CommentsApi,
    pub categories: CategoriesApi,
    pub users: UsersApi,
    pub health: HealthApi,
}

impl AppContext {
    /// Context persisting the session in the configured session file.
    pub fn new(config: Config) -> ClientResult<Self> {
        let storage = Arc::new(FileStorage::new(config.session_file.clone()));
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: Config, storage: Arc<dyn SessionStorage>) -> ClientResult<Self> {
        let session = SessionHandle::new(storage);
        let http = HttpClient::new(&config, session.clone())?;
        let session_store = SessionStore::new(AuthApi::new(http.clone()), session.clone());

        Ok(Self {
            flash: FlashStore::new(config.flash_timeout()),
            router: Router::new(),
            tickets: TicketsApi::new(http.clone()),
            comments: CommentsApi::new(http.clone()),
            categories: CategoriesApi::new(http.clone()),
            users: UsersApi::new(http.clone()),
            health: HealthApi::new(http.clone()),
            config,
            session,
            session_store,
            http,
        })
    }

    /// Restores the persisted session. Routing is `Pending` until this returns.
    pub async fn start(&self) {
        info!("Starting help-desk client against {}", self.config.api_root());
        self.session_store.restore().await;
    }

    /// Drops transient UI state. The persisted session is left alone.
    pub fn shutdown(&self) {
        self.flash.clear();
        info!("Help-desk client stopped");
    }

    pub fn capabilities(&self) -> Capabilities {
        Capabilities::for_user(self.session.user().as_ref())
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        self.router.resolve(path, &self.session.snapshot())
    }
}
