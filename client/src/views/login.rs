use crate::api::common::validate_payload;
use crate::app::AppContext;
use crate::auth::Credentials;
use crate::errors::ClientError;
use crate::ui::router::TICKETS_PATH;
use crate::views::{MountGuard, describe, field_messages};

/// Login form state.
pub struct LoginView {
    ctx: AppContext,
    guard: MountGuard,
    pub identifier: String,
    pub password: String,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            ctx: ctx.clone(),
            guard: MountGuard::new(),
            identifier: String::new(),
            password: String::new(),
            error: None,
            submitting: false,
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    /// Logs in; returns where to navigate on success.
    pub async fn submit(&mut self) -> Option<String> {
        if self.submitting {
            return None;
        }
        self.error = None;

        let credentials = Credentials::new(&self.identifier, self.password.clone());
        if let Err(error) = validate_payload(&credentials) {
            let message = field_messages(error.field_errors());
            self.ctx.flash.error(message.clone());
            self.error = Some(message);
            return None;
        }

        self.submitting = true;
        let store = self.ctx.session_store.clone();
        let result = self.guard.guard(async move { store.login(&credentials).await }).await;
        self.submitting = false;
        let result = result?;

        match result {
            Ok(user) => {
                self.password.clear();
                self.ctx
                    .flash
                    .success(format!("Logged in as {}", user.username));
                Some(TICKETS_PATH.to_string())
            }
            Err(error) => {
                let message = match &error {
                    ClientError::Validation { fields } if fields.is_empty() => {
                        "Invalid credentials".to_string()
                    }
                    other => describe(other),
                };
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::test_support::MockBackend;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_empty_form_never_hits_network() {
        let backend = MockBackend::start().await;
        let ctx = AppContext::with_storage(backend.config(), Arc::new(MemoryStorage::new())).unwrap();
        let mut view = LoginView::new(&ctx);

        assert_eq!(view.submit().await, None);
        assert_eq!(
            view.error.as_deref(),
            Some("Username or email is required; Password is required")
        );
        assert_eq!(backend.request_count(), 0);
        assert!(!view.submitting);
    }

    #[tokio::test]
    async fn test_success_flashes_and_targets_tickets() {
        let backend = MockBackend::start().await;
        backend.respond(
            "POST",
            "/api/auth/login/",
            200,
            json!({"token": "t1", "user": {"id": 1, "username": "alice", "role": "ADMIN"}}),
        );
        let ctx = AppContext::with_storage(backend.config(), Arc::new(MemoryStorage::new())).unwrap();
        let mut view = LoginView::new(&ctx);
        view.identifier = "alice".to_string();
        view.password = "x".to_string();

        assert_eq!(view.submit().await.as_deref(), Some("/tickets"));
        assert!(ctx.session.is_authenticated());
        assert_eq!(ctx.flash.current().unwrap().text, "Logged in as alice");
        assert!(view.password.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_credentials_show_server_message() {
        let backend = MockBackend::start().await;
        backend.respond(
            "POST",
            "/api/auth/login/",
            400,
            json!({"detail": "Invalid credentials."}),
        );
        let ctx = AppContext::with_storage(backend.config(), Arc::new(MemoryStorage::new())).unwrap();
        let mut view = LoginView::new(&ctx);
        view.identifier = "alice@example.com".to_string();
        view.password = "wrong".to_string();

        assert_eq!(view.submit().await, None);
        assert_eq!(view.error.as_deref(), Some("Invalid credentials."));
        assert_eq!(
            backend.requests()[0].body,
            json!({"email": "alice@example.com", "password": "wrong"})
        );
    }
}
