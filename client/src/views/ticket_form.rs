//! New-ticket form: trimmed payload, local validation, then `POST /tickets/`.

use crate::api::CategoryNames;
use crate::api::common::validate_payload;
use crate::app::AppContext;
use crate::errors::{ClientError, ClientResult, FieldError};
use crate::models::{NewTicket, Priority};
use crate::ui::router::View;
use crate::views::{MountGuard, describe, field_messages};
use chrono::{NaiveDate, Utc};
use tracing::{info, warn};

/// New-ticket form.
pub struct TicketFormView {
    ctx: AppContext,
    guard: MountGuard,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category: Option<u64>,
    pub due_date: Option<NaiveDate>,
    pub categories: CategoryNames,
    pub field_errors: Vec<FieldError>,
    pub error: Option<String>,
    pub submitting: bool,
}

impl TicketFormView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            ctx: ctx.clone(),
            guard: MountGuard::new(),
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
            category: None,
            due_date: None,
            categories: CategoryNames::new(),
            field_errors: Vec::new(),
            error: None,
            submitting: false,
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    /// Category picker options. A failure leaves the picker empty.
    pub async fn load_categories(&mut self) {
        let api = self.ctx.categories.clone();
        if let Some(result) = self.guard.guard(async move { api.list().await }).await {
            match result {
                Ok(categories) => self.categories = categories,
                Err(error) => warn!("Failed to load categories: {}", error),
            }
        }
    }

    /// Trimmed payload, validated as of `today`.
    pub fn payload_as_of(&self, today: NaiveDate) -> ClientResult<NewTicket> {
        let payload = NewTicket {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
            category: self.category,
            due_date: self.due_date,
        };

        let mut fields = match validate_payload(&payload) {
            Ok(()) => Vec::new(),
            Err(error) => error.field_errors().to_vec(),
        };
        if payload.due_date.is_some_and(|due| due < today) {
            fields.push(FieldError::new("due_date", "Due date cannot be in the past"));
        }
        if fields.is_empty() {
            Ok(payload)
        } else {
            Err(ClientError::validation_fields(fields))
        }
    }

    /// Creates the ticket; returns where to navigate on success.
    pub async fn submit(&mut self) -> Option<String> {
        if self.submitting {
            return None;
        }
        self.error = None;
        self.field_errors.clear();

        let payload = match self.payload_as_of(Utc::now().date_naive()) {
            Ok(payload) => payload,
            Err(error) => {
                let message = field_messages(error.field_errors());
                self.field_errors = error.field_errors().to_vec();
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
                return None;
            }
        };

        self.submitting = true;
        let api = self.ctx.tickets.clone();
        let result = self
            .guard
            .guard(async move { api.create(&payload).await })
            .await;
        self.submitting = false;
        let result = result?;

        match result {
            Ok(ticket) => {
                info!("Created ticket #{}", ticket.id);
                self.ctx
                    .flash
                    .success(format!("Ticket created (#{})", ticket.id));
                Some(View::TicketDetail(ticket.id).path())
            }
            Err(error) => {
                self.field_errors = error.field_errors().to_vec();
                let message = format!("Failed to create ticket: {}", describe(&error));
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
    use std::time::Duration;

    fn ctx_for(backend: &MockBackend) -> AppContext {
        AppContext::with_storage(backend.config(), Arc::new(MemoryStorage::new())).unwrap()
    }

    #[tokio::test]
    async fn test_short_title_rejected_before_network() {
        let backend = MockBackend::start().await;
        let mut form = TicketFormView::new(&ctx_for(&backend));
        form.title = "Hi".to_string();
        form.description = "The office printer is jammed again".to_string();

        assert_eq!(form.submit().await, None);
        assert_eq!(backend.request_count(), 0);
        assert_eq!(form.field_errors[0].field, "title");
        assert_eq!(form.error.as_deref(), Some("Title must be between 5-200 characters"));
    }

    #[tokio::test]
    async fn test_past_due_date_and_trimming() {
        let backend = MockBackend::start().await;
        let mut form = TicketFormView::new(&ctx_for(&backend));
        form.title = "   Printer jammed   ".to_string();
        form.description = "  Paper stuck in tray 2  ".to_string();
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();

        form.due_date = NaiveDate::from_ymd_opt(2025, 3, 9);
        let error = form.payload_as_of(today).unwrap_err();
        assert_eq!(error.field_errors()[0].field, "due_date");

        form.due_date = Some(today);
        let payload = form.payload_as_of(today).unwrap();
        assert_eq!(payload.title, "Printer jammed");
        assert_eq!(payload.priority, Priority::Medium);

        form.title = format!("  {}  ", "x".repeat(201));
        assert!(form.payload_as_of(today).is_err());
    }

    #[tokio::test]
    async fn test_created_ticket_navigates_to_detail() {
        let backend = MockBackend::start().await;
        backend.respond(
            "POST",
            "/api/tickets/",
            201,
            json!({"id": 17, "title": "Printer jammed", "status": "OPEN", "priority": "HIGH"}),
        );
        let ctx = ctx_for(&backend);
        let mut form = TicketFormView::new(&ctx);
        form.title = "Printer jammed".to_string();
        form.description = "Paper stuck in tray 2".to_string();
        form.priority = Priority::High;

        assert_eq!(form.submit().await.as_deref(), Some("/tickets/17"));
        assert_eq!(ctx.flash.current().unwrap().text, "Ticket created (#17)");
        assert_eq!(
            backend.requests()[0].body,
            json!({"title": "Printer jammed", "description": "Paper stuck in tray 2", "priority": "HIGH"})
        );
    }

    #[tokio::test]
    async fn test_server_rejection_keeps_values() {
        let backend = MockBackend::start().await;
        backend.respond("POST", "/api/tickets/", 400, json!({"category": ["Invalid pk."]}));
        let mut form = TicketFormView::new(&ctx_for(&backend));
        form.title = "Printer jammed".to_string();
        form.description = "Paper stuck in tray 2".to_string();
        form.category = Some(99);

        assert_eq!(form.submit().await, None);
        assert_eq!(form.title, "Printer jammed");
        assert_eq!(form.field_errors[0].field, "category");
        assert_eq!(
            form.error.as_deref(),
            Some("Failed to create ticket: category: Invalid pk.")
        );
    }

    #[tokio::test]
    async fn test_server_rejection_names_each_field() {
        let backend = MockBackend::start().await;
        backend.respond(
            "POST",
            "/api/tickets/",
            400,
            json!({"category": ["Invalid pk."], "due_date": ["Due date cannot be in the past."]}),
        );
        let ctx = ctx_for(&backend);
        let mut form = TicketFormView::new(&ctx);
        form.title = "Printer jammed".to_string();
        form.description = "Paper stuck in tray 2".to_string();

        assert_eq!(form.submit().await, None);
        let expected =
            "Failed to create ticket: category: Invalid pk.; due_date: Due date cannot be in the past.";
        assert_eq!(form.error.as_deref(), Some(expected));
        assert_eq!(ctx.flash.current().unwrap().text, expected);
        assert!(!form.submitting);
    }

    #[tokio::test]
    async fn test_unmount_mid_submit_clears_flag() {
        let backend = MockBackend::start().await;
        backend.respond_after(
            Duration::from_millis(200),
            "POST",
            "/api/tickets/",
            201,
            json!({"id": 17, "title": "Printer jammed", "status": "OPEN", "priority": "HIGH"}),
        );
        let ctx = ctx_for(&backend);
        let mut form = TicketFormView::new(&ctx);
        form.title = "Printer jammed".to_string();
        form.description = "Paper stuck in tray 2".to_string();
        let guard = form.guard().clone();

        let (target, ()) = tokio::join!(form.submit(), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            guard.unmount();
        });

        assert_eq!(target, None);
        assert!(!form.submitting);
        assert!(ctx.flash.current().is_none());
    }
}
