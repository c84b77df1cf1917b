//! Comment thread shown under a ticket.
//!
//! Newest first. Only technicians and admins pick a visibility.

use crate::api::common::validate_payload;
use crate::app::AppContext;
use crate::errors::{ClientError, summarize_fields};
use crate::models::{Comment, NewComment, Visibility};
use crate::views::{LoadState, MountGuard, field_messages};
use tracing::warn;

/// Comment thread under a ticket, newest first, plus the add-comment form.
pub struct CommentsSection {
    ctx: AppContext,
    guard: MountGuard,
    pub ticket_id: u64,
    pub state: LoadState,
    pub comments: Vec<Comment>,
    pub message: String,
    pub visibility: Visibility,
    pub saving: bool,
    pub deleting: Option<u64>,
    /// Local validation message for the form.
    pub form_error: Option<String>,
    /// Message for a failed request.
    pub error: Option<String>,
}

impl CommentsSection {
    pub fn new(ctx: &AppContext, ticket_id: u64) -> Self {
        Self {
            ctx: ctx.clone(),
            guard: MountGuard::new(),
            ticket_id,
            state: LoadState::Idle,
            comments: Vec::new(),
            message: String::new(),
            visibility: Visibility::Public,
            saving: false,
            deleting: None,
            form_error: None,
            error: None,
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    /// Only technicians and admins pick a visibility.
    pub fn can_choose_visibility(&self) -> bool {
        self.ctx.capabilities().can_post_internal_comments()
    }

    pub fn can_delete(&self) -> bool {
        self.ctx.capabilities().can_delete_comments()
    }

    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        self.error = None;

        let api = self.ctx.comments.clone();
        let ticket_id = self.ticket_id;
        let Some(result) = self.guard.guard(async move { api.list(ticket_id).await }).await else {
            return;
        };

        match result {
            Ok(mut comments) => {
                comments.sort_by(|left, right| {
                    right
                        .created_at
                        .cmp(&left.created_at)
                        .then_with(|| left.id.cmp(&right.id))
                });
                self.comments = comments;
                self.state = LoadState::Loaded;
            }
            Err(error) => {
                warn!("Failed to load comments for ticket #{}: {}", ticket_id, error);
                self.error = Some("Failed to load comments".to_string());
                self.state = LoadState::Failed;
            }
        }
    }

    pub async fn add(&mut self) {
        if self.saving {
            return;
        }
        self.form_error = None;
        self.error = None;

        let payload = NewComment {
            message: self.message.trim().to_string(),
            visibility: self.can_choose_visibility().then_some(self.visibility),
        };
        if let Err(error) = validate_payload(&payload) {
            self.form_error = Some(field_messages(error.field_errors()));
            return;
        }

        self.saving = true;
        let api = self.ctx.comments.clone();
        let ticket_id = self.ticket_id;
        let result = self
            .guard
            .guard(async move { api.create(ticket_id, &payload).await })
            .await;
        self.saving = false;
        let Some(result) = result else {
            return;
        };

        match result {
            Ok(comment) => {
                self.comments.insert(0, comment);
                self.message.clear();
                self.visibility = Visibility::Public;
            }
            Err(error) => {
                let message = match &error {
                    ClientError::Validation { fields } => {
                        format!("Validation error: {}", summarize_fields(fields))
                    }
                    ClientError::Forbidden { .. } => {
                        "You don't have permission to add comments".to_string()
                    }
                    _ => "Failed to add comment".to_string(),
                };
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
            }
        }
    }

    pub async fn delete(&mut self, comment_id: u64) {
        if self.deleting.is_some() {
            return;
        }
        self.error = None;
        self.deleting = Some(comment_id);

        let api = self.ctx.comments.clone();
        let result = self.guard.guard(async move { api.delete(comment_id).await }).await;
        self.deleting = None;
        let Some(result) = result else {
            return;
        };

        match result {
            Ok(()) => self.comments.retain(|comment| comment.id != comment_id),
            Err(ClientError::Forbidden { .. }) => {
                self.error = Some("Only admins can delete comments".to_string());
            }
            Err(error) => {
                warn!("Failed to delete comment #{}: {}", comment_id, error);
                self.error = Some("Failed to delete comment".to_string());
            }
        }
    }
}
