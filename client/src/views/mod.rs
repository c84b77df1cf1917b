//! Headless view-models, one per screen.
//!
//! A view holds the local state a screen would (loading flag, inline error,
//! draft values) and talks to the resource clients through the
//! [`AppContext`](crate::app::AppContext). Errors are caught at the view
//! boundary: they become an inline message plus an error flash and the prior
//! state is kept.

pub mod comments;
pub mod login;
pub mod ticket_detail;
pub mod ticket_form;
pub mod ticket_list;
pub mod user_panel;

use crate::errors::{ClientError, FieldError, summarize_fields};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

pub use comments::CommentsSection;
pub use login::LoginView;
pub use ticket_detail::{DraftState, SaveOutcome, SavePlan, TicketDetailView, TicketEditor};
pub use ticket_form::TicketFormView;
pub use ticket_list::TicketListView;
pub use user_panel::UserPanelView;

/// Shared "still on screen" flag.
///
/// Clones observe the same flag, so a task started by a view can tell whether
/// the view is still there when its response arrives.
#[derive(Debug, Clone)]
pub struct MountGuard {
    mounted: Arc<AtomicBool>,
}

impl Default for MountGuard {
    fn default() -> Self {
        Self {
            mounted: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl MountGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    /// Awaits `future`; the output is dropped if the view went away meanwhile.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        let output = future.await;
        self.is_mounted().then_some(output)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Field messages without field names, for hints next to a local form.
pub(crate) fn field_messages(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(|field| field.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Inline text for an error a view could not handle more specifically.
pub(crate) fn describe(error: &ClientError) -> String {
    match error {
        ClientError::Validation { fields } => summarize_fields(fields),
        ClientError::Unauthorized => "Your session has expired, please log in again".to_string(),
        ClientError::Forbidden { message } => message.clone(),
        ClientError::NotFound { .. } => "Not found".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_guard_drops_output_after_unmount() {
        let guard = MountGuard::new();
        assert_eq!(guard.guard(async { 1 }).await, Some(1));

        let watcher = guard.clone();
        guard.unmount();
        assert!(!watcher.is_mounted());
        assert_eq!(watcher.guard(async { 2 }).await, None);
    }

    #[test]
    fn test_describe_validation_names_fields() {
        let error = ClientError::validation_fields(vec![
            FieldError::new("", "Invalid data"),
            FieldError::new("category", "Invalid pk."),
        ]);
        assert_eq!(describe(&error), "Invalid data; category: Invalid pk.");
        assert_eq!(field_messages(error.field_errors()), "Invalid data; Invalid pk.");
        assert_eq!(describe(&ClientError::validation_fields(vec![])), "Invalid data");
    }
}
