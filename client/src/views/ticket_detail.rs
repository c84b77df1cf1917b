//! Ticket detail screen and its status/assignee draft.
//!
//! The draft holds the status and assignee the user is editing; the last
//! saved ticket is what the server last returned. Saving sends at most two
//! requests, status first, then assignment, each only when that field changed.

use crate::api::TicketsApi;
use crate::app::AppContext;
use crate::errors::{ClientError, ClientResult};
use crate::models::{Ticket, TicketStatus, UserBrief};
use crate::ui::router::TICKETS_PATH;
use crate::utils::format::{format_user_brief, format_user_id};
use crate::views::{CommentsSection, LoadState, MountGuard, describe};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftState {
    Clean,
    Dirty,
    Saving,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketDraft {
    pub status: TicketStatus,
    pub assigned_to: Option<u64>,
}

impl From<&Ticket> for TicketDraft {
    fn from(ticket: &Ticket) -> Self {
        Self {
            status: ticket.status,
            assigned_to: ticket.assigned_to,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TicketEditor {
    saved: Ticket,
    draft: TicketDraft,
    saving: bool,
}

impl TicketEditor {
    pub fn new(ticket: Ticket) -> Self {
        Self {
            draft: TicketDraft::from(&ticket),
            saved: ticket,
            saving: false,
        }
    }

    pub fn saved(&self) -> &Ticket {
        &self.saved
    }

    pub fn draft(&self) -> &TicketDraft {
        &self.draft
    }

    pub fn state(&self) -> DraftState {
        if self.saving {
            DraftState::Saving
        } else if self.is_dirty() {
            DraftState::Dirty
        } else {
            DraftState::Clean
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != TicketDraft::from(&self.saved)
    }

    pub fn can_save(&self) -> bool {
        !self.saving && self.is_dirty()
    }

    pub fn set_status(&mut self, status: TicketStatus) {
        self.draft.status = status;
    }

    pub fn set_assignee(&mut self, assignee: Option<u64>) {
        self.draft.assigned_to = assignee;
    }

    /// Back to the last saved values.
    pub fn cancel(&mut self) {
        if !self.saving {
            self.draft = TicketDraft::from(&self.saved);
        }
    }

    /// Marks the editor as saving and returns the requests to send.
    ///
    /// `None` when nothing changed or a save is already running.
    pub fn begin_save(&mut self) -> Option<SavePlan> {
        if !self.can_save() {
            return None;
        }
        self.saving = true;
        Some(SavePlan {
            id: self.saved.id,
            status: (self.draft.status != self.saved.status).then_some(self.draft.status),
            assignee: (self.draft.assigned_to != self.saved.assigned_to)
                .then_some(self.draft.assigned_to),
        })
    }

    /// Applies what a [`SavePlan`] produced and leaves the saving state.
    ///
    /// A ticket returned by the status step is adopted even when the
    /// assignment step failed; the draft then keeps the unsaved assignee.
    pub fn finish_save(&mut self, outcome: SaveOutcome) -> ClientResult<()> {
        self.saving = false;
        if let Some(ticket) = outcome.saved {
            self.saved = ticket;
        }
        outcome.result?;
        self.draft = TicketDraft::from(&self.saved);
        Ok(())
    }

    /// Abandons a save whose requests will never be finished.
    pub fn abort_save(&mut self) {
        self.saving = false;
    }

    /// Sends the changed fields. `Ok(false)` means there was nothing to send.
    ///
    /// Dropping the returned future mid-request leaves the editor dirty.
    pub async fn save(&mut self, api: &TicketsApi) -> ClientResult<bool> {
        let Some(plan) = self.begin_save() else {
            return Ok(false);
        };
        let pending = PendingSave { editor: self };
        let outcome = plan.send(api).await;
        pending.finish(outcome).map(|()| true)
    }
}

/// Requests one save will make, status first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePlan {
    pub id: u64,
    pub status: Option<TicketStatus>,
    pub assignee: Option<Option<u64>>,
}

#[derive(Debug)]
pub struct SaveOutcome {
    /// Last ticket the server returned during this save.
    pub saved: Option<Ticket>,
    pub result: ClientResult<()>,
}

impl SavePlan {
    pub async fn send(self, api: &TicketsApi) -> SaveOutcome {
        let mut saved = None;
        if let Some(status) = self.status {
            match api.update_status(self.id, status).await {
                Ok(ticket) => saved = Some(ticket),
                Err(error) => return SaveOutcome { saved, result: Err(error) },
            }
        }
        if let Some(assignee) = self.assignee {
            match api.assign(self.id, assignee).await {
                Ok(ticket) => saved = Some(ticket),
                Err(error) => return SaveOutcome { saved, result: Err(error) },
            }
        }
        SaveOutcome { saved, result: Ok(()) }
    }
}

/// Clears the saving flag if the save future is dropped before finishing.
struct PendingSave<'a> {
    editor: &'a mut TicketEditor,
}

impl PendingSave<'_> {
    fn finish(self, outcome: SaveOutcome) -> ClientResult<()> {
        self.editor.finish_save(outcome)
    }
}

impl Drop for PendingSave<'_> {
    fn drop(&mut self) {
        if self.editor.saving {
            self.editor.abort_save();
        }
    }
}

pub struct TicketDetailView {
    ctx: AppContext,
    guard: MountGuard,
    pub id: u64,
    pub state: LoadState,
    pub error: Option<String>,
    pub editor: Option<TicketEditor>,
    pub technicians: Vec<UserBrief>,
    pub comments: CommentsSection,
    pub deleting: bool,
}

impl TicketDetailView {
    pub fn new(ctx: &AppContext, id: u64) -> Self {
        Self {
            ctx: ctx.clone(),
            guard: MountGuard::new(),
            id,
            state: LoadState::Idle,
            error: None,
            editor: None,
            technicians: Vec::new(),
            comments: CommentsSection::new(ctx, id),
            deleting: false,
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    pub fn unmount(&self) {
        self.guard.unmount();
        self.comments.guard().unmount();
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.editor.as_ref().map(TicketEditor::saved)
    }

    pub fn status_label(&self) -> Option<&'static str> {
        self.ticket().map(|ticket| ticket.status.label())
    }

    pub fn assignee_label(&self) -> String {
        match self.ticket() {
            Some(ticket) => match &ticket.assigned_to_user {
                Some(user) => format_user_brief(Some(user)),
                None => format_user_id(ticket.assigned_to, &self.technicians),
            },
            None => "Unassigned".to_string(),
        }
    }

    pub fn draft_state(&self) -> Option<DraftState> {
        self.editor.as_ref().map(TicketEditor::state)
    }

    pub fn can_save(&self) -> bool {
        self.editor.as_ref().is_some_and(TicketEditor::can_save)
    }

    pub fn can_change_status(&self) -> bool {
        self.ticket()
            .is_some_and(|ticket| self.ctx.capabilities().can_change_status(ticket))
    }

    pub fn can_assign(&self) -> bool {
        self.ticket()
            .is_some_and(|ticket| self.ctx.capabilities().can_assign_any(ticket))
    }

    pub fn can_delete(&self) -> bool {
        self.ctx.capabilities().can_delete_tickets()
    }

    /// Loads the ticket, then the assignable users and the comments.
    pub async fn load(&mut self) {
        self.state = LoadState::Loading;
        self.error = None;

        let api = self.ctx.tickets.clone();
        let id = self.id;
        let Some(result) = self.guard.guard(async move { api.get(id).await }).await else {
            return;
        };

        let ticket = match result {
            Ok(ticket) => ticket,
            Err(error) => {
                let message = if error.is_not_found() {
                    "Ticket not found".to_string()
                } else {
                    format!("Failed to load ticket: {}", describe(&error))
                };
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
                self.state = LoadState::Failed;
                return;
            }
        };

        let load_technicians = self.ctx.capabilities().can_assign_any(&ticket);
        self.editor = Some(TicketEditor::new(ticket));
        self.state = LoadState::Loaded;

        if load_technicians {
            let users = self.ctx.users.clone();
            if let Some(result) = self.guard.guard(async move { users.technicians().await }).await {
                match result {
                    Ok(technicians) => self.technicians = technicians,
                    Err(error) => warn!("Failed to load technicians: {}", error),
                }
            }
        }

        self.comments.load().await;
    }

    pub fn set_status(&mut self, status: TicketStatus) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_status(status);
        }
    }

    pub fn set_assignee(&mut self, assignee: Option<u64>) {
        if let Some(editor) = self.editor.as_mut() {
            editor.set_assignee(assignee);
        }
    }

    pub fn cancel(&mut self) {
        if let Some(editor) = self.editor.as_mut() {
            editor.cancel();
        }
    }

    pub async fn save(&mut self) {
        let Some(editor) = self.editor.as_mut() else {
            return;
        };
        if !editor.can_save() {
            return;
        }
        self.error = None;

        let result = editor.save(&self.ctx.tickets).await;
        if !self.guard.is_mounted() {
            return;
        }
        match result {
            Ok(true) => {
                info!("Ticket #{} updated", self.id);
                self.ctx.flash.success("Ticket updated");
            }
            Ok(false) => {}
            Err(error) => {
                let message = format!("Failed to update ticket: {}", describe(&error));
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
            }
        }
    }

    /// Deletes the ticket; returns where to navigate on success.
    pub async fn delete(&mut self) -> Option<String> {
        if self.deleting {
            return None;
        }
        if !self.can_delete() {
            let message = "Only admins can delete tickets".to_string();
            self.ctx.flash.error(message.clone());
            self.error = Some(message);
            return None;
        }

        self.deleting = true;
        self.error = None;
        let api = self.ctx.tickets.clone();
        let id = self.id;
        let result = self.guard.guard(async move { api.delete(id).await }).await;
        self.deleting = false;
        let result = result?;

        match result {
            Ok(()) => {
                info!("Ticket #{} deleted", id);
                self.ctx.flash.success("Ticket deleted");
                Some(TICKETS_PATH.to_string())
            }
            Err(error) => {
                let message = match &error {
                    ClientError::Forbidden { .. } => "Only admins can delete tickets".to_string(),
                    other => format!("Failed to delete ticket: {}", describe(other)),
                };
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
                None
            }
        }
    }
}
