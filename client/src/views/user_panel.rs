use crate::api::common::validate_payload;
use crate::app::AppContext;
use crate::auth::resolve_role;
use crate::models::{NewUser, Role, User, UserPatch};
use crate::views::{LoadState, MountGuard, field_messages};
use tracing::{info, warn};

/// A row of the admin user table with its unsaved-edits flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub user: User,
    pub dirty: bool,
}

impl UserRow {
    fn clean(user: User) -> Self {
        Self { user, dirty: false }
    }

    pub fn role(&self) -> Role {
        resolve_role(Some(&self.user)).unwrap_or(Role::User)
    }
}

/// Account summary for everyone, user administration for admins.
pub struct UserPanelView {
    ctx: AppContext,
    guard: MountGuard,
    pub state: LoadState,
    pub rows: Vec<UserRow>,
    pub error: Option<String>,
    pub create_error: Option<String>,
}

impl UserPanelView {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            ctx: ctx.clone(),
            guard: MountGuard::new(),
            state: LoadState::Idle,
            rows: Vec::new(),
            error: None,
            create_error: None,
        }
    }

    pub fn guard(&self) -> &MountGuard {
        &self.guard
    }

    pub fn account(&self) -> Option<User> {
        self.ctx.session.user()
    }

    pub fn role(&self) -> Option<Role> {
        self.ctx.session.role()
    }

    pub fn is_admin(&self) -> bool {
        self.ctx.capabilities().can_manage_users()
    }

    /// Loads the user table. Non-admins never issue the request.
    pub async fn load(&mut self) {
        if !self.is_admin() {
            return;
        }
        self.state = LoadState::Loading;
        self.error = None;

        let api = self.ctx.users.clone();
        let Some(result) = self.guard.guard(async move { api.list().await }).await else {
            return;
        };
        match result {
            Ok(users) => {
                self.rows = users.into_iter().map(UserRow::clean).collect();
                self.state = LoadState::Loaded;
            }
            Err(error) => {
                warn!("Failed to load users: {}", error);
                self.error =
                    Some("Unable to load users. Make sure you are logged in as ADMIN.".to_string());
                self.state = LoadState::Failed;
            }
        }
    }

    fn row_mut(&mut self, id: u64) -> Option<&mut UserRow> {
        self.rows.iter_mut().find(|row| row.user.id == id)
    }

    pub fn set_role(&mut self, id: u64, role: Role) {
        if let Some(row) = self.row_mut(id) {
            row.user.role = Some(role);
            row.dirty = true;
        }
    }

    pub fn set_active(&mut self, id: u64, is_active: bool) {
        if let Some(row) = self.row_mut(id) {
            row.user.is_active = is_active;
            row.dirty = true;
        }
    }

    pub fn can_save(&self, id: u64) -> bool {
        self.rows.iter().any(|row| row.user.id == id && row.dirty)
    }

    pub async fn save(&mut self, id: u64) {
        let Some(row) = self.rows.iter().find(|row| row.user.id == id && row.dirty) else {
            return;
        };
        let patch = UserPatch {
            role: row.role(),
            is_active: row.user.is_active,
        };
        let username = row.user.username.clone();
        self.error = None;

        let api = self.ctx.users.clone();
        let Some(result) = self.guard.guard(async move { api.update(id, &patch).await }).await
        else {
            return;
        };
        match result {
            Ok(updated) => {
                if let Some(row) = self.row_mut(id) {
                    *row = UserRow::clean(updated);
                }
                self.ctx
                    .flash
                    .success(format!("Saved changes for {username}"));
            }
            Err(error) => {
                warn!("Failed to update user #{}: {}", id, error);
                let message = "Failed to save user changes.".to_string();
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
            }
        }
    }

    pub async fn create(&mut self, new_user: NewUser) -> bool {
        self.create_error = None;
        let new_user = NewUser {
            username: new_user.username.trim().to_string(),
            email: new_user.email.trim().to_string(),
            ..new_user
        };
        if let Err(error) = validate_payload(&new_user) {
            self.create_error = Some(field_messages(error.field_errors()));
            return false;
        }

        let api = self.ctx.users.clone();
        let Some(result) = self
            .guard
            .guard(async move { api.create(&new_user).await })
            .await
        else {
            return false;
        };
        match result {
            Ok(created) => {
                info!("Created user {}", created.username);
                self.ctx
                    .flash
                    .success(format!("Created user {}", created.username));
                self.rows.insert(0, UserRow::clean(created));
                true
            }
            Err(error) => {
                warn!("Failed to create user: {}", error);
                self.create_error =
                    Some("Failed to create user. Check if username/email is unique.".to_string());
                self.ctx.flash.error("Failed to create user.");
                false
            }
        }
    }

    pub async fn delete(&mut self, id: u64) {
        self.error = None;
        if self.ctx.session.user().is_some_and(|me| me.id == id) {
            self.error = Some("You cannot delete your own account.".to_string());
            return;
        }
        let Some(username) = self
            .rows
            .iter()
            .find(|row| row.user.id == id)
            .map(|row| row.user.username.clone())
        else {
            return;
        };

        let api = self.ctx.users.clone();
        let Some(result) = self.guard.guard(async move { api.delete(id).await }).await else {
            return;
        };
        match result {
            Ok(()) => {
                self.rows.retain(|row| row.user.id != id);
                self.ctx.flash.success(format!("Deleted user {username}"));
            }
            Err(error) => {
                warn!("Failed to delete user #{}: {}", id, error);
                let message = "Failed to delete user.".to_string();
                self.ctx.flash.error(message.clone());
                self.error = Some(message);
            }
        }
    }
}
