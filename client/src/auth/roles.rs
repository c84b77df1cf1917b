//! Effective role resolution and the permission checks derived from it.
//!
//! Every role decision in the client goes through [`resolve_role`] and
//! [`Capabilities`]; views never compare role strings themselves.

use crate::models::{Role, Ticket, User};

/// Effective role of a profile. `None` means anonymous.
///
/// An explicit `role` wins. Otherwise superusers and members of the `ADMIN`
/// group are admins, members of `TECHNICIAN` are technicians and everyone
/// else is a plain user.
pub fn resolve_role(user: Option<&User>) -> Option<Role> {
    let user = user?;
    if let Some(role) = user.role {
        return Some(role);
    }
    let in_group = |name: &str| user.groups.iter().any(|group| group.eq_ignore_ascii_case(name));
    if user.is_superuser || in_group("ADMIN") {
        Some(Role::Admin)
    } else if in_group("TECHNICIAN") {
        Some(Role::Technician)
    } else {
        Some(Role::User)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    role: Option<Role>,
    user_id: Option<u64>,
}

impl Capabilities {
    pub fn for_user(user: Option<&User>) -> Self {
        Self {
            role: resolve_role(user),
            user_id: user.map(|user| user.id),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    pub fn is_technician(&self) -> bool {
        self.role == Some(Role::Technician)
    }

    /// Technicians and admins.
    pub fn is_support(&self) -> bool {
        self.is_admin() || self.is_technician()
    }

    pub fn can_manage_users(&self) -> bool {
        self.is_admin()
    }

    pub fn can_delete_tickets(&self) -> bool {
        self.is_admin()
    }

    pub fn can_delete_comments(&self) -> bool {
        self.is_admin()
    }

    pub fn can_post_internal_comments(&self) -> bool {
        self.is_support()
    }

    pub fn can_view_stats(&self) -> bool {
        self.is_support()
    }

    pub fn can_list_technicians(&self) -> bool {
        self.is_support()
    }

    pub fn can_view_ticket(&self, ticket: &Ticket) -> bool {
        match self.role {
            Some(Role::Admin) => true,
            Some(Role::Technician) => {
                ticket.assigned_to.is_none() || ticket.assigned_to == self.user_id
            }
            Some(Role::User) => ticket.created_by.is_some() && ticket.created_by == self.user_id,
            None => false,
        }
    }

    /// Title, description, priority, category and due date.
    pub fn can_edit_ticket(&self, ticket: &Ticket) -> bool {
        self.is_admin() || (self.user_id.is_some() && ticket.created_by == self.user_id)
    }

    pub fn can_change_status(&self, ticket: &Ticket) -> bool {
        self.is_admin()
            || (self.is_technician() && self.user_id.is_some() && ticket.assigned_to == self.user_id)
    }

    /// Technicians may only take unassigned tickets (or keep their own) and never unassign.
    pub fn can_assign(&self, ticket: &Ticket, assignee: Option<u64>) -> bool {
        if self.is_admin() {
            return true;
        }
        if !self.is_technician() {
            return false;
        }
        match (assignee, self.user_id) {
            (Some(assignee), Some(me)) if assignee == me => {
                ticket.assigned_to.is_none() || ticket.assigned_to == Some(me)
            }
            _ => false,
        }
    }

    /// Whether the assignee picker is offered at all.
    pub fn can_assign_any(&self, ticket: &Ticket) -> bool {
        match self.user_id {
            Some(me) => self.can_assign(ticket, Some(me)),
            None => false,
        }
    }
}
