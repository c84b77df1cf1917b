//! Path to view resolution with the session gate.

use crate::auth::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const TICKETS_PATH: &str = "/tickets";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    TicketList,
    TicketCreate,
    TicketDetail(u64),
    UserPanel,
}

impl View {
    pub fn is_protected(&self) -> bool {
        !matches!(self, View::Login)
    }

    pub fn path(&self) -> String {
        match self {
            View::Login => LOGIN_PATH.to_string(),
            View::TicketList => TICKETS_PATH.to_string(),
            View::TicketCreate => "/tickets/add".to_string(),
            View::TicketDetail(id) => format!("/tickets/{id}"),
            View::UserPanel => "/user".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(View),
    Redirect(String),
    /// The session is still being restored; nothing can be decided yet.
    Pending,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Router;

impl Router {
    pub fn new() -> Self {
        Self
    }

    /// Matches a path to a view, ignoring any query string and trailing slash.
    pub fn match_path(&self, path: &str) -> Option<View> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let segments: Vec<&str> = path.split('/').filter(|part| !part.is_empty()).collect();
        match segments.as_slice() {
            ["login"] => Some(View::Login),
            ["tickets"] => Some(View::TicketList),
            ["tickets", "add"] => Some(View::TicketCreate),
            ["tickets", id] => id.parse().ok().map(View::TicketDetail),
            ["user"] => Some(View::UserPanel),
            _ => None,
        }
    }

    pub fn resolve(&self, path: &str, session: &Session) -> Navigation {
        let Some(view) = self.match_path(path) else {
            return Navigation::Redirect(TICKETS_PATH.to_string());
        };

        if session.loading {
            return Navigation::Pending;
        }

        match (view, session.is_authenticated()) {
            (View::Login, true) => Navigation::Redirect(TICKETS_PATH.to_string()),
            (view, false) if view.is_protected() => Navigation::Redirect(LOGIN_PATH.to_string()),
            (view, _) => Navigation::Render(view),
        }
    }
}
