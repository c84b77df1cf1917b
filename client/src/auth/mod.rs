//! Authentication: the session, its persistence and the role checks.
//!
//! This module owns the token lifecycle (restore, login, logout, 401
//! invalidation) and the single place roles are resolved into permissions.

pub mod middleware;
pub mod models;
pub mod roles;
pub mod service;
pub mod session;
pub mod storage;

pub use models::Credentials;
pub use roles::{Capabilities, resolve_role};
pub use service::SessionStore;
pub use session::{Session, SessionHandle};
pub use storage::{FileStorage, MemoryStorage, SessionStorage};
