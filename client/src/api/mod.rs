//! REST access layer.
//!
//! [`http_client::HttpClient`] is the single sender; every other module is a
//! thin per-resource mapping from a domain operation to one HTTP call. No
//! retries and no caching happen here.

pub mod auth;
pub mod categories;
pub mod comments;
pub mod common;
pub mod health;
pub mod http_client;
pub mod tickets;
pub mod users;

pub use auth::AuthApi;
pub use categories::{CategoriesApi, CategoryNames};
pub use comments::CommentsApi;
pub use health::{HealthApi, HealthStatus};
pub use http_client::HttpClient;
pub use tickets::TicketsApi;
pub use users::UsersApi;
