//! Application-wide UI state that is not tied to a single view.

pub mod flash;
pub mod router;
pub mod sort;

pub use flash::{FlashKind, FlashMessage, FlashStore};
pub use router::{Navigation, Router, View};
pub use sort::{SortDirection, SortKey, SortState};
