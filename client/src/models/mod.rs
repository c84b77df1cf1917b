//! Data structures exchanged with the help-desk REST API.
//!
//! These models mirror the JSON the server sends and accepts. Request payloads
//! carry `validator` rules so forms can reject bad input before any request
//! is made.

pub mod comment;
pub mod ticket;
pub mod user;

pub use comment::{Comment, NewComment, Visibility};
pub use ticket::{
    Category, CreatedBy, NewTicket, Priority, Ticket, TicketFilter, TicketPatch, TicketStats,
    TicketStatus,
};
pub use user::{NewUser, Role, User, UserBrief, UserPatch};
