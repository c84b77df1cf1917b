//! Help-desk ticketing client.
//!
//! An authenticated REST session (token lifecycle, persisted token/user cache,
//! 401 interception), resource clients for tickets, comments, categories and
//! users, and headless views that keep local drafts and reconcile them with
//! server responses. The `helpdesk` binary drives the views from the command
//! line.

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;
pub mod views;

#[cfg(test)]
mod test_support;
