//! Ticket endpoints under `/tickets/`.
//!
//! Listing takes a [`TicketFilter`] as query string. Status and assignment
//! have their own PATCH routes and return the updated ticket.

use crate::api::http_client::HttpClient;
use crate::errors::ClientResult;
use crate::models::{NewTicket, Ticket, TicketFilter, TicketPatch, TicketStats, TicketStatus};
use serde::Serialize;

#[derive(Serialize)]
struct StatusUpdate {
    status: TicketStatus,
}

/// `assigned_to: null` unassigns.
#[derive(Serialize)]
struct AssignUpdate {
    assigned_to: Option<u64>,
}

#[derive(Clone)]
pub struct TicketsApi {
    http: HttpClient,
}

impl TicketsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, filter: &TicketFilter) -> ClientResult<Vec<Ticket>> {
        let query = filter.to_query();
        if query.is_empty() {
            return self.http.get("/tickets/").await;
        }
        self.http.get_query("/tickets/", &query).await
    }

    pub async fn get(&self, id: u64) -> ClientResult<Ticket> {
        self.http.get(&format!("/tickets/{id}/")).await
    }

    pub async fn create(&self, ticket: &NewTicket) -> ClientResult<Ticket> {
        self.http.post("/tickets/", ticket).await
    }

    pub async fn update(&self, id: u64, patch: &TicketPatch) -> ClientResult<Ticket> {
        self.http.patch(&format!("/tickets/{id}/"), patch).await
    }

    pub async fn update_status(&self, id: u64, status: TicketStatus) -> ClientResult<Ticket> {
        self.http
            .patch(&format!("/tickets/{id}/status/"), &StatusUpdate { status })
            .await
    }

    pub async fn assign(&self, id: u64, assignee: Option<u64>) -> ClientResult<Ticket> {
        self.http
            .patch(
                &format!("/tickets/{id}/assign/"),
                &AssignUpdate {
                    assigned_to: assignee,
                },
            )
            .await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.http.delete(&format!("/tickets/{id}/")).await
    }

    /// Counters for technicians and admins.
    pub async fn stats(&self) -> ClientResult<TicketStats> {
        self.http.get("/tickets/stats/").await
    }
}
