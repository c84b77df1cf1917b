//! Comments, nested under a ticket for listing and creation.

use crate::api::http_client::HttpClient;
use crate::errors::ClientResult;
use crate::models::{Comment, NewComment};

#[derive(Clone)]
pub struct CommentsApi {
    http: HttpClient,
}

impl CommentsApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn list(&self, ticket_id: u64) -> ClientResult<Vec<Comment>> {
        self.http
            .get(&format!("/tickets/{ticket_id}/comments/"))
            .await
    }

    pub async fn create(&self, ticket_id: u64, comment: &NewComment) -> ClientResult<Comment> {
        self.http
            .post(&format!("/tickets/{ticket_id}/comments/"), comment)
            .await
    }

    pub async fn delete(&self, comment_id: u64) -> ClientResult<()> {
        self.http.delete(&format!("/comments/{comment_id}/")).await
    }
}
