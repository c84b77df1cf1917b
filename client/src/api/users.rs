//! User administration endpoints and the technician lookup.

use crate::api::http_client::HttpClient;
use crate::errors::ClientResult;
use crate::models::{NewUser, User, UserBrief, UserPatch};

#[derive(Clone)]
pub struct UsersApi {
    http: HttpClient,
}

impl UsersApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Admin only.
    pub async fn list(&self) -> ClientResult<Vec<User>> {
        self.http.get("/users/").await
    }

    /// Users a ticket can be assigned to.
    pub async fn technicians(&self) -> ClientResult<Vec<UserBrief>> {
        self.http.get("/users/technicians/").await
    }

    pub async fn create(&self, user: &NewUser) -> ClientResult<User> {
        self.http.post("/users/", user).await
    }

    pub async fn update(&self, id: u64, patch: &UserPatch) -> ClientResult<User> {
        self.http.patch(&format!("/users/{id}/"), patch).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<()> {
        self.http.delete(&format!("/users/{id}/")).await
    }
}
