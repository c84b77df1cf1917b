use crate::api::http_client::HttpClient;
use crate::errors::ClientResult;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Clone)]
pub struct HealthApi {
    http: HttpClient,
}

impl HealthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Liveness probe; needs no session.
    pub async fn check(&self) -> ClientResult<HealthStatus> {
        self.http.get("/health/").await
    }
}
