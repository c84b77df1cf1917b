use crate::api::http_client::HttpClient;
use crate::auth::models::{LoginRequest, LoginResponse, MeResponse};
use crate::errors::ClientResult;

#[derive(Clone)]
pub struct AuthApi {
    http: HttpClient,
}

impl AuthApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<LoginResponse> {
        self.http.post("/auth/login/", request).await
    }

    pub async fn me(&self) -> ClientResult<MeResponse> {
        self.http.get("/auth/me/").await
    }

    pub async fn logout(&self) -> ClientResult<()> {
        self.http.post_no_content("/auth/logout/").await
    }
}
