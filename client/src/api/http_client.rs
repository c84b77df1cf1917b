//! The one configured HTTP sender every resource client goes through.
//!
//! Paths are relative to `{HELPDESK_API_BASE_URL}/api`. Each request carries
//! the session token read at call time, non-2xx responses are mapped onto
//! [`ClientError`] and a 401 clears the session before the caller sees it.

use crate::api::common::error_from_response;
use crate::auth::middleware::{authorize, intercept_unauthorized};
use crate::auth::session::SessionHandle;
use crate::config::Config;
use crate::errors::{ClientError, ClientResult};
use reqwest::{Client, Method, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    api_root: String,
    session: SessionHandle,
}

impl HttpClient {
    pub fn new(config: &Config, session: SessionHandle) -> ClientResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .timeout(config.request_timeout())
            .default_headers(headers)
            .build()
            .map_err(|error| {
                ClientError::configuration(format!("failed to build HTTP client: {error}"))
            })?;

        Ok(Self {
            client,
            api_root: config.api_root(),
            session,
        })
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn endpoint(&self, path: &str) -> String {
        let suffix = path.trim_start_matches('/');
        format!("{}/{suffix}", self.api_root)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let body = self.send(Method::GET, path, |request| request).await?;
        decode(path, &body)
    }

    pub async fn get_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        let body = self
            .send(Method::GET, path, |request| request.query(query))
            .await?;
        decode(path, &body)
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> ClientResult<T> {
        let body = self
            .send(Method::POST, path, |request| request.json(payload))
            .await?;
        decode(path, &body)
    }

    /// POST without a body, ignoring whatever the server answers with.
    pub async fn post_no_content(&self, path: &str) -> ClientResult<()> {
        self.send(Method::POST, path, |request| request).await?;
        Ok(())
    }

    pub async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        payload: &B,
    ) -> ClientResult<T> {
        let body = self
            .send(Method::PATCH, path, |request| request.json(payload))
            .await?;
        decode(path, &body)
    }

    pub async fn delete(&self, path: &str) -> ClientResult<()> {
        self.send(Method::DELETE, path, |request| request).await?;
        Ok(())
    }

    async fn send<F>(&self, method: Method, path: &str, build: F) -> ClientResult<String>
    where
        F: FnOnce(RequestBuilder) -> RequestBuilder,
    {
        let request = build(self.client.request(method.clone(), self.endpoint(path)));
        let request = authorize(request, &self.session);

        debug!("{} {}", method, path);
        let response = request.send().await.map_err(|error| {
            warn!("{} {} failed: {}", method, path, error);
            ClientError::network(format!("{method} {path} failed: {error}"))
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|error| {
            ClientError::network(format!("{method} {path} response read failed: {error}"))
        })?;

        if status.is_success() {
            return Ok(body);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            intercept_unauthorized(&self.session, method.as_str(), path).await;
        } else {
            debug!("{} {} answered {}", method, path, status);
        }
        Err(error_from_response(status.as_u16(), path, &body))
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &str) -> ClientResult<T> {
    serde_json::from_str(body).map_err(|error| {
        ClientError::invalid_response(format!("{path} returned malformed JSON: {error}"))
    })
}
