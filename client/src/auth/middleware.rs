//! Per-request authorization and the global 401 handling.

use crate::auth::session::SessionHandle;
use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use tracing::warn;

/// Attaches `Authorization: Token <token>` when the session holds a token.
///
/// The token is read at call time, so a login or logout is picked up by the
/// very next request.
pub fn authorize(request: RequestBuilder, session: &SessionHandle) -> RequestBuilder {
    match session.token() {
        Some(token) => request.header(AUTHORIZATION, format!("Token {token}")),
        None => request,
    }
}

/// Clears the session after the server rejected the token.
pub async fn intercept_unauthorized(session: &SessionHandle, method: &str, path: &str) {
    if session.token().is_some() {
        warn!("{} {} answered 401, clearing the session", method, path);
    }
    session.clear_local().await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::storage::MemoryStorage;
    use std::sync::Arc;

    #[test]
    fn test_authorize_reads_token_at_call_time() {
        let session = SessionHandle::new(Arc::new(MemoryStorage::new()));
        let client = reqwest::Client::new();

        let anonymous = authorize(client.get("http://localhost/api/tickets/"), &session)
            .build()
            .unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());

        session.adopt_token("t1");
        let signed = authorize(client.get("http://localhost/api/tickets/"), &session)
            .build()
            .unwrap();
        assert_eq!(signed.headers()[AUTHORIZATION], "Token t1");
    }

    #[tokio::test]
    async fn test_intercept_clears_token() {
        let session = SessionHandle::new(Arc::new(MemoryStorage::new()));
        session.adopt_token("t1");
        intercept_unauthorized(&session, "GET", "/tickets/").await;
        assert_eq!(session.token(), None);
    }
}
