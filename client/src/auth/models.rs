//! Payloads exchanged with the `/auth/` endpoints.

use crate::models::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// What the login form collects.
#[derive(Debug, Clone, Default, Validate)]
pub struct Credentials {
    /// Username or email.
    #[validate(length(min = 1, message = "Username or email is required"))]
    pub identifier: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl AsRef<str>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.as_ref().trim().to_string(),
            password: password.into(),
        }
    }

    /// An identifier containing `@` is sent as `email`, anything else as `username`.
    pub fn to_request(&self) -> LoginRequest {
        let identifier = self.identifier.trim().to_string();
        let (username, email) = if identifier.contains('@') {
            (None, Some(identifier))
        } else {
            (Some(identifier), None)
        };
        LoginRequest {
            username,
            email,
            password: self.password.clone(),
        }
    }
}

/// Login request payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub password: String,
}

/// Login response. Both fields are required for a usable session; they are
/// optional here so a broken response is reported instead of failing to decode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MeResponse {
    #[serde(default)]
    pub user: Option<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_routing() {
        let by_name = serde_json::to_value(Credentials::new(" alice ", "x").to_request()).unwrap();
        assert_eq!(by_name, json!({"username": "alice", "password": "x"}));

        let by_email =
            serde_json::to_value(Credentials::new("alice@example.com", "x").to_request()).unwrap();
        assert_eq!(by_email, json!({"email": "alice@example.com", "password": "x"}));
    }

    #[test]
    fn test_blank_identifier_fails_validation() {
        let errors = Credentials::new("   ", "").validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("identifier"));
        assert!(fields.contains_key("password"));
    }
}
