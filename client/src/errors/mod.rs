//! Client-wide error types.
//!
//! Every resource client, the session store and the views report failures
//! through [`ClientError`]. The variants follow the HTTP outcomes the help-desk
//! API produces, plus the client-side failures (bad response shape, storage,
//! configuration) that never reach the network.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field-specific validation error details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the field with validation error
    pub field: String,
    /// Description of the validation failure
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Errors surfaced by the help-desk client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received (connection refused, timeout, DNS...).
    #[error("Network error: {message}")]
    Network { message: String },

    /// Request rejected by local validation or by the server with HTTP 400.
    #[error("Validation failed: {}", summarize_fields(.fields))]
    Validation { fields: Vec<FieldError> },

    /// HTTP 401. The session has already been cleared when this is returned.
    #[error("Unauthorized: session is no longer valid")]
    Unauthorized,

    #[error("Permission denied: {message}")]
    Forbidden { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    /// The server answered 2xx but the body broke the expected contract.
    #[error("Invalid response shape: {message}")]
    InvalidResponse { message: String },

    #[error("Unexpected HTTP status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Single-field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            fields: vec![FieldError::new(field, message)],
        }
    }

    pub fn validation_fields(fields: Vec<FieldError>) -> Self {
        Self::Validation { fields }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, Self::Forbidden { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Field errors when this is a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Self::Validation { fields } => fields,
            _ => &[],
        }
    }
}

/// Renders field errors as `field: message` joined by `; `.
///
/// Errors that are not tied to a field (empty `field`) render as the bare message.
pub fn summarize_fields(fields: &[FieldError]) -> String {
    if fields.is_empty() {
        return "Invalid data".to_string();
    }
    fields
        .iter()
        .map(|error| {
            if error.field.is_empty() {
                error.message.clone()
            } else {
                format!("{}: {}", error.field, error.message)
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_joins_fields() {
        let error = ClientError::validation_fields(vec![
            FieldError::new("title", "Title must be at least 5 characters long."),
            FieldError::new("description", "This field is required."),
        ]);
        assert_eq!(
            error.to_string(),
            "Validation failed: title: Title must be at least 5 characters long.; description: This field is required."
        );
        assert_eq!(error.field_errors().len(), 2);
    }

    #[test]
    fn test_empty_validation_summary() {
        assert_eq!(summarize_fields(&[]), "Invalid data");
        assert_eq!(
            summarize_fields(&[FieldError::new("", "Invalid credentials")]),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_classification_helpers() {
        assert!(ClientError::Unauthorized.is_unauthorized());
        assert!(ClientError::forbidden("nope").is_forbidden());
        assert!(ClientError::not_found("/tickets/9/").is_not_found());
        assert!(ClientError::network("down").field_errors().is_empty());
    }
}
