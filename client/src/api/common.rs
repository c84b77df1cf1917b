//! Response and validation helpers shared by every resource client.
//!
//! Provides:
//! - Mapping of non-2xx responses onto [`ClientError`] variants
//! - Parsing of the server's field-keyed validation bodies
//! - Conversion of `validator::ValidationErrors` into [`FieldError`]s
//!
//! # Error body formats
//! The API answers 400 with either a field map (`{"title": ["..."]}`) or a
//! single message under `detail`, `error` or `message`. Permission failures
//! carry their reason under `detail`.

use crate::errors::{ClientError, ClientResult, FieldError};
use serde_json::Value;
use validator::Validate;

/// Keys whose messages are not tied to a specific field.
const GENERAL_KEYS: [&str; 4] = ["detail", "error", "message", "non_field_errors"];

/// Maps a non-success status and its body onto the client error taxonomy.
pub fn error_from_response(status: u16, path: &str, body: &str) -> ClientError {
    match status {
        400 => ClientError::validation_fields(parse_validation_body(body)),
        401 => ClientError::Unauthorized,
        403 => ClientError::forbidden(
            extract_detail(body).unwrap_or_else(|| "You do not have permission".to_string()),
        ),
        404 => ClientError::not_found(path),
        _ => ClientError::Http {
            status,
            message: extract_detail(body).unwrap_or_else(|| truncate(body, 200)),
        },
    }
}

/// Reads a validation body into field errors sorted by field name.
pub fn parse_validation_body(body: &str) -> Vec<FieldError> {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        let text = body.trim();
        if text.is_empty() {
            return Vec::new();
        }
        return vec![FieldError::new("", truncate(text, 200))];
    };

    let mut errors: Vec<FieldError> = match value {
        Value::Object(map) => map
            .into_iter()
            .flat_map(|(field, messages)| {
                let field = if is_general(&field, &messages) {
                    String::new()
                } else {
                    field
                };
                flatten_messages(messages)
                    .into_iter()
                    .map(move |message| FieldError::new(field.clone(), message))
            })
            .collect(),
        other => flatten_messages(other)
            .into_iter()
            .map(|message| FieldError::new("", message))
            .collect(),
    };

    // general messages first, then fields alphabetically
    errors.sort_by(|left, right| left.field.cmp(&right.field));
    errors
}

/// `detail` and `non_field_errors` are always general. `error` and `message`
/// are general only as a bare string, since a list under them is a field map
/// entry for a payload field of that name.
fn is_general(key: &str, messages: &Value) -> bool {
    match key {
        "detail" | "non_field_errors" => true,
        _ => GENERAL_KEYS.contains(&key) && messages.is_string(),
    }
}

fn flatten_messages(value: Value) -> Vec<String> {
    match value {
        Value::String(message) => vec![message],
        Value::Array(items) => items.into_iter().flat_map(flatten_messages).collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

/// Pulls a human-readable message out of an error body, if there is one.
pub fn extract_detail(body: &str) -> Option<String> {
    let value = serde_json::from_str::<Value>(body).ok()?;
    GENERAL_KEYS.iter().find_map(|key| match value.get(*key) {
        Some(Value::String(message)) => Some(message.clone()),
        Some(Value::Array(items)) => items
            .iter()
            .find_map(|item| item.as_str().map(str::to_string)),
        _ => None,
    })
}

/// Formats validator::ValidationErrors into field-specific error details
pub fn validation_errors_to_field_errors(errors: validator::ValidationErrors) -> Vec<FieldError> {
    let mut fields: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| FieldError {
                field: field.to_string(),
                message: error
                    .message
                    .as_ref()
                    .unwrap_or(&"Invalid value".into())
                    .to_string(),
            })
        })
        .collect();
    fields.sort_by(|left, right| left.field.cmp(&right.field));
    fields
}

/// Runs the payload's `validator` rules, mapping failures to [`ClientError::Validation`].
pub fn validate_payload<T: Validate>(payload: &T) -> ClientResult<()> {
    payload
        .validate()
        .map_err(|errors| ClientError::validation_fields(validation_errors_to_field_errors(errors)))
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut shortened: String = text.chars().take(max_chars).collect();
    shortened.push('…');
    shortened
}
