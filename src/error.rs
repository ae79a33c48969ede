//! Client Error Types
//!
//! One tagged error type for everything the client can fail with, and the
//! single normalization function that maps the backend's error bodies onto it.
//!
//! The backend is inconsistent about its error shape: some handlers answer
//! `{"message": ..}`, some `{"error": ..}`, validation failures carry an
//! `errors` array (or map) of field problems, and proxies return plain text.
//! [`normalize`] is the only place that knows about those shapes.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::storage::StorageError;

/// A problem with a single form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
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

/// Errors that can occur in the client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Field-level validation failure, rendered next to the form controls
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// Authentication rejected (401/403)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// Resource-level failure (404, 409, 5xx, ...)
    #[error("API error {status}: {message}")]
    Resource { status: u16, message: String },

    /// Transport failure before a response arrived
    #[error("Network error: {0}")]
    Network(String),

    /// Request timed out
    #[error("Request timeout")]
    Timeout,

    /// Response body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Durable storage failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The view that issued the request was left before it completed
    #[error("Request cancelled")]
    Cancelled,
}

impl ClientError {
    /// HTTP status carried by the error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status, .. } | ClientError::Resource { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Field errors for inline rendering (empty for non-validation errors)
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ClientError::Validation { fields, .. } => fields,
            _ => &[],
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Human-readable message for a banner or alert
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation { message, .. }
            | ClientError::Unauthorized { message, .. }
            | ClientError::Resource { message, .. } => message.clone(),
            ClientError::Network(_) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            ClientError::Timeout => "The server took too long to respond.".to_string(),
            ClientError::Decode(_) => "The server sent an unexpected response.".to_string(),
            ClientError::Storage(_) => "Could not access local storage.".to_string(),
            ClientError::Cancelled => "The request was cancelled.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Map a non-success response onto [`ClientError`]
pub fn normalize(status: u16, body: &str) -> ClientError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();

    let fields = parsed.as_ref().map(extract_field_errors).unwrap_or_default();

    let message = parsed
        .as_ref()
        .and_then(extract_message)
        .or_else(|| {
            // Plain-text bodies are used as-is when short enough to show
            let text = body.trim();
            (parsed.is_none() && !text.is_empty() && text.len() <= 200 && !text.starts_with('<'))
                .then(|| text.to_string())
        })
        .or_else(|| fields.first().map(|f| f.message.clone()))
        .unwrap_or_else(|| fallback_message(status).to_string());

    match status {
        401 | 403 => ClientError::Unauthorized { status, message },
        400 | 422 => ClientError::Validation { message, fields },
        _ if !fields.is_empty() => ClientError::Validation { message, fields },
        _ => ClientError::Resource { status, message },
    }
}

fn extract_message(body: &Value) -> Option<String> {
    let non_empty = |v: &Value| v.as_str().map(str::trim).filter(|s| !s.is_empty()).map(String::from);

    if let Some(msg) = body.get("message").and_then(non_empty) {
        return Some(msg);
    }
    match body.get("error") {
        Some(Value::String(_)) => body.get("error").and_then(non_empty),
        Some(Value::Object(inner)) => inner.get("message").and_then(non_empty),
        _ => None,
    }
}

fn extract_field_errors(body: &Value) -> Vec<FieldError> {
    match body.get("errors") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let field = ["field", "path", "param"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str))
                    .unwrap_or("");
                let message = ["message", "msg"]
                    .iter()
                    .find_map(|k| item.get(*k).and_then(Value::as_str))
                    .or_else(|| item.as_str())?;
                Some(FieldError::new(field, message))
            })
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(field, message)| {
                let message = match message {
                    Value::String(s) => s.clone(),
                    Value::Array(list) => list.first()?.as_str()?.to_string(),
                    _ => return None,
                };
                Some(FieldError::new(field.clone(), message))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn fallback_message(status: u16) -> &'static str {
    match status {
        400 | 422 => "Some of the submitted information is invalid.",
        401 => "Your session has expired. Please log in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource was not found.",
        409 => "This conflicts with existing data.",
        429 => "Too many requests. Please wait a moment and try again.",
        500..=599 => "The server encountered an error. Please try again later.",
        _ => "Something went wrong. Please try again.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shape() {
        let err = normalize(404, r#"{"message": "Community not found"}"#);
        assert!(matches!(err, ClientError::Resource { status: 404, .. }));
        assert_eq!(err.user_message(), "Community not found");
    }

    #[test]
    fn test_error_shape() {
        let err = normalize(409, r#"{"error": "Already a member"}"#);
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.user_message(), "Already a member");

        let err = normalize(500, r#"{"error": {"message": "boom"}}"#);
        assert_eq!(err.user_message(), "boom");
    }

    #[test]
    fn test_validation_array() {
        let err = normalize(
            400,
            r#"{"errors": [{"path": "email", "msg": "Invalid email"}, {"field": "password", "message": "Too short"}]}"#,
        );
        assert_eq!(
            err.field_errors(),
            &[
                FieldError::new("email", "Invalid email"),
                FieldError::new("password", "Too short"),
            ]
        );
        // First field problem doubles as the banner message
        assert_eq!(err.user_message(), "Invalid email");
    }

    #[test]
    fn test_validation_map() {
        let err = normalize(422, r#"{"message": "Invalid data", "errors": {"name": ["Required"]}}"#);
        assert_eq!(err.user_message(), "Invalid data");
        assert_eq!(err.field_errors(), &[FieldError::new("name", "Required")]);
    }

    #[test]
    fn test_field_errors_upgrade_other_statuses() {
        let err = normalize(409, r#"{"errors": [{"field": "username", "message": "Taken"}]}"#);
        assert!(matches!(err, ClientError::Validation { .. }));
    }

    #[test]
    fn test_auth_statuses() {
        assert!(normalize(401, "").is_unauthorized());
        let err = normalize(403, r#"{"message": "Creators only"}"#);
        assert!(err.is_unauthorized());
        assert_eq!(err.user_message(), "Creators only");
    }

    #[test]
    fn test_fallback_messages() {
        assert_eq!(
            normalize(404, "").user_message(),
            "The requested resource was not found."
        );
        assert_eq!(
            normalize(502, "<html>bad gateway</html>").user_message(),
            "The server encountered an error. Please try again later."
        );
        assert_eq!(normalize(503, "maintenance").user_message(), "maintenance");
        assert_eq!(
            normalize(404, r#"{"message": "   "}"#).user_message(),
            "The requested resource was not found."
        );
    }

    #[test]
    fn test_error_display() {
        let err = ClientError::Resource {
            status: 404,
            message: "gone".to_string(),
        };
        assert_eq!(err.to_string(), "API error 404: gone");
        assert_eq!(ClientError::Cancelled.to_string(), "Request cancelled");
    }
}
