//! # Errors returned by the HTTP client
//!
//! [`ApiError`] separates the three ways a request can go wrong:
//!
//! - **Rejected**: the service answered with a non-2xx status. The parsed body
//!   (or `Value::Null` when it was not JSON) is kept so callers can pull out
//!   endpoint-specific messages, e.g. per-field registration errors.
//! - **Unreachable**: no response at all (DNS failure, connection refused).
//! - **Decode**: a 2xx response whose body did not match the expected shape.
//!
//! The helpers [`message_from_body`] and [`field_errors`] implement the
//! message-extraction rules shared by the session layer.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Rejected {
        status: u16,
        message: String,
        body: Value,
    },
    #[error("Cannot reach the server at {base_url}. Make sure the backend is running on port {port}.")]
    Unreachable {
        base_url: String,
        port: u16,
        reason: String,
    },
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("unexpected response from server: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build a rejection from a status code and whatever body could be parsed.
    pub fn rejected(status: u16, body: Value) -> Self {
        let message = message_from_body(&body, &["error", "detail"])
            .unwrap_or_else(|| format!("server error ({status})"));
        ApiError::Rejected {
            status,
            message,
            body,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed error body of a rejection.
    pub fn body(&self) -> Option<&Value> {
        match self {
            ApiError::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable { .. })
    }
}

/// First of `fields` holding a non-empty message. A field may be a string or
/// a list of strings (joined with `", "`).
pub fn message_from_body(body: &Value, fields: &[&str]) -> Option<String> {
    fields
        .iter()
        .filter_map(|field| body.get(*field))
        .filter_map(message_text)
        .find(|text| !text.is_empty())
}

/// Per-field validation errors rendered as `"field: msg1, msg2; field2: msg3"`,
/// fields in key order. `None` when the body holds no such map.
pub fn field_errors(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    let mut fields: Vec<(&String, String)> = map
        .iter()
        .filter_map(|(field, value)| Some((field, message_text(value)?)))
        .filter(|(_, text)| !text.is_empty())
        .collect();
    if fields.is_empty() {
        return None;
    }
    fields.sort_by(|a, b| a.0.cmp(b.0));
    Some(
        fields
            .into_iter()
            .map(|(field, text)| format!("{field}: {text}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

fn message_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejection_prefers_error_then_detail() {
        let err = ApiError::rejected(401, json!({"detail": "Token expired", "error": "Invalid credentials"}));
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(err.status(), Some(401));

        let err = ApiError::rejected(403, json!({"detail": "Not allowed"}));
        assert_eq!(err.to_string(), "Not allowed");
    }

    #[test]
    fn test_rejection_falls_back_to_status() {
        assert_eq!(ApiError::rejected(500, Value::Null).to_string(), "server error (500)");
        assert_eq!(
            ApiError::rejected(400, json!({"message": "ignored here"})).to_string(),
            "server error (400)"
        );
    }

    #[test]
    fn test_message_from_body_order_and_lists() {
        let body = json!({"message": "third", "detail": ["second", "also"]});
        assert_eq!(
            message_from_body(&body, &["error", "detail", "message"]).as_deref(),
            Some("second, also")
        );
        assert_eq!(
            message_from_body(&json!({"error": ""}), &["error", "message"]),
            None
        );
    }

    #[test]
    fn test_field_errors_are_joined() {
        let body = json!({
            "username": ["A user with that username already exists."],
            "password": ["This password is too short.", "This password is too common."],
        });
        assert_eq!(
            field_errors(&body).as_deref(),
            Some(
                "password: This password is too short., This password is too common.; \
                 username: A user with that username already exists."
            )
        );
        assert_eq!(field_errors(&json!({"count": 3})), None);
        assert_eq!(field_errors(&Value::Null), None);
    }
}
