//! # Storefront Error Types
//!
//! Typed error handling for the storefront session client.
//! All client operations return `Result<T, ShopError>`.

use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all storefront operations
#[derive(Debug, Clone, Error)]
pub enum ShopError {
    /// No response at all (connect failure, timeout, truncated body)
    #[error("Network error: {0}")]
    Network(String),

    /// 401 from the backend
    #[error("Not authenticated")]
    Unauthorized {
        /// Raw response body, kept so the caller sees the original failure
        payload: Value,
    },

    /// 4xx other than 401, with field-level detail
    #[error("Request rejected [{status}]: {detail}")]
    Validation { status: u16, detail: ErrorDetail },

    /// 5xx or an unexpected status
    #[error("Server error [{status}]: {message}")]
    Server { status: u16, message: String },

    /// Successful response whose body did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The external payment provider could not take over the checkout
    #[error("Payment redirect failed: {0}")]
    Redirect(String),

    /// Local profile cache could not be read or written
    #[error("Profile cache error: {0}")]
    Profile(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ShopError {
    /// Classify a non-success HTTP status and its body.
    pub fn from_status(status: u16, payload: Value) -> Self {
        match status {
            401 => ShopError::Unauthorized { payload },
            400..=499 => ShopError::Validation {
                status,
                detail: ErrorDetail::from_payload(payload),
            },
            _ => ShopError::Server {
                status,
                message: summarize(&payload),
            },
        }
    }

    /// Returns true if this is the authorization failure the refresh protocol handles
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ShopError::Unauthorized { .. })
    }

    /// HTTP status associated with this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ShopError::Unauthorized { .. } => Some(401),
            ShopError::Validation { status, .. } | ShopError::Server { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Text suitable for a dismissible notification.
    ///
    /// Validation failures keep their backend wording; everything else
    /// collapses to a generic message.
    pub fn user_message(&self) -> String {
        match self {
            ShopError::Validation { detail, .. } => detail.to_string(),
            ShopError::Unauthorized { .. } => "Please log in to continue.".to_string(),
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// Detail payload of a rejected request.
///
/// The backend answers either `{"detail": "..."}` or a map of field names to
/// message lists (`{"email": ["already taken"]}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorDetail {
    Message(String),
    Fields(BTreeMap<String, Vec<String>>),
}

impl ErrorDetail {
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::Object(map) => {
                if let Some(Value::String(detail)) = map.get("detail") {
                    if map.len() == 1 {
                        return ErrorDetail::Message(detail.clone());
                    }
                }
                let fields = map
                    .into_iter()
                    .map(|(field, messages)| (field, messages_of(messages)))
                    .collect();
                ErrorDetail::Fields(fields)
            }
            Value::Null => ErrorDetail::Message(String::new()),
            Value::String(s) => ErrorDetail::Message(s),
            other => ErrorDetail::Message(other.to_string()),
        }
    }

    /// Messages for one form field
    pub fn field(&self, name: &str) -> Option<&[String]> {
        match self {
            ErrorDetail::Fields(fields) => fields.get(name).map(Vec::as_slice),
            ErrorDetail::Message(_) => None,
        }
    }
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorDetail::Message(msg) => f.write_str(msg),
            ErrorDetail::Fields(fields) => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|(field, msgs)| format!("{}: {}", field, msgs.join(" ")))
                    .collect();
                f.write_str(&parts.join("; "))
            }
        }
    }
}

fn messages_of(value: Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => vec![s],
        other => vec![other.to_string()],
    }
}

fn summarize(payload: &Value) -> String {
    match payload {
        Value::Object(map) => map
            .get("detail")
            .and_then(Value::as_str)
            .map(String::from)
            .unwrap_or_else(|| payload.to_string()),
        Value::String(s) => s.clone(),
        Value::Null => "no response body".to_string(),
        other => other.to_string(),
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_classification() {
        assert!(ShopError::from_status(401, Value::Null).is_auth_failure());
        assert!(matches!(
            ShopError::from_status(400, json!({"detail": "bad"})),
            ShopError::Validation { status: 400, .. }
        ));
        assert!(matches!(
            ShopError::from_status(503, Value::Null),
            ShopError::Server { status: 503, .. }
        ));
    }

    #[test]
    fn test_field_detail() {
        let err = ShopError::from_status(
            400,
            json!({"email": ["user with this email already exists."], "password": "too short"}),
        );
        let ShopError::Validation { detail, .. } = err else {
            panic!("expected validation error");
        };
        assert_eq!(
            detail.field("email"),
            Some(&["user with this email already exists.".to_string()][..])
        );
        assert_eq!(detail.field("password"), Some(&["too short".to_string()][..]));
        assert_eq!(detail.field("username"), None);
    }

    #[test]
    fn test_single_detail_message() {
        let detail = ErrorDetail::from_payload(json!({"detail": "Not enough inventory"}));
        assert_eq!(detail, ErrorDetail::Message("Not enough inventory".into()));
    }

    #[test]
    fn test_user_message() {
        let err = ShopError::from_status(400, json!({"detail": "Not enough inventory"}));
        assert_eq!(err.user_message(), "Not enough inventory");

        let err = ShopError::Network("connection refused".into());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
        assert_eq!(err.status_code(), None);
    }
}
