//! Error types for the CKAN action client.
//!
//! # Design
//! `NotAuthorized` and `NotFound` get dedicated variants because CKAN maps
//! its authorization and lookup failures onto 403 and 404, and callers
//! frequently branch on them. Every other non-200 lands in `HttpError` with
//! the raw status and body. A 200 whose envelope does not say
//! `"success": true` is `ActionFailed`, kept apart from transport and parse
//! failures so callers can tell "the server said no" from "we never got a
//! usable answer".

use serde_json::Value;

/// Errors produced while building, executing or parsing an action call.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server returned 403.
    #[error("not authorized")]
    NotAuthorized,

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-200 status other than 403 and 404.
    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    /// The response body is not a JSON action envelope of the expected shape.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The envelope parsed but did not report `"success": true`.
    #[error("action failed: {}", describe(.error))]
    ActionFailed { error: Option<Value> },

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}

/// Coarse classification of `ApiError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Status,
    Parse,
    Application,
    Serialization,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::NotAuthorized | ApiError::NotFound | ApiError::HttpError { .. } => ErrorKind::Status,
            ApiError::DeserializationError(_) => ErrorKind::Parse,
            ApiError::ActionFailed { .. } => ErrorKind::Application,
            ApiError::SerializationError(_) => ErrorKind::Serialization,
        }
    }
}

fn describe(error: &Option<Value>) -> String {
    match error {
        Some(Value::Object(fields)) => match (fields.get("__type"), fields.get("message")) {
            (Some(Value::String(kind)), Some(Value::String(message))) => format!("{kind}: {message}"),
            (Some(Value::String(kind)), _) => kind.clone(),
            _ => Value::Object(fields.clone()).to_string(),
        },
        Some(other) => other.to_string(),
        None => "success flag not set".to_string(),
    }
}
