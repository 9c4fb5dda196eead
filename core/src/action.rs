//! Action requests and the CKAN response envelope.
//!
//! # Design
//! The payload is kept as an already-serialized string so it reaches the wire
//! byte-for-byte as the caller produced it. `with_payload` is the typed
//! convenience that serializes with `serde_json` first.
//!
//! CKAN answers every action with `{"success": bool, "result": ..}` and may
//! include a `result` even when the action failed, so only an explicit
//! `"success": true` unwraps the result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

pub const ORGANIZATION_LIST: &str = "organization_list";
pub const ORGANIZATION_SHOW: &str = "organization_show";
pub const ORGANIZATION_CREATE: &str = "organization_create";
pub const ORGANIZATION_DELETE: &str = "organization_delete";
pub const PACKAGE_LIST: &str = "package_list";
pub const PACKAGE_SHOW: &str = "package_show";
pub const PACKAGE_CREATE: &str = "package_create";
pub const PACKAGE_DELETE: &str = "package_delete";

/// One remote operation: an action name and an optional serialized body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRequest {
    pub action: String,
    pub payload: Option<String>,
}

impl ActionRequest {
    /// An action with no body.
    pub fn new(action: &str) -> Self {
        Self {
            action: action.to_string(),
            payload: None,
        }
    }

    /// An action whose body is sent exactly as given.
    pub fn with_raw_payload(action: &str, payload: impl Into<String>) -> Self {
        Self {
            action: action.to_string(),
            payload: Some(payload.into()),
        }
    }

    /// An action whose body is `payload` serialized as JSON.
    pub fn with_payload<T: Serialize>(action: &str, payload: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(Self::with_raw_payload(action, body))
    }
}

/// The `{"success": .., "result": ..}` wrapper around every action response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionEnvelope {
    #[serde(default)]
    pub success: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl ActionEnvelope {
    /// True only for a literal boolean `true`; `"true"`, `1` or an absent
    /// field all count as failure.
    pub fn is_success(&self) -> bool {
        self.success == Value::Bool(true)
    }

    /// Unwrap `result` on success. A successful envelope without a `result`
    /// field yields `null`.
    pub fn into_result(self) -> Result<Value, ApiError> {
        if self.is_success() {
            Ok(self.result.unwrap_or(Value::Null))
        } else {
            Err(ApiError::ActionFailed { error: self.error })
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::IdRef;

    #[test]
    fn with_payload_serializes_as_json() {
        let request = ActionRequest::with_payload(ORGANIZATION_DELETE, &IdRef::new("z-org-1")).unwrap();
        assert_eq!(request.action, "organization_delete");
        assert_eq!(request.payload.as_deref(), Some(r#"{"id":"z-org-1"}"#));
    }

    #[test]
    fn raw_payload_is_kept_verbatim() {
        let raw = "{ \"id\" :  \"spaced\" }";
        let request = ActionRequest::with_raw_payload(ORGANIZATION_SHOW, raw);
        assert_eq!(request.payload.as_deref(), Some(raw));
    }

    #[test]
    fn only_boolean_true_is_success() {
        for success in [json!("true"), json!(1), json!(false), Value::Null] {
            let envelope = ActionEnvelope {
                success,
                result: Some(json!(["org-a"])),
                ..Default::default()
            };
            assert!(!envelope.is_success());
            assert!(matches!(envelope.into_result(), Err(ApiError::ActionFailed { .. })));
        }
    }

    #[test]
    fn missing_success_field_deserializes_as_failure() {
        let envelope: ActionEnvelope = serde_json::from_str(r#"{"result":[1,2]}"#).unwrap();
        assert!(!envelope.is_success());
    }

    #[test]
    fn success_without_result_yields_null() {
        let envelope: ActionEnvelope = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert_eq!(envelope.into_result().unwrap(), Value::Null);
    }

    #[test]
    fn failure_keeps_the_error_object() {
        let envelope: ActionEnvelope =
            serde_json::from_str(r#"{"success":false,"error":{"__type":"Validation Error"}}"#).unwrap();
        match envelope.into_result() {
            Err(ApiError::ActionFailed { error: Some(error) }) => {
                assert_eq!(error["__type"], "Validation Error");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
