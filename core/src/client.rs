//! Stateless HTTP request builder and response parser for CKAN actions.
//!
//! # Design
//! `CkanClient` holds only an `Endpoint` and carries no mutable state between
//! calls. Each remote call is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip in between.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::action::{ActionEnvelope, ActionRequest};
use crate::endpoint::Endpoint;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::ApiVersion;

pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const API_KEY_HEADER: &str = "X-CKAN-API-KEY";

/// Synchronous, stateless client for the CKAN action API.
#[derive(Debug, Clone)]
pub struct CkanClient {
    endpoint: Endpoint,
}

impl CkanClient {
    pub fn new(endpoint: Endpoint) -> Self {
        Self { endpoint }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// POST `{base}/data/api/3/action/{action}`.
    ///
    /// The content type is always form-urlencoded even though CKAN payloads
    /// are JSON; CKAN reads the raw body either way. The API key header is
    /// present only when the endpoint has a key.
    pub fn build_action(&self, request: &ActionRequest) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE_HEADER.to_string(), FORM_CONTENT_TYPE.to_string())];
        if let Some(key) = self.endpoint.api_key() {
            headers.push((API_KEY_HEADER.to_string(), key.to_string()));
        }
        HttpRequest {
            method: HttpMethod::Post,
            url: self.endpoint.action_url(&request.action),
            headers,
            body: request.payload.clone(),
        }
    }

    /// GET `{base}/data/api/{version}`, used to probe which versions exist.
    pub fn build_api_version(&self, version: u32) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: self.endpoint.api_version_url(version),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Unwrap the `result` of a successful action.
    pub fn parse_action(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response)?;
        let envelope: ActionEnvelope = from_object(&response.body)?;
        envelope.into_result()
    }

    /// Like `parse_action`, then deserialize the result into `T`.
    pub fn parse_action_as<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        let result = self.parse_action(response)?;
        serde_json::from_value(result).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    pub fn parse_api_version(&self, response: HttpResponse) -> Result<u32, ApiError> {
        check_status(&response)?;
        let found: ApiVersion = from_object(&response.body)?;
        Ok(found.version)
    }
}

/// Deserialize a body that must be a JSON object. Serde would otherwise
/// accept a positional array for a struct.
fn from_object<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
    if !value.is_object() {
        return Err(ApiError::DeserializationError(format!("expected a JSON object, got {value}")));
    }
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-200 status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200 => Ok(()),
        403 => Err(ApiError::NotAuthorized),
        404 => Err(ApiError::NotFound),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
