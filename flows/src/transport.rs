//! Executes core `HttpRequest`s over the network.
//!
//! `Transport` is the seam between the I/O-free core and whatever performs
//! the round-trip. `ReqwestTransport` is the production implementation;
//! tests substitute scripted fakes.

use async_trait::async_trait;
use ckan_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use tracing::trace;

pub const USER_AGENT: &str = concat!("ckan-flows/", env!("CARGO_PKG_VERSION"));

/// Performs one HTTP round-trip. Implementations must not retry: one call
/// is one network operation.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for &T {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

/// Async transport backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    origin: Option<String>,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        Ok(Self { client, origin: None })
    }

    /// Origin used to resolve origin-relative URLs, i.e. requests built from
    /// an endpoint with an empty base URL.
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = Some(origin.trim_end_matches('/').to_string());
        self
    }

    fn resolve(&self, url: &str) -> Result<String, ApiError> {
        if !url.starts_with('/') {
            return Ok(url.to_string());
        }
        match &self.origin {
            Some(origin) => Ok(format!("{origin}{url}")),
            None => Err(ApiError::Transport(format!(
                "cannot resolve origin-relative URL {url} without an origin"
            ))),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = self.resolve(&request.url)?;
        trace!(method = request.method.as_str(), %url, "sending request");

        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&url),
            // An absent payload still goes out as an explicit empty body.
            HttpMethod::Post => self.client.post(&url).body(request.body.unwrap_or_default()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}
