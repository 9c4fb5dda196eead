//! Async request dispatcher: build, execute, parse.
//!
//! # Design
//! A `Dispatcher` pairs a `CkanClient` (which knows the endpoint) with a
//! `Transport` (which owns the socket). `call` surfaces every failure as an
//! `ApiError`; `call_then` is the continuation form that runs the caller's
//! code only on success and drops failures silently. Neither retries, times
//! out or cancels.

use std::future::Future;

use ckan_core::{legacy, ActionRequest, ApiError, CkanClient, Endpoint};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::transport::Transport;

pub struct Dispatcher<T> {
    client: CkanClient,
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(endpoint: Endpoint, transport: T) -> Self {
        Self {
            client: CkanClient::new(endpoint),
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        self.client.endpoint()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// A dispatcher for the same site that sends no API key, sharing this
    /// one's transport.
    pub fn anonymous(&self) -> Dispatcher<&T> {
        Dispatcher {
            client: CkanClient::new(self.endpoint().anonymous()),
            transport: &self.transport,
        }
    }

    /// Issue one action and return its `result`.
    pub async fn call(&self, request: &ActionRequest) -> Result<Value, ApiError> {
        let http = self.client.build_action(request);
        debug!(action = %request.action, url = %http.url, "dispatching action");
        let response = self.transport.execute(http).await?;
        debug!(action = %request.action, status = response.status, "action answered");
        self.client.parse_action(response)
    }

    /// Like `call`, then deserialize the result into `R`.
    pub async fn call_as<R: DeserializeOwned>(&self, request: &ActionRequest) -> Result<R, ApiError> {
        let result = self.call(request).await?;
        serde_json::from_value(result).map_err(|e| ApiError::DeserializationError(e.to_string()))
    }

    /// Issue one action and, only if it succeeds, run `continuation` with the
    /// result and await whatever future it returns. Failures of any kind end
    /// the chain without a trace.
    pub async fn call_then<F, Fut>(&self, request: &ActionRequest, continuation: F)
    where
        F: FnOnce(Value) -> Fut,
        Fut: Future<Output = ()>,
    {
        if let Some(next) = legacy::deliver(self.call(request).await, continuation) {
            next.await;
        }
    }

    /// Ask the site which number it reports at `/data/api/{version}`.
    pub async fn api_version(&self, version: u32) -> Result<u32, ApiError> {
        let http = self.client.build_api_version(version);
        let response = self.transport.execute(http).await?;
        self.client.parse_api_version(response)
    }
}
