//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ckan_core::{ApiError, HttpRequest, HttpResponse};

use crate::transport::Transport;

/// Answers requests from a fixed queue and records everything it was sent.
/// Once the queue is empty every request fails at the transport level.
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<HttpResponse, ApiError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: Vec<Result<HttpResponse, ApiError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every response is `200` with the given body.
    pub fn ok_bodies(bodies: &[&str]) -> Self {
        Self::new(bodies.iter().map(|body| Ok(HttpResponse::new(200, *body))).collect())
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Action names in the order they were requested.
    pub fn actions(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|req| req.url.rsplit('/').next().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("no scripted response left".to_string())))
    }
}
