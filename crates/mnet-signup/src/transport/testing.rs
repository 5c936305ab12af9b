use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;

use super::{Transport, TransportError, TransportRequest, TransportResponse};

/// Replays canned outcomes in order and records every request it sees.
#[derive(Debug, Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn push(&self, outcome: Result<TransportResponse, TransportError>) {
        self.script.lock().expect("script mutex").push_back(outcome);
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("request mutex").clone()
    }

    /// Request bodies decoded as JSON, in send order.
    pub(crate) fn bodies(&self) -> Vec<serde_json::Value> {
        self.requests()
            .iter()
            .filter_map(|request| request.body.as_deref())
            .map(|body| serde_json::from_slice(body).expect("request body is json"))
            .collect()
    }
}

pub(crate) fn json_response(status: u16, body: serde_json::Value) -> Result<TransportResponse, TransportError> {
    let status = StatusCode::from_u16(status).expect("valid status");
    Ok(TransportResponse::new(status, body.to_string()))
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .expect("request mutex")
            .push(request.clone());
        self.script
            .lock()
            .expect("script mutex")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connect("script exhausted".to_string())))
    }
}
