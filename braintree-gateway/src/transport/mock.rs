//! In-memory transport for unit tests.

use std::{
    collections::VecDeque,
    sync::{Mutex, PoisonError},
    time::Duration,
};

use super::{Transport, TransportRequest, TransportResponse, sealed};
use crate::{
    config::Credentials,
    error::{GatewayError, Result},
};

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedRequest {
    pub method: &'static str,
    pub base_url: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub content_type: Option<String>,
    pub timeout: Option<Duration>,
    pub body: Vec<u8>,
    pub public_key: String,
}

impl RecordedRequest {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Replays queued responses in order and records every request.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<(u16, Vec<u8>)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl sealed::private::Sealed for MockTransport {}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) -> Self {
        self.responses.lock().unwrap_or_else(PoisonError::into_inner).push_back((status, body.into()));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Transport for MockTransport {
    async fn send<'a>(
        &'a self,
        credentials: &'a Credentials,
        request: TransportRequest<'a>,
    ) -> Result<TransportResponse> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner).push(RecordedRequest {
            method: request.verb.as_str(),
            base_url: request.base_url.to_owned(),
            path: request.path.to_owned(),
            headers: request.headers.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect(),
            content_type: request.body.map(|(content_type, _)| content_type.to_owned()),
            timeout: request.timeout,
            body: request.body.map(|(_, body)| body.to_vec()).unwrap_or_default(),
            public_key: credentials.public_key.clone(),
        });

        let (status, body) = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .ok_or_else(|| GatewayError::TransportError("no queued mock response".to_owned()))?;
        Ok(TransportResponse { status, body })
    }

    fn protocol_name(&self) -> &'static str {
        "mock"
    }
}
