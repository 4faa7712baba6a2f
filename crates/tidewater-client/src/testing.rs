//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, StatusCode};
use parking_lot::Mutex;

use tidewater_auth::credentials::{Credentials, StaticCredentialProvider};

use crate::client::Client;
use crate::config::ClientConfig;
use crate::transport::{Transport, TransportError, TransportRequest, TransportResponse};

/// A scripted transport: responses are served in push order and every
/// dispatched request is recorded for assertions.
#[derive(Debug, Default)]
pub(crate) struct MockTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<TransportRequest>>,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue a 200 response with the given body.
    pub(crate) fn push_ok(&self, body: impl Into<Vec<u8>>) {
        self.push_response(200, HeaderMap::new(), body);
    }

    /// Queue a 200 response carrying an `ETag` header.
    pub(crate) fn push_ok_with_etag(&self, etag: &str) {
        let mut headers = HeaderMap::new();
        headers.insert(
            "etag",
            HeaderValue::from_str(&format!("\"{etag}\"")).expect("valid etag header"),
        );
        self.push_response(200, headers, Vec::new());
    }

    /// Queue an error response with the given status and body.
    pub(crate) fn push_error(&self, status: u16, body: impl Into<Vec<u8>>) {
        self.push_response(status, HeaderMap::new(), body);
    }

    /// Queue a connection-level failure.
    pub(crate) fn push_failure(&self, message: &str) {
        self.responses
            .lock()
            .push_back(Err(TransportError::Connection(message.to_owned())));
    }

    pub(crate) fn push_response(&self, status: u16, headers: HeaderMap, body: impl Into<Vec<u8>>) {
        self.responses.lock().push_back(Ok(TransportResponse {
            status: StatusCode::from_u16(status).expect("valid status"),
            headers,
            body: Bytes::from(body.into()),
        }));
    }

    /// Every request dispatched so far, in order.
    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().push(request);
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted response".to_owned())))
    }
}

/// A client wired to a mock transport with fixed test credentials.
pub(crate) fn test_client(transport: Arc<MockTransport>) -> Client {
    let config = ClientConfig {
        access_key: "AKIDEXAMPLE".to_owned(),
        secret_key: "test-secret".to_owned(),
        ..ClientConfig::default()
    };
    let credentials = Credentials::new(config.access_key.clone(), config.secret_key.clone());
    Client::with_parts(
        config,
        Arc::new(StaticCredentialProvider::new(credentials)),
        transport,
    )
}

/// An anonymous client wired to a mock transport.
pub(crate) fn anonymous_test_client(transport: Arc<MockTransport>) -> Client {
    Client::with_parts(
        ClientConfig::default(),
        Arc::new(StaticCredentialProvider::new(Credentials::anonymous())),
        transport,
    )
}
