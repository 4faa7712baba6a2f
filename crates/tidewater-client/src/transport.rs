//! The HTTP transport seam.
//!
//! [`Transport`] is the boundary between the client's request logic and
//! the actual network: production code uses [`HttpTransport`] over
//! `reqwest`, tests substitute a scripted fake. The transport does not
//! retry, interpret status codes, or touch the body - that is the
//! client's job.

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};

/// A fully rendered HTTP request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query string.
    pub url: String,
    /// Request headers, including everything the signer attached.
    pub headers: HeaderMap,
    /// Request body; empty for bodiless methods.
    pub body: Bytes,
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// The full response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// The value of a header as a string, if present and valid.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Connection-level failures.
///
/// Timeouts are indistinguishable from any other transport failure by
/// design; the caller owns retry policy.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An error surfaced by the HTTP stack.
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// A failure injected or synthesized outside the HTTP stack.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Executes one HTTP round trip.
///
/// Implementations must honor cooperative cancellation: dropping the
/// returned future abandons the request without side effects on the
/// client's state.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Send the request and buffer the response.
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// The production transport over a shared `reqwest` client.
#[derive(Debug, Default)]
pub struct HttpTransport {
    http: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with a fresh connection pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(TransportResponse {
            status,
            headers,
            body,
        })
    }
}
