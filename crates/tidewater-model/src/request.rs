//! The signable HTTP request description.
//!
//! A [`SignableRequest`] captures everything the Signature V4 engine needs
//! to produce a deterministic signature: method, host, path, ordered query
//! parameters, headers, a payload descriptor, and the signing timestamp.
//! The signer appends signature-derived headers (or query parameters, for
//! presigned URLs) but never rewrites the fields the caller set.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, Method};

/// The request body as seen by the signer.
#[derive(Debug, Clone, Default)]
pub enum Payload {
    /// No body at all (GET, HEAD, DELETE).
    #[default]
    Empty,
    /// Complete body held in memory; the signer can hash it.
    Bytes(Bytes),
    /// Streaming body of unknown length; signed as `UNSIGNED-PAYLOAD`.
    Streaming,
}

impl Payload {
    /// Borrow the in-memory bytes, if this payload carries any.
    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(b) => Some(b),
            Payload::Empty | Payload::Streaming => None,
        }
    }
}

/// An HTTP request prepared for signing.
///
/// Query parameters are kept in insertion order with unique keys; the
/// signer sorts its own canonical copy, so the order here is what goes on
/// the wire. Header keys are case-insensitive per [`http::HeaderMap`].
#[derive(Debug, Clone)]
pub struct SignableRequest {
    /// HTTP method.
    pub method: Method,
    /// Target host, including a non-default port if any.
    pub host: String,
    /// URL path beginning with `/`, already percent-encoded.
    pub path: String,
    /// Query parameters in wire order. Keys are unique.
    pub query: Vec<(String, String)>,
    /// Request headers. The signer appends to these.
    pub headers: HeaderMap,
    /// The body descriptor used for payload hashing.
    pub payload: Payload,
    /// The instant the request is signed at.
    pub timestamp: DateTime<Utc>,
}

impl SignableRequest {
    /// Create a request with no query, headers, or body.
    #[must_use]
    pub fn new(method: Method, host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method,
            host: host.into(),
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            payload: Payload::Empty,
            timestamp: Utc::now(),
        }
    }

    /// Append a query parameter, replacing any existing value for the key.
    pub fn set_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.query.retain(|(k, _)| *k != key);
        self.query.push((key, value.into()));
    }

    /// Look up a query parameter by key.
    #[must_use]
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
