//! The client core: request construction, signing, and dispatch.

use std::sync::Arc;

use bytes::Bytes;
use http::Method;
use tracing::debug;

use tidewater_auth::canonical::{canonical_query_string, encode_path};
use tidewater_auth::credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
use tidewater_auth::sigv4::{apply_integrity_headers, sign_v4};
use tidewater_model::request::{Payload, SignableRequest};
use tidewater_xml::parse_error_body;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::transport::{HttpTransport, Transport, TransportRequest, TransportResponse};

/// An async client for S3-compatible object storage.
///
/// The client is cheap to clone-by-`Arc` through its internals and safe
/// to share: every operation signs its own request, and no mutable state
/// is shared between concurrent calls.
#[derive(Debug, Clone)]
pub struct Client {
    pub(crate) config: ClientConfig,
    pub(crate) credentials: Arc<dyn CredentialProvider>,
    pub(crate) transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client from configuration, using the built-in HTTP
    /// transport and a static credential provider.
    #[must_use]
    pub fn new(config: ClientConfig) -> Self {
        let mut credentials = Credentials::new(&config.access_key, &config.secret_key);
        if let Some(token) = &config.session_token {
            credentials = credentials.with_session_token(token);
        }
        Self {
            config,
            credentials: Arc::new(StaticCredentialProvider::new(credentials)),
            transport: Arc::new(HttpTransport::new()),
        }
    }

    /// Create a client with an explicit credential provider and
    /// transport. This is the seam tests use to substitute fakes.
    #[must_use]
    pub fn with_parts(
        config: ClientConfig,
        credentials: Arc<dyn CredentialProvider>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
        }
    }

    /// The configured region.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.config.region
    }

    /// Build a request targeting a bucket and optionally an object.
    ///
    /// Path-style addressing is used throughout: `/{bucket}` or
    /// `/{bucket}/{key}` with the key percent-encoded segment-wise. The
    /// encoded path is both the wire path and the canonical URI.
    pub(crate) fn new_request(
        &self,
        method: Method,
        bucket: Option<&str>,
        key: Option<&str>,
    ) -> SignableRequest {
        let mut raw = String::from("/");
        if let Some(bucket) = bucket {
            raw.push_str(bucket);
            if let Some(key) = key {
                raw.push('/');
                raw.push_str(key);
            }
        }
        SignableRequest::new(method, self.config.endpoint.clone(), encode_path(&raw))
    }

    /// Sign and dispatch a request, surfacing service errors as typed
    /// values.
    ///
    /// Success means a 2xx status; anything else has its body parsed as
    /// an `<Error>` document and is returned as
    /// [`ClientError::Service`].
    pub(crate) async fn send(
        &self,
        mut request: SignableRequest,
    ) -> Result<TransportResponse, ClientError> {
        let credentials = self.credentials.fetch();
        if credentials.is_expired() {
            debug!("credentials are past expiration; signing with them anyway");
        }

        apply_integrity_headers(&mut request, &credentials, self.config.secure);
        sign_v4(&mut request, &credentials, &self.config.region)?;

        let body = match &request.payload {
            Payload::Bytes(bytes) => bytes.clone(),
            Payload::Empty => Bytes::new(),
            Payload::Streaming => {
                return Err(ClientError::InvalidArgument {
                    message: "streaming payloads must be buffered per part before dispatch"
                        .to_owned(),
                });
            }
        };

        let query = canonical_query_string(&request.query);
        let url = if query.is_empty() {
            format!(
                "{}://{}{}",
                self.config.scheme(),
                request.host,
                request.path
            )
        } else {
            format!(
                "{}://{}{}?{query}",
                self.config.scheme(),
                request.host,
                request.path
            )
        };

        debug!(method = %request.method, %url, "dispatching request");

        let response = self
            .transport
            .execute(TransportRequest {
                method: request.method.clone(),
                url,
                headers: request.headers.clone(),
                body,
            })
            .await?;

        if response.status.is_success() {
            Ok(response)
        } else {
            let error = parse_error_body(&response.body, response.status.as_u16());
            debug!(code = %error.code, status = %response.status, "service returned an error");
            Err(ClientError::Service(error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTransport, test_client};

    #[test]
    fn test_should_encode_object_key_in_request_path() {
        let client = test_client(Arc::new(MockTransport::new()));
        let req = client.new_request(Method::GET, Some("bkt"), Some("a key/with spaces.txt"));
        assert_eq!(req.path, "/bkt/a%20key/with%20spaces.txt");
    }

    #[tokio::test]
    async fn test_should_sign_and_dispatch_request() {
        let transport = Arc::new(MockTransport::new());
        transport.push_ok(b"".to_vec());
        let client = test_client(Arc::clone(&transport));

        let req = client.new_request(Method::GET, Some("bkt"), None);
        client.send(req).await.unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].url.starts_with("http://localhost:9000/bkt"));
        assert!(sent[0].headers.contains_key("authorization"));
        assert!(sent[0].headers.contains_key("x-amz-date"));
    }

    #[tokio::test]
    async fn test_should_parse_service_error_response() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(
            404,
            br#"<Error><Code>NoSuchBucket</Code><Message>no bucket</Message></Error>"#.to_vec(),
        );
        let client = test_client(Arc::clone(&transport));

        let req = client.new_request(Method::GET, Some("bkt"), None);
        let err = client.send(req).await.unwrap_err();
        assert_eq!(err.service_code(), Some("NoSuchBucket"));
    }
}
