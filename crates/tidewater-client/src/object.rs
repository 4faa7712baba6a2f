//! Single-shot object operations and presigned URLs.

use bytes::Bytes;
use http::Method;
use tracing::debug;

use tidewater_auth::presign::presign_v4;
use tidewater_model::request::Payload;

use crate::client::Client;
use crate::error::ClientError;
use crate::multipart::PutObjectResult;
use crate::validation::{validate_bucket_name, validate_object_key};

/// A downloaded object: its body plus the identity metadata the service
/// reported.
#[derive(Debug, Clone)]
pub struct GetObjectResult {
    /// The object body.
    pub body: Bytes,
    /// The object's ETag, quotes stripped.
    pub etag: String,
    /// The reported content type, if any.
    pub content_type: Option<String>,
}

impl Client {
    /// Upload a buffered payload in one signed PUT.
    pub(crate) async fn put_object_buffer(
        &self,
        bucket: &str,
        key: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<PutObjectResult, ClientError> {
        let size = data.len();
        let mut request = self.new_request(Method::PUT, Some(bucket), Some(key));
        if let Ok(value) = content_type.parse() {
            request.headers.insert("content-type", value);
        }
        request.payload = Payload::Bytes(data);

        let response = self.send(request).await?;
        let etag = response
            .header("etag")
            .unwrap_or_default()
            .trim_matches('"')
            .to_owned();
        debug!(bucket, key, size, %etag, "put object");

        Ok(PutObjectResult {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            etag,
        })
    }

    /// Download an object in full.
    ///
    /// # Errors
    ///
    /// Local validation errors are raised before any I/O; service errors
    /// (including `NoSuchKey`) and transport errors propagate typed.
    pub async fn get_object(&self, bucket: &str, key: &str) -> Result<GetObjectResult, ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let request = self.new_request(Method::GET, Some(bucket), Some(key));
        let response = self.send(request).await?;

        Ok(GetObjectResult {
            etag: response
                .header("etag")
                .unwrap_or_default()
                .trim_matches('"')
                .to_owned(),
            content_type: response.header("content-type").map(ToOwned::to_owned),
            body: response.body,
        })
    }

    /// Delete an object.
    ///
    /// Deleting a key that does not exist succeeds, matching the
    /// protocol's idempotent delete semantics.
    ///
    /// # Errors
    ///
    /// Propagates validation, service, and transport errors.
    pub async fn remove_object(&self, bucket: &str, key: &str) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let request = self.new_request(Method::DELETE, Some(bucket), Some(key));
        self.send(request).await?;
        debug!(bucket, key, "removed object");
        Ok(())
    }

    /// Generate a presigned GET URL for an object.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad names or an expiry outside
    /// `[1, 604800]` seconds. No network call is made.
    pub fn presigned_get_object(
        &self,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, ClientError> {
        self.presign(Method::GET, bucket, key, expires_secs)
    }

    /// Generate a presigned PUT URL for an object.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad names or an expiry outside
    /// `[1, 604800]` seconds. No network call is made.
    pub fn presigned_put_object(
        &self,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, ClientError> {
        self.presign(Method::PUT, bucket, key, expires_secs)
    }

    fn presign(
        &self,
        method: Method,
        bucket: &str,
        key: &str,
        expires_secs: u64,
    ) -> Result<String, ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        let request = self.new_request(method, Some(bucket), Some(key));
        let credentials = self.credentials.fetch();
        let url = presign_v4(
            &request,
            &credentials,
            &self.config.region,
            expires_secs,
            self.config.secure,
        )?;
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use http::HeaderMap;

    use crate::testing::{MockTransport, anonymous_test_client, test_client};

    #[tokio::test]
    async fn test_should_get_object_with_metadata() {
        let transport = Arc::new(MockTransport::new());
        let mut headers = HeaderMap::new();
        headers.insert("etag", "\"abc123\"".parse().unwrap());
        headers.insert("content-type", "text/plain".parse().unwrap());
        transport.push_response(200, headers, b"file contents".to_vec());
        let client = test_client(Arc::clone(&transport));

        let result = client.get_object("bkt", "obj.txt").await.unwrap();
        assert_eq!(result.body.as_ref(), b"file contents");
        assert_eq!(result.etag, "abc123");
        assert_eq!(result.content_type.as_deref(), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_should_surface_no_such_key() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(
            404,
            br#"<Error><Code>NoSuchKey</Code><Message>not found</Message></Error>"#.to_vec(),
        );
        let client = test_client(Arc::clone(&transport));

        let err = client.get_object("bkt", "missing").await.unwrap_err();
        assert_eq!(err.service_code(), Some("NoSuchKey"));
    }

    #[tokio::test]
    async fn test_should_remove_object() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(204, HeaderMap::new(), Vec::new());
        let client = test_client(Arc::clone(&transport));

        client.remove_object("bkt", "obj").await.unwrap();
        assert_eq!(transport.requests()[0].method, Method::DELETE);
    }

    #[test]
    fn test_should_presign_get_url_with_signature_params() {
        let client = test_client(Arc::new(MockTransport::new()));
        let url = client.presigned_get_object("bkt", "obj.txt", 3600).unwrap();

        assert!(url.starts_with("http://localhost:9000/bkt/obj.txt?"));
        assert!(url.contains("X-Amz-Algorithm=AWS4-HMAC-SHA256"));
        assert!(url.contains("X-Amz-Expires=3600"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[test]
    fn test_should_presign_anonymous_url_without_signature() {
        let client = anonymous_test_client(Arc::new(MockTransport::new()));
        let url = client.presigned_get_object("bkt", "obj.txt", 3600).unwrap();
        assert_eq!(url, "http://localhost:9000/bkt/obj.txt");
    }

    #[test]
    fn test_should_reject_presign_expiry_out_of_range() {
        let client = test_client(Arc::new(MockTransport::new()));
        assert!(client.presigned_get_object("bkt", "obj", 0).is_err());
        assert!(
            client
                .presigned_put_object("bkt", "obj", 7 * 24 * 3600 + 1)
                .is_err()
        );
    }
}
