//! Bucket policy operations.
//!
//! These wrap the `?policy` endpoint around the policy engine:
//! `set_bucket_policy` is a read-modify-write of the JSON document, with
//! the statement rewriting delegated to
//! [`BucketPolicy::set_policy`](tidewater_policy::BucketPolicy::set_policy).

use bytes::Bytes;
use http::Method;
use tracing::debug;

use tidewater_model::error::ServiceErrorCode;
use tidewater_model::request::Payload;
use tidewater_policy::{BucketPolicy, PolicyKind};

use crate::client::Client;
use crate::error::ClientError;
use crate::validation::validate_bucket_name;

impl Client {
    /// Fetch a bucket's policy document.
    ///
    /// A bucket with no policy attached yields an empty document rather
    /// than an error.
    ///
    /// # Errors
    ///
    /// Propagates validation, parse, service, and transport errors.
    pub async fn get_bucket_policy(&self, bucket: &str) -> Result<BucketPolicy, ClientError> {
        validate_bucket_name(bucket)?;

        let mut request = self.new_request(Method::GET, Some(bucket), None);
        request.set_query("policy", "");

        match self.send(request).await {
            Ok(response) => Ok(BucketPolicy::from_json(&response.body, bucket)?),
            Err(ClientError::Service(err)) if err.code == ServiceErrorCode::NoSuchBucketPolicy => {
                Ok(BucketPolicy::new(bucket))
            }
            Err(err) => Err(err),
        }
    }

    /// The access level currently granted to a prefix.
    ///
    /// # Errors
    ///
    /// Propagates errors from fetching the policy document.
    pub async fn get_bucket_policy_kind(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<PolicyKind, ClientError> {
        Ok(self.get_bucket_policy(bucket).await?.get_policy(prefix))
    }

    /// Grant `kind` access to a prefix, rewriting the bucket's policy.
    ///
    /// Reads the current document, rewrites the prefix's statements, and
    /// writes the result back - or deletes the policy outright when the
    /// rewrite leaves no statements.
    ///
    /// # Errors
    ///
    /// Propagates validation, parse, service, and transport errors.
    pub async fn set_bucket_policy(
        &self,
        bucket: &str,
        kind: PolicyKind,
        prefix: &str,
    ) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;

        let mut policy = self.get_bucket_policy(bucket).await?;
        policy.set_policy(kind, prefix);

        if policy.is_empty() {
            self.delete_bucket_policy(bucket).await?;
            return Ok(());
        }

        let body = policy.to_json()?;
        let mut request = self.new_request(Method::PUT, Some(bucket), None);
        request.set_query("policy", "");
        request.payload = Payload::Bytes(Bytes::from(body.into_bytes()));

        self.send(request).await?;
        debug!(bucket, %kind, prefix, "updated bucket policy");
        Ok(())
    }

    /// Remove a bucket's policy document entirely.
    ///
    /// # Errors
    ///
    /// Propagates validation, service, and transport errors.
    pub async fn delete_bucket_policy(&self, bucket: &str) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;

        let mut request = self.new_request(Method::DELETE, Some(bucket), None);
        request.set_query("policy", "");

        match self.send(request).await {
            Ok(_) => Ok(()),
            // Deleting an absent policy is already the desired state.
            Err(ClientError::Service(err)) if err.code == ServiceErrorCode::NoSuchBucketPolicy => {
                Ok(())
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::{MockTransport, test_client};

    fn no_policy_error() -> Vec<u8> {
        br#"<Error><Code>NoSuchBucketPolicy</Code><Message>no policy</Message></Error>"#.to_vec()
    }

    #[tokio::test]
    async fn test_should_return_empty_policy_when_none_attached() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(404, no_policy_error());
        let client = test_client(Arc::clone(&transport));

        let policy = client.get_bucket_policy("bkt").await.unwrap();
        assert!(policy.is_empty());
        assert_eq!(policy.bucket_name, "bkt");
    }

    #[tokio::test]
    async fn test_should_set_read_only_policy_via_read_modify_write() {
        let transport = Arc::new(MockTransport::new());
        transport.push_error(404, no_policy_error());
        transport.push_ok(Vec::new());
        let client = test_client(Arc::clone(&transport));

        client
            .set_bucket_policy("bkt", PolicyKind::ReadOnly, "")
            .await
            .unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].method, Method::PUT);
        assert!(sent[1].url.contains("policy="));

        // The written document grants read on the whole bucket.
        let body = String::from_utf8(sent[1].body.to_vec()).unwrap();
        let written = BucketPolicy::from_json(body.as_bytes(), "bkt").unwrap();
        assert_eq!(written.get_policy(""), PolicyKind::ReadOnly);
        assert_eq!(written.statements.len(), 3);
    }

    #[tokio::test]
    async fn test_should_delete_policy_when_rewrite_empties_it() {
        let existing = {
            let mut policy = BucketPolicy::new("bkt");
            policy.set_policy(PolicyKind::ReadOnly, "");
            policy.to_json().unwrap()
        };

        let transport = Arc::new(MockTransport::new());
        transport.push_ok(existing.into_bytes());
        transport.push_ok(Vec::new());
        let client = test_client(Arc::clone(&transport));

        client
            .set_bucket_policy("bkt", PolicyKind::None, "")
            .await
            .unwrap();

        let sent = transport.requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[1].method, Method::DELETE);
        assert!(sent[1].url.contains("policy="));
    }

    #[tokio::test]
    async fn test_should_read_back_policy_kind() {
        let document = {
            let mut policy = BucketPolicy::new("bkt");
            policy.set_policy(PolicyKind::ReadWrite, "data/");
            policy.to_json().unwrap()
        };

        let transport = Arc::new(MockTransport::new());
        transport.push_ok(document.into_bytes());
        let client = test_client(Arc::clone(&transport));

        let kind = client.get_bucket_policy_kind("bkt", "data/").await.unwrap();
        assert_eq!(kind, PolicyKind::ReadWrite);
    }

    #[tokio::test]
    async fn test_should_surface_malformed_policy_json() {
        let transport = Arc::new(MockTransport::new());
        transport.push_ok(b"{broken".to_vec());
        let client = test_client(Arc::clone(&transport));

        let err = client.get_bucket_policy("bkt").await.unwrap_err();
        assert!(matches!(err, ClientError::Policy(_)));
    }
}
