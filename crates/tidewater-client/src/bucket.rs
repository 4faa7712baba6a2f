//! Bucket operations.

use bytes::Bytes;
use http::Method;
use tracing::debug;

use tidewater_model::error::ServiceErrorCode;
use tidewater_model::output::ListBucketsOutput;
use tidewater_model::request::Payload;
use tidewater_model::types::Bucket;
use tidewater_xml::serialize::CreateBucketConfiguration;

use crate::client::Client;
use crate::error::ClientError;
use crate::validation::validate_bucket_name;

impl Client {
    /// Whether a bucket exists and is reachable with these credentials.
    ///
    /// A `NoSuchBucket` answer (or a bare 404, since HEAD responses have
    /// no body) is converted to `Ok(false)` rather than an error - an
    /// absent bucket is an expected outcome of an existence check. Every
    /// other failure propagates.
    ///
    /// # Errors
    ///
    /// Propagates validation, service, and transport errors other than
    /// the not-found conversion described above.
    pub async fn bucket_exists(&self, bucket: &str) -> Result<bool, ClientError> {
        validate_bucket_name(bucket)?;

        let request = self.new_request(Method::HEAD, Some(bucket), None);
        match self.send(request).await {
            Ok(_) => Ok(true),
            Err(ClientError::Service(err))
                if err.code == ServiceErrorCode::NoSuchBucket || err.status == 404 =>
            {
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Create a bucket in the configured region.
    ///
    /// # Errors
    ///
    /// Propagates validation, service, and transport errors.
    pub async fn make_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;

        let mut request = self.new_request(Method::PUT, Some(bucket), None);
        // us-east-1 is the protocol default and must not be sent as a
        // location constraint.
        if self.config.region != "us-east-1" {
            let body = tidewater_xml::to_xml(
                "CreateBucketConfiguration",
                &CreateBucketConfiguration {
                    location_constraint: self.config.region.clone(),
                },
            )?;
            request.payload = Payload::Bytes(Bytes::from(body));
        }

        self.send(request).await?;
        debug!(bucket, region = %self.config.region, "created bucket");
        Ok(())
    }

    /// Delete an empty bucket.
    ///
    /// # Errors
    ///
    /// Propagates validation, service, and transport errors.
    pub async fn remove_bucket(&self, bucket: &str) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;

        let request = self.new_request(Method::DELETE, Some(bucket), None);
        self.send(request).await?;
        debug!(bucket, "removed bucket");
        Ok(())
    }

    /// List every bucket the credentials own.
    ///
    /// # Errors
    ///
    /// Propagates service and transport errors.
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>, ClientError> {
        let request = self.new_request(Method::GET, None, None);
        let response = self.send(request).await?;
        let output: ListBucketsOutput = tidewater_xml::from_xml(&response.body)?;
        Ok(output.buckets)
    }
}
