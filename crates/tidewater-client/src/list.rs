//! Pull-driven paginated listings.
//!
//! Listing operations are lazy sequences of pages: each
//! `next_page` call is one signed GET and one suspension point, and the
//! sequence ends when the server's truncation flag goes false. Dropping
//! a paginator mid-sequence simply stops pulling - listing is read-only,
//! so there is nothing to clean up server-side.

use http::Method;

use tidewater_model::output::{ListMultipartUploadsOutput, ListPartsOutput};
use tidewater_model::types::{MultipartUploadSummary, Part};

use crate::client::Client;
use crate::error::ClientError;

/// Page size requested from the server for part and upload listings.
const MAX_PAGE: u32 = 1000;

/// Lazily pages through the parts of an in-progress multipart upload.
#[derive(Debug)]
pub struct PartPaginator<'a> {
    client: &'a Client,
    bucket: String,
    key: String,
    upload_id: String,
    marker: Option<u32>,
    done: bool,
}

impl<'a> PartPaginator<'a> {
    pub(crate) fn new(client: &'a Client, bucket: &str, key: &str, upload_id: &str) -> Self {
        Self {
            client,
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            upload_id: upload_id.to_owned(),
            marker: None,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates service and transport errors from the page fetch.
    pub async fn next_page(&mut self) -> Result<Option<ListPartsOutput>, ClientError> {
        if self.done {
            return Ok(None);
        }

        let mut request =
            self.client
                .new_request(Method::GET, Some(&self.bucket), Some(&self.key));
        request.set_query("uploadId", &self.upload_id);
        request.set_query("max-parts", MAX_PAGE.to_string());
        if let Some(marker) = self.marker {
            request.set_query("part-number-marker", marker.to_string());
        }

        let response = self.client.send(request).await?;
        let page: ListPartsOutput = tidewater_xml::from_xml(&response.body)?;

        if page.is_truncated {
            self.marker = page.next_part_number_marker;
            // A truncated page without a marker cannot make progress.
            if self.marker.is_none() {
                self.done = true;
            }
        } else {
            self.done = true;
        }

        Ok(Some(page))
    }

    /// Drain the remaining pages into a flat part list.
    ///
    /// # Errors
    ///
    /// Propagates the first page fetch error.
    pub async fn collect(mut self) -> Result<Vec<Part>, ClientError> {
        let mut parts = Vec::new();
        while let Some(page) = self.next_page().await? {
            parts.extend(page.parts);
        }
        Ok(parts)
    }
}

/// Lazily pages through the incomplete multipart uploads of a bucket.
#[derive(Debug)]
pub struct UploadPaginator<'a> {
    client: &'a Client,
    bucket: String,
    prefix: Option<String>,
    key_marker: Option<String>,
    upload_id_marker: Option<String>,
    done: bool,
}

impl<'a> UploadPaginator<'a> {
    pub(crate) fn new(client: &'a Client, bucket: &str, prefix: Option<&str>) -> Self {
        Self {
            client,
            bucket: bucket.to_owned(),
            prefix: prefix.map(ToOwned::to_owned),
            key_marker: None,
            upload_id_marker: None,
            done: false,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates service and transport errors from the page fetch.
    pub async fn next_page(&mut self) -> Result<Option<ListMultipartUploadsOutput>, ClientError> {
        if self.done {
            return Ok(None);
        }

        let mut request = self.client.new_request(Method::GET, Some(&self.bucket), None);
        request.set_query("uploads", "");
        request.set_query("max-uploads", MAX_PAGE.to_string());
        if let Some(prefix) = &self.prefix {
            request.set_query("prefix", prefix);
        }
        if let Some(marker) = &self.key_marker {
            request.set_query("key-marker", marker);
        }
        if let Some(marker) = &self.upload_id_marker {
            request.set_query("upload-id-marker", marker);
        }

        let response = self.client.send(request).await?;
        let page: ListMultipartUploadsOutput = tidewater_xml::from_xml(&response.body)?;

        if page.is_truncated {
            self.key_marker = page.next_key_marker.clone();
            self.upload_id_marker = page.next_upload_id_marker.clone();
            if self.key_marker.is_none() && self.upload_id_marker.is_none() {
                self.done = true;
            }
        } else {
            self.done = true;
        }

        Ok(Some(page))
    }
}

impl Client {
    /// Page through the parts uploaded so far for a multipart upload.
    #[must_use]
    pub fn list_parts<'a>(
        &'a self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> PartPaginator<'a> {
        PartPaginator::new(self, bucket, key, upload_id)
    }

    /// Page through the bucket's incomplete multipart uploads,
    /// optionally filtered by key prefix.
    #[must_use]
    pub fn list_incomplete_uploads<'a>(
        &'a self,
        bucket: &str,
        prefix: Option<&str>,
    ) -> UploadPaginator<'a> {
        UploadPaginator::new(self, bucket, prefix)
    }

    /// Find the most recently initiated incomplete upload for an exact
    /// object key, if any.
    ///
    /// Recency is decided by lexicographic comparison of the raw
    /// ISO-8601 `Initiated` strings, exactly as the server reports them.
    pub(crate) async fn find_latest_incomplete_upload(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<Option<MultipartUploadSummary>, ClientError> {
        let mut paginator = self.list_incomplete_uploads(bucket, Some(key));
        let mut latest: Option<MultipartUploadSummary> = None;

        while let Some(page) = paginator.next_page().await? {
            for upload in page.uploads {
                if upload.key != key {
                    continue;
                }
                let newer = latest
                    .as_ref()
                    .is_none_or(|current| upload.initiated > current.initiated);
                if newer {
                    latest = Some(upload);
                }
            }
        }

        Ok(latest)
    }
}
