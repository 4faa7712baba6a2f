//! Multipart upload orchestration.
//!
//! Large payloads are uploaded part by part, sequentially, in ascending
//! part-number order. An interrupted upload leaves its parts on the
//! server; the next `put_object` for the same key finds the most recent
//! incomplete upload, fetches its part list, and re-uploads only the
//! parts whose content no longer matches - reuse is decided by MD5
//! comparison against the server ETag, never by size alone.
//!
//! Failures propagate immediately and the incomplete upload is left in
//! place for a future resume; the orchestrator neither retries nor
//! auto-aborts.

use std::collections::BTreeMap;
use std::io;

use bytes::Bytes;
use http::Method;
use md5::{Digest, Md5};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use tidewater_model::output::{CompleteMultipartUploadOutput, InitiateMultipartUploadOutput};
use tidewater_model::request::Payload;
use tidewater_model::types::{CompletedPart, Part};
use tidewater_xml::serialize::CompleteMultipartUpload;

use crate::client::Client;
use crate::error::ClientError;
use crate::planner::{MIN_PART_SIZE, calculate_part_size};
use crate::validation::{validate_bucket_name, validate_object_key};

/// Content type applied when the caller does not specify one.
pub(crate) const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The outcome of a successful `put_object`.
#[derive(Debug, Clone)]
pub struct PutObjectResult {
    /// The bucket written to.
    pub bucket: String,
    /// The object key written.
    pub key: String,
    /// The object's ETag as reported by the service.
    pub etag: String,
}

/// Read exactly `want` bytes, tolerating short reads.
///
/// Keeps reading until the buffer is full or the source is exhausted;
/// a truncated (possibly empty) buffer is a normal outcome, not an
/// error.
pub(crate) async fn read_full<R: AsyncRead + Unpin>(
    reader: &mut R,
    want: u64,
) -> io::Result<Bytes> {
    let want = usize::try_from(want)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "part size exceeds usize"))?;

    let mut buf = vec![0u8; want];
    let mut filled = 0;
    while filled < want {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    buf.truncate(filled);
    Ok(Bytes::from(buf))
}

impl Client {
    /// Upload an object, choosing single-shot or multipart by size.
    ///
    /// Payloads at or below the minimum part size go up in one signed
    /// PUT. Anything larger (or of unknown size, `size = None`) goes
    /// through the multipart flow with resume support. The source is
    /// read with short-read tolerance: a source that ends early simply
    /// produces a shorter object.
    ///
    /// # Errors
    ///
    /// Validation errors are raised before any I/O; service and
    /// transport errors propagate from the first failing call, leaving
    /// any incomplete upload on the server for a later resume.
    pub async fn put_object<R>(
        &self,
        bucket: &str,
        key: &str,
        mut reader: R,
        size: Option<u64>,
        content_type: Option<&str>,
    ) -> Result<PutObjectResult, ClientError>
    where
        R: AsyncRead + Unpin + Send,
    {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;
        let content_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);

        if let Some(size) = size {
            if size <= MIN_PART_SIZE {
                let data = read_full(&mut reader, size).await?;
                return self.put_object_buffer(bucket, key, data, content_type).await;
            }
        }

        self.put_object_multipart(bucket, key, reader, size, content_type)
            .await
    }

    /// The multipart flow: plan, resume-or-initiate, upload, complete.
    async fn put_object_multipart<R>(
        &self,
        bucket: &str,
        key: &str,
        mut reader: R,
        size: Option<u64>,
        content_type: &str,
    ) -> Result<PutObjectResult, ClientError>
    where
        R: AsyncRead + Unpin + Send,
    {
        let plan = calculate_part_size(size)?;

        // Resume the most recent incomplete upload when one exists; the
        // server-side part list is only worth fetching in that case.
        let (upload_id, existing) = match self.find_latest_incomplete_upload(bucket, key).await? {
            Some(upload) => {
                debug!(bucket, key, upload_id = %upload.upload_id, "resuming incomplete upload");
                let parts = self
                    .fetch_existing_parts(bucket, key, &upload.upload_id)
                    .await?;
                (upload.upload_id, parts)
            }
            None => {
                let initiated = self
                    .create_multipart_upload(bucket, key, content_type)
                    .await?;
                (initiated.upload_id, BTreeMap::new())
            }
        };

        let mut completed: Vec<CompletedPart> = Vec::new();
        for part_number in 1..=plan.part_count {
            let want = if size.is_some() && part_number == plan.part_count {
                plan.last_part_size
            } else {
                plan.part_size
            };

            let data = read_full(&mut reader, want).await?;
            let got = data.len() as u64;
            if data.is_empty() && part_number > 1 {
                // Source exhausted on a part boundary.
                break;
            }

            let local_md5 = hex::encode(Md5::digest(&data));
            let reusable = existing.get(&part_number).filter(|part| {
                part.size == got && part.etag_matches(&local_md5)
            });

            match reusable {
                Some(part) => {
                    debug!(part_number, "part content matches server copy; skipping upload");
                    completed.push(CompletedPart {
                        part_number,
                        etag: part.etag.clone(),
                    });
                }
                None => {
                    let etag = self
                        .upload_part(bucket, key, &upload_id, part_number, data)
                        .await?;
                    completed.push(CompletedPart { part_number, etag });
                }
            }

            if got < want {
                // The source ended mid-part; what was read is the final part.
                break;
            }
        }

        let output = self
            .complete_multipart_upload(bucket, key, &upload_id, completed)
            .await?;

        Ok(PutObjectResult {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            etag: output.etag.trim_matches('"').to_owned(),
        })
    }

    /// Initiate a multipart upload and obtain its upload ID.
    pub(crate) async fn create_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> Result<InitiateMultipartUploadOutput, ClientError> {
        let mut request = self.new_request(Method::POST, Some(bucket), Some(key));
        request.set_query("uploads", "");
        if let Ok(value) = content_type.parse() {
            request.headers.insert("content-type", value);
        }

        let response = self.send(request).await?;
        let output: InitiateMultipartUploadOutput = tidewater_xml::from_xml(&response.body)?;
        debug!(bucket, key, upload_id = %output.upload_id, "initiated multipart upload");
        Ok(output)
    }

    /// Upload one part and return its ETag (quotes stripped).
    pub(crate) async fn upload_part(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        part_number: u32,
        data: Bytes,
    ) -> Result<String, ClientError> {
        if !(1..=10_000).contains(&part_number) {
            return Err(ClientError::InvalidArgument {
                message: format!("part number must be between 1 and 10000, got {part_number}"),
            });
        }

        let size = data.len();
        let mut request = self.new_request(Method::PUT, Some(bucket), Some(key));
        request.set_query("partNumber", part_number.to_string());
        request.set_query("uploadId", upload_id);
        request.payload = Payload::Bytes(data);

        let response = self.send(request).await?;
        let etag = response
            .header("etag")
            .unwrap_or_default()
            .trim_matches('"')
            .to_owned();
        debug!(bucket, key, part_number, size, %etag, "uploaded part");
        Ok(etag)
    }

    /// Commit a multipart upload from its `(part number, etag)` pairs.
    ///
    /// Parts are submitted in ascending part-number order as the
    /// protocol requires, regardless of the order given.
    pub(crate) async fn complete_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
        mut parts: Vec<CompletedPart>,
    ) -> Result<CompleteMultipartUploadOutput, ClientError> {
        parts.sort_by_key(|part| part.part_number);

        let body = tidewater_xml::to_xml(
            "CompleteMultipartUpload",
            &CompleteMultipartUpload { parts },
        )?;

        let mut request = self.new_request(Method::POST, Some(bucket), Some(key));
        request.set_query("uploadId", upload_id);
        request.payload = Payload::Bytes(Bytes::from(body));

        let response = self.send(request).await?;
        let output: CompleteMultipartUploadOutput = tidewater_xml::from_xml(&response.body)?;
        debug!(bucket, key, upload_id, "completed multipart upload");
        Ok(output)
    }

    /// Abort a multipart upload, discarding its parts server-side.
    ///
    /// # Errors
    ///
    /// Propagates service and transport errors.
    pub async fn abort_multipart_upload(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<(), ClientError> {
        let mut request = self.new_request(Method::DELETE, Some(bucket), Some(key));
        request.set_query("uploadId", upload_id);
        self.send(request).await?;
        debug!(bucket, key, upload_id, "aborted multipart upload");
        Ok(())
    }

    /// Abort every incomplete upload for an exact object key.
    ///
    /// # Errors
    ///
    /// Propagates service and transport errors from listing or aborting.
    pub async fn remove_incomplete_upload(
        &self,
        bucket: &str,
        key: &str,
    ) -> Result<(), ClientError> {
        validate_bucket_name(bucket)?;
        validate_object_key(key)?;

        // Collect first: aborting while paginating would invalidate the
        // listing markers.
        let mut upload_ids = Vec::new();
        let mut paginator = self.list_incomplete_uploads(bucket, Some(key));
        while let Some(page) = paginator.next_page().await? {
            upload_ids.extend(
                page.uploads
                    .into_iter()
                    .filter(|upload| upload.key == key)
                    .map(|upload| upload.upload_id),
            );
        }

        for upload_id in upload_ids {
            self.abort_multipart_upload(bucket, key, &upload_id).await?;
        }
        Ok(())
    }

    /// Fetch all server-side parts of an upload, keyed by part number.
    async fn fetch_existing_parts(
        &self,
        bucket: &str,
        key: &str,
        upload_id: &str,
    ) -> Result<BTreeMap<u32, Part>, ClientError> {
        let parts = self.list_parts(bucket, key, upload_id).collect().await?;
        Ok(parts
            .into_iter()
            .map(|part| (part.part_number, part))
            .collect())
    }
}
