//! Typed response documents for the operations the client consumes.
//!
//! Each struct mirrors one of the XML result documents in the S3 REST
//! protocol, trimmed to the fields Tidewater reads. The XML layer fills
//! these in; missing optional elements stay `None`/empty.

use crate::types::{Bucket, MultipartUploadSummary, Owner, Part};

/// `InitiateMultipartUploadResult`.
#[derive(Debug, Clone, Default)]
pub struct InitiateMultipartUploadOutput {
    /// The bucket the upload was created in.
    pub bucket: String,
    /// The object key the upload targets.
    pub key: String,
    /// The upload identifier to use for subsequent part operations.
    pub upload_id: String,
}

/// `CompleteMultipartUploadResult`.
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartUploadOutput {
    /// URL of the assembled object.
    pub location: String,
    /// The bucket containing the object.
    pub bucket: String,
    /// The object key.
    pub key: String,
    /// ETag of the assembled object.
    pub etag: String,
}

/// `ListPartsResult` - one page of parts for an in-progress upload.
#[derive(Debug, Clone, Default)]
pub struct ListPartsOutput {
    /// The bucket the upload lives in.
    pub bucket: String,
    /// The object key.
    pub key: String,
    /// The upload these parts belong to.
    pub upload_id: String,
    /// The parts in this page, in ascending part-number order.
    pub parts: Vec<Part>,
    /// Marker to pass as `part-number-marker` for the next page.
    pub next_part_number_marker: Option<u32>,
    /// Whether more parts remain after this page.
    pub is_truncated: bool,
}

/// `ListMultipartUploadsResult` - one page of in-progress uploads.
#[derive(Debug, Clone, Default)]
pub struct ListMultipartUploadsOutput {
    /// The bucket that was listed.
    pub bucket: String,
    /// The uploads in this page.
    pub uploads: Vec<MultipartUploadSummary>,
    /// Marker to pass as `key-marker` for the next page.
    pub next_key_marker: Option<String>,
    /// Marker to pass as `upload-id-marker` for the next page.
    pub next_upload_id_marker: Option<String>,
    /// Whether more uploads remain after this page.
    pub is_truncated: bool,
}

/// `ListAllMyBucketsResult`.
#[derive(Debug, Clone, Default)]
pub struct ListBucketsOutput {
    /// The account owner.
    pub owner: Owner,
    /// All buckets owned by the caller.
    pub buckets: Vec<Bucket>,
}
