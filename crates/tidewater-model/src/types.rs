//! Common wire entities shared across operations.
//!
//! These are plain data carriers: the XML layer populates them from
//! response bodies and the client hands them to callers. Field names
//! follow the S3 protocol vocabulary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The owner of a bucket or upload, as reported by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    /// Canonical user ID.
    pub id: String,
    /// Human-readable display name. May be empty on some services.
    pub display_name: String,
}

/// A bucket entry from `ListAllMyBucketsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// The bucket name.
    pub name: String,
    /// When the bucket was created.
    pub creation_date: DateTime<Utc>,
}

/// One part of a multipart upload, as reported by `ListParts`.
///
/// `part_number` is 1-based and strictly increasing within an upload.
/// The `etag` is the hex MD5 of the part body with surrounding quotes
/// stripped; it is the part's content identity during resume
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// 1-based part number, at most 10 000.
    pub part_number: u32,
    /// Entity tag: hex MD5 of the part body, quotes stripped.
    pub etag: String,
    /// Size of the part body in bytes.
    pub size: u64,
    /// When the part was uploaded, if the service reports it.
    pub last_modified: Option<DateTime<Utc>>,
}

impl Part {
    /// Compare this part's etag against a hex MD5 digest.
    ///
    /// The comparison ignores ASCII case and any surrounding quotes the
    /// service may have left on the etag.
    #[must_use]
    pub fn etag_matches(&self, hex_md5: &str) -> bool {
        let own = self.etag.trim_matches('"');
        own.eq_ignore_ascii_case(hex_md5.trim_matches('"'))
    }
}

/// A `(PartNumber, ETag)` pair submitted in `CompleteMultipartUpload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedPart {
    /// 1-based part number.
    pub part_number: u32,
    /// Entity tag returned when the part was uploaded.
    pub etag: String,
}

/// One in-progress upload from `ListMultipartUploadsResult`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUploadSummary {
    /// The object key the upload targets.
    pub key: String,
    /// The upload identifier assigned at initiation.
    pub upload_id: String,
    /// Initiation timestamp, kept as the raw ISO-8601 string so callers
    /// can order uploads by lexicographic comparison exactly as the
    /// service reports them.
    pub initiated: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_match_etag_ignoring_case_and_quotes() {
        let part = Part {
            part_number: 1,
            etag: "\"9BB58F26192E4BA00F01E2E7B136BBD8\"".to_owned(),
            size: 1024,
            last_modified: None,
        };
        assert!(part.etag_matches("9bb58f26192e4ba00f01e2e7b136bbd8"));
        assert!(part.etag_matches("\"9bb58f26192e4ba00f01e2e7b136bbd8\""));
        assert!(!part.etag_matches("deadbeef"));
    }

    #[test]
    fn test_should_order_upload_summaries_by_initiated_string() {
        let older = MultipartUploadSummary {
            key: "k".to_owned(),
            upload_id: "a".to_owned(),
            initiated: "2024-01-01T00:00:00.000Z".to_owned(),
        };
        let newer = MultipartUploadSummary {
            key: "k".to_owned(),
            upload_id: "b".to_owned(),
            initiated: "2024-06-01T00:00:00.000Z".to_owned(),
        };
        assert!(newer.initiated > older.initiated);
    }
}
