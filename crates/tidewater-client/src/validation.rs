//! Validation for bucket names and object keys.
//!
//! Follows the rules defined in the
//! [Amazon S3 documentation](https://docs.aws.amazon.com/AmazonS3/latest/userguide/bucketnamingrules.html).
//! All validation runs locally, before any network call.

use std::net::Ipv4Addr;

use crate::error::ClientError;

/// Minimum bucket name length.
const MIN_BUCKET_NAME_LEN: usize = 3;

/// Maximum bucket name length.
const MAX_BUCKET_NAME_LEN: usize = 63;

/// Maximum object key length in bytes.
const MAX_KEY_BYTES: usize = 1024;

/// Validate an S3 bucket name.
///
/// Rules (per AWS documentation):
/// - 3-63 characters long
/// - Only lowercase letters, numbers, hyphens, and dots
/// - Must start and end with a letter or number
/// - No consecutive dots (`..`)
/// - Not formatted as an IPv4 address (e.g. `192.168.0.1`)
/// - Must not start with `xn--`
///
/// # Errors
///
/// Returns [`ClientError::InvalidBucketName`] if any rule is violated.
///
/// # Examples
///
/// ```
/// use tidewater_client::validation::validate_bucket_name;
///
/// assert!(validate_bucket_name("my-valid-bucket").is_ok());
/// assert!(validate_bucket_name("AB").is_err());
/// ```
pub fn validate_bucket_name(name: &str) -> Result<(), ClientError> {
    let len = name.len();

    if !(MIN_BUCKET_NAME_LEN..=MAX_BUCKET_NAME_LEN).contains(&len) {
        return Err(ClientError::InvalidBucketName {
            name: name.to_owned(),
            reason: format!(
                "bucket name must be between {MIN_BUCKET_NAME_LEN} and {MAX_BUCKET_NAME_LEN} characters long"
            ),
        });
    }

    if !name
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'.')
    {
        return Err(ClientError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must only contain lowercase letters, numbers, hyphens, and dots"
                .to_owned(),
        });
    }

    let first = name.as_bytes()[0];
    let last = name.as_bytes()[len - 1];
    if !(first.is_ascii_lowercase() || first.is_ascii_digit())
        || !(last.is_ascii_lowercase() || last.is_ascii_digit())
    {
        return Err(ClientError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must start and end with a letter or number".to_owned(),
        });
    }

    if name.contains("..") {
        return Err(ClientError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not contain consecutive dots".to_owned(),
        });
    }

    if name.parse::<Ipv4Addr>().is_ok() {
        return Err(ClientError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not be formatted as an IP address".to_owned(),
        });
    }

    if name.starts_with("xn--") {
        return Err(ClientError::InvalidBucketName {
            name: name.to_owned(),
            reason: "bucket name must not start with 'xn--'".to_owned(),
        });
    }

    Ok(())
}

/// Validate an S3 object key.
///
/// Rules:
/// - 1-1024 bytes in length
/// - Must be valid UTF-8 (enforced by the `&str` type)
///
/// # Errors
///
/// Returns [`ClientError::InvalidObjectKey`] if the key is empty or too
/// long.
pub fn validate_object_key(key: &str) -> Result<(), ClientError> {
    if key.is_empty() {
        return Err(ClientError::InvalidObjectKey {
            reason: "object key must not be empty".to_owned(),
        });
    }

    if key.len() > MAX_KEY_BYTES {
        return Err(ClientError::InvalidObjectKey {
            reason: format!("object key must not exceed {MAX_KEY_BYTES} bytes"),
        });
    }

    Ok(())
}
