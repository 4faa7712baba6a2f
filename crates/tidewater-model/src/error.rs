//! Service error codes and the parsed error response.
//!
//! When the service answers with a non-success status, the body carries an
//! `<Error>` document with a code and message. [`ServiceError`] is that
//! document parsed into a typed value; [`ServiceErrorCode`] enumerates the
//! codes the client special-cases, with everything else preserved verbatim
//! in [`ServiceErrorCode::Other`].

use std::fmt;

/// Well-known S3 error codes the client inspects.
///
/// Only codes with client-side behavior attached get their own variant;
/// unrecognized codes round-trip through [`ServiceErrorCode::Other`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceErrorCode {
    /// The specified bucket does not exist.
    NoSuchBucket,
    /// The specified key does not exist.
    NoSuchKey,
    /// The specified multipart upload does not exist.
    NoSuchUpload,
    /// The bucket has no policy attached.
    NoSuchBucketPolicy,
    /// The proposed upload exceeds the maximum allowed object size.
    EntityTooLarge,
    /// The caller is not permitted to perform the operation.
    AccessDenied,
    /// A request parameter was malformed.
    InvalidArgument,
    /// Any code the client has no special handling for.
    Other(String),
}

impl ServiceErrorCode {
    /// Parse a wire error code string.
    #[must_use]
    pub fn parse(code: &str) -> Self {
        match code {
            "NoSuchBucket" => Self::NoSuchBucket,
            "NoSuchKey" => Self::NoSuchKey,
            "NoSuchUpload" => Self::NoSuchUpload,
            "NoSuchBucketPolicy" => Self::NoSuchBucketPolicy,
            "EntityTooLarge" => Self::EntityTooLarge,
            "AccessDenied" => Self::AccessDenied,
            "InvalidArgument" => Self::InvalidArgument,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The wire form of this code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::NoSuchBucket => "NoSuchBucket",
            Self::NoSuchKey => "NoSuchKey",
            Self::NoSuchUpload => "NoSuchUpload",
            Self::NoSuchBucketPolicy => "NoSuchBucketPolicy",
            Self::EntityTooLarge => "EntityTooLarge",
            Self::AccessDenied => "AccessDenied",
            Self::InvalidArgument => "InvalidArgument",
            Self::Other(code) => code,
        }
    }
}

impl fmt::Display for ServiceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed service error response.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ServiceError {
    /// The service error code.
    pub code: ServiceErrorCode,
    /// Human-readable message from the service.
    pub message: String,
    /// The resource the error refers to, when reported.
    pub resource: Option<String>,
    /// The service-assigned request ID, when reported.
    pub request_id: Option<String>,
    /// The HTTP status the error arrived with.
    pub status: u16,
}

impl ServiceError {
    /// Build an error from its code string and message, with no
    /// resource/request-id context.
    #[must_use]
    pub fn new(code: &str, message: impl Into<String>, status: u16) -> Self {
        Self {
            code: ServiceErrorCode::parse(code),
            message: message.into(),
            resource: None,
            request_id: None,
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_round_trip_known_codes() {
        for code in ["NoSuchBucket", "NoSuchUpload", "EntityTooLarge"] {
            assert_eq!(ServiceErrorCode::parse(code).as_str(), code);
        }
    }

    #[test]
    fn test_should_preserve_unknown_codes() {
        let code = ServiceErrorCode::parse("SlowDown");
        assert_eq!(code, ServiceErrorCode::Other("SlowDown".to_owned()));
        assert_eq!(code.as_str(), "SlowDown");
    }

    #[test]
    fn test_should_format_error_with_code_and_message() {
        let err = ServiceError::new("NoSuchBucket", "The specified bucket does not exist", 404);
        assert_eq!(
            err.to_string(),
            "NoSuchBucket: The specified bucket does not exist"
        );
    }
}
