//! Client error taxonomy.
//!
//! Four families, kept distinct so callers can react sensibly:
//!
//! - validation errors are raised locally before any I/O;
//! - service errors carry the code and message the service answered with;
//! - transport errors are connection-level failures (refused, timeout,
//!   TLS) surfaced as-is - the client never retries internally;
//! - codec errors cover malformed XML or policy JSON.

use tidewater_auth::AuthError;
use tidewater_model::error::ServiceError;
use tidewater_policy::PolicyError;
use tidewater_xml::XmlError;

use crate::transport::TransportError;

/// Any error a client operation can produce.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The bucket name violates the naming rules.
    #[error("invalid bucket name '{name}': {reason}")]
    InvalidBucketName {
        /// The offending name.
        name: String,
        /// Which rule was violated.
        reason: String,
    },

    /// The object key violates the key rules.
    #[error("invalid object key: {reason}")]
    InvalidObjectKey {
        /// Which rule was violated.
        reason: String,
    },

    /// A local argument check failed before any network call.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// The payload exceeds the maximum multipart object size.
    #[error("entity too large: proposed size {size} exceeds maximum {max}")]
    EntityTooLarge {
        /// The proposed object size in bytes.
        size: u64,
        /// The maximum allowed size in bytes.
        max: u64,
    },

    /// The service answered with an error document.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The transport failed before a response arrived.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response body could not be decoded.
    #[error(transparent)]
    Xml(#[from] XmlError),

    /// Signing failed on malformed input.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A bucket policy document could not be parsed or manipulated.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Reading the upload source failed.
    #[error("failed to read upload source: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// The service error code, when this is a service error.
    #[must_use]
    pub fn service_code(&self) -> Option<&str> {
        match self {
            Self::Service(err) => Some(err.code.as_str()),
            _ => None,
        }
    }
}
