//! Signing error types.

/// Errors produced while signing a request or generating a presigned URL.
///
/// Anonymous signing is not an error; these cover malformed input only.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The presign expiry is outside the allowed window.
    #[error("expiry must be between 1 second and 7 days, got {0} seconds")]
    InvalidExpiry(u64),

    /// A region is required but was empty.
    #[error("a region is required to sign the request")]
    MissingRegion,

    /// A header value could not be represented on the wire.
    #[error("invalid header value for '{0}'")]
    InvalidHeaderValue(String),
}
