//! Data model for the Tidewater S3-compatible storage client.
//!
//! This crate defines the plain data types shared by the other Tidewater
//! crates: credentials-free request descriptions, multipart upload parts,
//! bucket listings, and the service error vocabulary. It performs no I/O
//! and has no opinion on transport or serialization; the `tidewater-xml`
//! crate maps these types onto the S3 REST/XML wire format and
//! `tidewater-client` drives them over HTTP.
//!
//! # Modules
//!
//! - [`error`] - Service error codes and the parsed error response
//! - [`output`] - Typed response documents for the operations the client consumes
//! - [`request`] - The signable HTTP request description
//! - [`types`] - Common wire entities (parts, uploads, buckets, owners)

pub mod error;
pub mod output;
pub mod request;
pub mod types;

pub use error::{ServiceError, ServiceErrorCode};
pub use request::{Payload, SignableRequest};
pub use types::{Bucket, CompletedPart, MultipartUploadSummary, Owner, Part};
