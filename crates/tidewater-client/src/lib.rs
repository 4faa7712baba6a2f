//! Async client for S3-compatible object storage.
//!
//! Tidewater's client crate ties the signing engine, the XML wire codec,
//! and the policy engine together behind a [`Client`]:
//!
//! - object I/O with automatic multipart orchestration and resume
//!   ([`Client::put_object`], [`Client::get_object`]),
//! - lazy paginated listings ([`Client::list_parts`],
//!   [`Client::list_incomplete_uploads`]),
//! - bucket management ([`Client::bucket_exists`],
//!   [`Client::make_bucket`]),
//! - prefix-scoped bucket policies ([`Client::set_bucket_policy`]),
//! - presigned URLs ([`Client::presigned_get_object`]).
//!
//! # Example
//!
//! ```no_run
//! use tidewater_client::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tidewater_client::ClientError> {
//!     let client = Client::new(ClientConfig::from_env());
//!
//!     if !client.bucket_exists("backups").await? {
//!         client.make_bucket("backups").await?;
//!     }
//!
//!     let payload = tokio::fs::File::open("snapshot.tar").await?;
//!     let size = payload.metadata().await?.len();
//!     client
//!         .put_object("backups", "snapshot.tar", payload, Some(size), None)
//!         .await?;
//!     Ok(())
//! }
//! ```
//!
//! # Concurrency
//!
//! A [`Client`] is shareable: operations sign independently and share no
//! mutable state. Part uploads within one `put_object` run sequentially
//! in ascending part-number order; each network call is a cooperative
//! suspension point, and cancelling (dropping) an upload future leaves
//! the server-side incomplete upload available for a later resume.

pub mod bucket;
pub mod client;
pub mod config;
pub mod error;
pub mod list;
pub mod multipart;
pub mod object;
pub mod planner;
pub mod policy_ops;
pub mod transport;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use client::Client;
pub use config::ClientConfig;
pub use error::ClientError;
pub use list::{PartPaginator, UploadPaginator};
pub use multipart::PutObjectResult;
pub use object::GetObjectResult;
pub use planner::{MAX_MULTIPART_OBJECT_SIZE, MAX_PARTS, MIN_PART_SIZE, PartPlan, calculate_part_size};
pub use transport::{HttpTransport, Transport, TransportError, TransportRequest, TransportResponse};
