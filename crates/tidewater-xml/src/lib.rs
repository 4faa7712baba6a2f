//! S3 XML wire codec for Tidewater.
//!
//! The S3 REST protocol uses the RestXml convention with
//! `noErrorWrapping: true`. This crate converts between the
//! `tidewater-model` types and the XML documents the client sends and
//! receives.
//!
//! # Key components
//!
//! - [`XmlSerialize`] trait and [`to_xml`] for building request bodies
//!   (`CompleteMultipartUpload`, `CreateBucketConfiguration`)
//! - [`XmlDeserialize`] trait and [`from_xml`] for parsing response bodies
//!   (initiate/complete results, part and upload listings, bucket listings)
//! - [`parse_error_body`] for parsing `<Error>` responses
//!
//! # S3 XML conventions
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - Booleans: lowercase `true`/`false`
//! - Timestamps: ISO 8601 format (`2006-02-03T16:45:09.000Z`)
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

pub mod deserialize;
pub mod error;
pub mod serialize;

pub use deserialize::{XmlDeserialize, from_xml, parse_error_body};
pub use error::XmlError;
pub use serialize::{S3_NAMESPACE, XmlSerialize, to_xml};
