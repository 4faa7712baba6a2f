//! Parsing of S3-compatible XML response bodies into typed values.
//!
//! This module provides the [`XmlDeserialize`] trait and implementations
//! for the result documents the client consumes, following the AWS
//! RestXml protocol conventions. Parsing is event-driven over
//! `quick_xml::Reader`; unknown elements are skipped so the codec
//! tolerates servers that report extra fields.

use quick_xml::Reader;
use quick_xml::events::Event;

use tidewater_model::error::ServiceError;
use tidewater_model::output::{
    CompleteMultipartUploadOutput, InitiateMultipartUploadOutput, ListBucketsOutput,
    ListMultipartUploadsOutput, ListPartsOutput,
};
use tidewater_model::types::{Bucket, MultipartUploadSummary, Owner, Part};

use crate::error::XmlError;

/// Trait for deserializing response documents from XML.
///
/// The root element has already been consumed by the caller; the
/// implementation reads child elements until the matching end tag.
pub trait XmlDeserialize: Sized {
    /// Deserialize an instance from the given XML reader.
    ///
    /// The reader is positioned just after the opening tag of this
    /// element. The implementation reads all child content and returns
    /// when the matching end tag is consumed.
    ///
    /// # Errors
    ///
    /// Returns `XmlError` if the XML is malformed or required fields are
    /// missing.
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError>;
}

/// Deserialize S3-compatible XML into a typed value.
///
/// Finds the root element and delegates to the type's [`XmlDeserialize`]
/// implementation.
///
/// # Errors
///
/// Returns `XmlError` if the XML is malformed or deserialization fails.
pub fn from_xml<T: XmlDeserialize>(xml: &[u8]) -> Result<T, XmlError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    // Skip the XML declaration and find the root element.
    loop {
        match reader.read_event()? {
            Event::Start(_) => {
                return T::deserialize_xml(&mut reader);
            }
            Event::Eof => {
                return Err(XmlError::MissingElement("root element".to_owned()));
            }
            _ => {}
        }
    }
}

/// Parse an `<Error>` response body into a [`ServiceError`].
///
/// Servers are not obliged to send a body on every failure; when the body
/// is empty or unparseable the returned error carries the HTTP status and
/// an empty code so the caller can still surface something meaningful.
#[must_use]
pub fn parse_error_body(xml: &[u8], status: u16) -> ServiceError {
    match from_xml::<ErrorDocument>(xml) {
        Ok(doc) => ServiceError {
            code: tidewater_model::error::ServiceErrorCode::parse(&doc.code),
            message: doc.message,
            resource: doc.resource,
            request_id: doc.request_id,
            status,
        },
        Err(e) => {
            tracing::debug!(error = %e, status, "unparseable error response body");
            ServiceError::new("", format!("HTTP {status} with unparseable body"), status)
        }
    }
}

/// The raw fields of an `<Error>` document.
#[derive(Debug, Default)]
struct ErrorDocument {
    code: String,
    message: String,
    resource: Option<String>,
    request_id: Option<String>,
}

// ---------------------------------------------------------------------------
// Helper functions for reading common XML patterns
// ---------------------------------------------------------------------------

/// Read the text content of the current element and consume its end tag.
fn read_text_content(reader: &mut Reader<&[u8]>) -> Result<String, XmlError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(e) => {
                let decoded = e
                    .decode()
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                let unescaped = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| XmlError::ParseError(err.to_string()))?;
                text.push_str(&unescaped);
            }
            Event::End(_) => {
                return Ok(text);
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while reading text content".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Skip over an element and all its children.
fn skip_element(reader: &mut Reader<&[u8]>) -> Result<(), XmlError> {
    let mut depth: u32 = 1;
    loop {
        match reader.read_event()? {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF while skipping element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

/// Parse a boolean from XML text ("true"/"false").
fn parse_bool(s: &str) -> Result<bool, XmlError> {
    match s {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(XmlError::ParseError(format!("invalid boolean: {s}"))),
    }
}

/// Parse a u32 from XML text.
fn parse_u32(s: &str) -> Result<u32, XmlError> {
    s.parse::<u32>()
        .map_err(|e| XmlError::ParseError(format!("invalid u32 '{s}': {e}")))
}

/// Parse a u64 from XML text.
fn parse_u64(s: &str) -> Result<u64, XmlError> {
    s.parse::<u64>()
        .map_err(|e| XmlError::ParseError(format!("invalid u64 '{s}': {e}")))
}

/// Parse an ISO 8601 timestamp from XML text.
fn parse_timestamp(s: &str) -> Result<chrono::DateTime<chrono::Utc>, XmlError> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .or_else(|_| {
            // The S3 format: 2006-02-03T16:45:09.000Z
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.fZ")
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| XmlError::ParseError(format!("invalid timestamp '{s}': {e}")))
}

/// Dispatch over the child elements of the current element.
///
/// Calls `on_child` with each child element's name; the callback must
/// consume the child (via [`read_text_content`], a nested deserialize, or
/// [`skip_element`]). Returns when the current element's end tag is
/// consumed.
fn for_each_child(
    reader: &mut Reader<&[u8]>,
    mut on_child: impl FnMut(&str, &mut Reader<&[u8]>) -> Result<(), XmlError>,
) -> Result<(), XmlError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name();
                let tag = std::str::from_utf8(name.as_ref())
                    .map_err(|err| XmlError::ParseError(err.to_string()))?
                    .to_owned();
                on_child(&tag, reader)?;
            }
            Event::Empty(_) => {}
            Event::End(_) => return Ok(()),
            Event::Eof => {
                return Err(XmlError::UnexpectedElement(
                    "unexpected EOF inside element".to_owned(),
                ));
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Document implementations
// ---------------------------------------------------------------------------

impl XmlDeserialize for ErrorDocument {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut doc = ErrorDocument::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Code" => doc.code = read_text_content(r)?,
                "Message" => doc.message = read_text_content(r)?,
                "Resource" => doc.resource = Some(read_text_content(r)?),
                "RequestId" => doc.request_id = Some(read_text_content(r)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(doc)
    }
}

impl XmlDeserialize for InitiateMultipartUploadOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = InitiateMultipartUploadOutput::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Bucket" => out.bucket = read_text_content(r)?,
                "Key" => out.key = read_text_content(r)?,
                "UploadId" => out.upload_id = read_text_content(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        if out.upload_id.is_empty() {
            return Err(XmlError::MissingElement("UploadId".to_owned()));
        }
        Ok(out)
    }
}

impl XmlDeserialize for CompleteMultipartUploadOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = CompleteMultipartUploadOutput::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Location" => out.location = read_text_content(r)?,
                "Bucket" => out.bucket = read_text_content(r)?,
                "Key" => out.key = read_text_content(r)?,
                "ETag" => out.etag = read_text_content(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl XmlDeserialize for Part {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut part_number = None;
        let mut etag = String::new();
        let mut size = 0;
        let mut last_modified = None;

        for_each_child(reader, |tag, r| {
            match tag {
                "PartNumber" => part_number = Some(parse_u32(&read_text_content(r)?)?),
                "ETag" => etag = read_text_content(r)?.trim_matches('"').to_owned(),
                "Size" => size = parse_u64(&read_text_content(r)?)?,
                "LastModified" => last_modified = Some(parse_timestamp(&read_text_content(r)?)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(Part {
            part_number: part_number
                .ok_or_else(|| XmlError::MissingElement("PartNumber".to_owned()))?,
            etag,
            size,
            last_modified,
        })
    }
}

impl XmlDeserialize for ListPartsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = ListPartsOutput::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Bucket" => out.bucket = read_text_content(r)?,
                "Key" => out.key = read_text_content(r)?,
                "UploadId" => out.upload_id = read_text_content(r)?,
                "Part" => out.parts.push(Part::deserialize_xml(r)?),
                "NextPartNumberMarker" => {
                    out.next_part_number_marker = Some(parse_u32(&read_text_content(r)?)?);
                }
                "IsTruncated" => out.is_truncated = parse_bool(&read_text_content(r)?)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl XmlDeserialize for MultipartUploadSummary {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut key = String::new();
        let mut upload_id = String::new();
        let mut initiated = String::new();

        for_each_child(reader, |tag, r| {
            match tag {
                "Key" => key = read_text_content(r)?,
                "UploadId" => upload_id = read_text_content(r)?,
                "Initiated" => initiated = read_text_content(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(MultipartUploadSummary {
            key,
            upload_id,
            initiated,
        })
    }
}

impl XmlDeserialize for ListMultipartUploadsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = ListMultipartUploadsOutput::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Bucket" => out.bucket = read_text_content(r)?,
                "Upload" => out
                    .uploads
                    .push(MultipartUploadSummary::deserialize_xml(r)?),
                "NextKeyMarker" => out.next_key_marker = Some(read_text_content(r)?),
                "NextUploadIdMarker" => out.next_upload_id_marker = Some(read_text_content(r)?),
                "IsTruncated" => out.is_truncated = parse_bool(&read_text_content(r)?)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}

impl XmlDeserialize for Owner {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut owner = Owner::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "ID" => owner.id = read_text_content(r)?,
                "DisplayName" => owner.display_name = read_text_content(r)?,
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(owner)
    }
}

impl XmlDeserialize for Bucket {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut name = String::new();
        let mut creation_date = None;

        for_each_child(reader, |tag, r| {
            match tag {
                "Name" => name = read_text_content(r)?,
                "CreationDate" => creation_date = Some(parse_timestamp(&read_text_content(r)?)?),
                _ => skip_element(r)?,
            }
            Ok(())
        })?;

        Ok(Bucket {
            name,
            creation_date: creation_date
                .ok_or_else(|| XmlError::MissingElement("CreationDate".to_owned()))?,
        })
    }
}

impl XmlDeserialize for ListBucketsOutput {
    fn deserialize_xml(reader: &mut Reader<&[u8]>) -> Result<Self, XmlError> {
        let mut out = ListBucketsOutput::default();
        for_each_child(reader, |tag, r| {
            match tag {
                "Owner" => out.owner = Owner::deserialize_xml(r)?,
                "Buckets" => {
                    for_each_child(r, |inner, r2| {
                        match inner {
                            "Bucket" => out.buckets.push(Bucket::deserialize_xml(r2)?),
                            _ => skip_element(r2)?,
                        }
                        Ok(())
                    })?;
                }
                _ => skip_element(r)?,
            }
            Ok(())
        })?;
        Ok(out)
    }
}
