//! Serialization of request bodies to S3-compatible XML.
//!
//! The client sends only two XML request bodies: the part manifest for
//! `CompleteMultipartUpload` and the location constraint for bucket
//! creation. Both follow the AWS RestXml conventions:
//!
//! - Namespace: `http://s3.amazonaws.com/doc/2006-03-01/`
//! - XML declaration: `<?xml version="1.0" encoding="UTF-8"?>`

use std::io::{self, Write};

use quick_xml::Writer;
use quick_xml::events::{BytesText, Event};

use tidewater_model::types::CompletedPart;

use crate::error::XmlError;

/// The S3 XML namespace.
pub const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

/// Trait for serializing request bodies to XML.
///
/// Implementors write their content as child elements inside the current
/// XML context. The root element name and namespace are handled by the
/// top-level [`to_xml`] function.
///
/// Uses `io::Result` because `quick_xml::Writer` closures require
/// `io::Result<()>`.
pub trait XmlSerialize {
    /// Serialize this value as XML child elements into the given writer.
    ///
    /// # Errors
    ///
    /// Returns `io::Error` if writing to the underlying writer fails.
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Serialize a value as S3-compatible XML with declaration and namespace.
///
/// # Errors
///
/// Returns `XmlError` if serialization fails.
pub fn to_xml<T: XmlSerialize>(root_element: &str, value: &T) -> Result<Vec<u8>, XmlError> {
    let mut buf = Vec::with_capacity(512);
    let mut writer = Writer::new(&mut buf);

    writer.write_event(Event::Decl(quick_xml::events::BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        None,
    )))?;

    writer
        .create_element(root_element)
        .with_attribute(("xmlns", S3_NAMESPACE))
        .write_inner_content(|w| value.serialize_xml(w))?;

    Ok(buf)
}

/// Write a simple `<tag>text</tag>` element.
fn write_text_element<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> io::Result<()> {
    writer
        .create_element(tag)
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

/// The body of a `CompleteMultipartUpload` request: the `(PartNumber,
/// ETag)` pairs in ascending part-number order.
#[derive(Debug, Clone, Default)]
pub struct CompleteMultipartUpload {
    /// The parts to assemble, ascending by part number.
    pub parts: Vec<CompletedPart>,
}

impl XmlSerialize for CompleteMultipartUpload {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        for part in &self.parts {
            writer.create_element("Part").write_inner_content(|w| {
                write_text_element(w, "PartNumber", &part.part_number.to_string())?;
                write_text_element(w, "ETag", &part.etag)?;
                Ok(())
            })?;
        }
        Ok(())
    }
}

/// The body of a `CreateBucket` request carrying the target region.
#[derive(Debug, Clone)]
pub struct CreateBucketConfiguration {
    /// The region the bucket should be created in.
    pub location_constraint: String,
}

impl XmlSerialize for CreateBucketConfiguration {
    fn serialize_xml<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        write_text_element(writer, "LocationConstraint", &self.location_constraint)
    }
}
