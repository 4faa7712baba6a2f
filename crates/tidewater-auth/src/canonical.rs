//! Canonical request construction for AWS Signature Version 4.
//!
//! This module implements the canonical request format as specified by AWS:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! Unlike a verifying server, a signing client controls the wire encoding
//! itself: query parameters are percent-encoded here and the exact same
//! encoding must be used in the URL that is sent, otherwise the service
//! reconstructs a different canonical request and rejects the signature.

use std::collections::BTreeMap;

use http::HeaderMap;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The set of characters that must be percent-encoded in URI path
/// segments and query strings.
///
/// Per the SigV4 spec, all characters except unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) must be encoded. Forward slashes
/// in the path are preserved by encoding segment-wise.
const SIGV4_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Headers that never participate in the signature.
///
/// These vary between client stacks (proxies rewrite them, HTTP libraries
/// inject them late), so signing them would make signatures fragile.
const IGNORED_HEADERS: [&str; 4] = ["authorization", "content-length", "content-type", "user-agent"];

/// Percent-encode a single path segment or query component using the
/// SigV4 encoding rules.
///
/// # Examples
///
/// ```
/// use tidewater_auth::canonical::uri_encode;
///
/// assert_eq!(uri_encode("hello world"), "hello%20world");
/// assert_eq!(uri_encode("a/b"), "a%2Fb");
/// assert_eq!(uri_encode("safe-chars_.~"), "safe-chars_.~");
/// ```
#[must_use]
pub fn uri_encode(input: &str) -> String {
    utf8_percent_encode(input, SIGV4_ENCODE_SET).to_string()
}

/// Encode a raw URL path segment-wise, preserving `/` separators.
///
/// Empty paths are normalized to `/`. The result is both the wire path
/// and the canonical URI: the client encodes once and signs what it
/// sends.
///
/// # Examples
///
/// ```
/// use tidewater_auth::canonical::encode_path;
///
/// assert_eq!(encode_path("/my-bucket/my key.txt"), "/my-bucket/my%20key.txt");
/// assert_eq!(encode_path(""), "/");
/// ```
#[must_use]
pub fn encode_path(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(uri_encode)
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical query string from raw (unencoded) parameters.
///
/// Each key and value is percent-encoded, then pairs are sorted by
/// encoded key and value. Keys without a value still get a trailing `=`,
/// as the SigV4 canonical form requires.
///
/// # Examples
///
/// ```
/// use tidewater_auth::canonical::canonical_query_string;
///
/// let params = vec![
///     ("prefix".to_owned(), "a b".to_owned()),
///     ("delimiter".to_owned(), "/".to_owned()),
/// ];
/// assert_eq!(canonical_query_string(&params), "delimiter=%2F&prefix=a%20b");
/// ```
#[must_use]
pub fn canonical_query_string(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (uri_encode(k), uri_encode(v)))
        .collect();
    encoded.sort_unstable();

    encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// The lowercase names of the headers that participate in the signature.
///
/// All request headers are signed except the [`IGNORED_HEADERS`]; the
/// result is sorted and deduplicated.
#[must_use]
pub fn signed_header_names(headers: &HeaderMap) -> Vec<String> {
    let mut names: Vec<String> = headers
        .keys()
        .map(|name| name.as_str().to_ascii_lowercase())
        .filter(|name| !IGNORED_HEADERS.contains(&name.as_str()))
        .collect();
    names.sort_unstable();
    names.dedup();
    names
}

/// Build the canonical headers string for the given signed header names.
///
/// Header values are trimmed, consecutive whitespace is collapsed to a
/// single space, and multi-valued headers are joined with commas. The
/// result does NOT include a trailing newline; the caller adds that as
/// part of the canonical request format.
#[must_use]
pub fn canonical_headers(headers: &HeaderMap, signed: &[String]) -> String {
    let mut header_map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let lower_name = name.as_str().to_ascii_lowercase();
        let trimmed_value = collapse_whitespace(value.to_str().unwrap_or("").trim());
        header_map
            .entry(lower_name)
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&trimmed_value);
            })
            .or_insert(trimmed_value);
    }

    signed
        .iter()
        .filter_map(|name| header_map.get(name).map(|value| format!("{name}:{value}")))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the signed headers string as a semicolon-separated list of
/// lowercase header names.
///
/// # Examples
///
/// ```
/// use tidewater_auth::canonical::signed_headers_string;
///
/// let names = vec!["host".to_owned(), "x-amz-date".to_owned()];
/// assert_eq!(signed_headers_string(&names), "host;x-amz-date");
/// ```
#[must_use]
pub fn signed_headers_string(signed: &[String]) -> String {
    signed.join(";")
}

/// Build the full canonical request string from its components.
#[must_use]
pub fn build_canonical_request(
    method: &str,
    canonical_uri: &str,
    canonical_query: &str,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    format!(
        "{method}\n{canonical_uri}\n{canonical_query}\n{canonical_headers}\n\n{signed_headers}\n{payload_hash}"
    )
}

/// Collapse consecutive whitespace characters in a string to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_should_encode_path_segment_wise() {
        assert_eq!(encode_path("/bucket/a b/c"), "/bucket/a%20b/c");
        assert_eq!(encode_path("/bucket/résumé.txt"), "/bucket/r%C3%A9sum%C3%A9.txt");
    }

    #[test]
    fn test_should_normalize_empty_path_to_slash() {
        assert_eq!(encode_path(""), "/");
        assert_eq!(encode_path("/"), "/");
    }

    #[test]
    fn test_should_preserve_unreserved_characters() {
        assert_eq!(encode_path("/b/key-1_2.3~4"), "/b/key-1_2.3~4");
    }

    #[test]
    fn test_should_sort_query_parameters_by_key() {
        let params = vec![
            ("b".to_owned(), "2".to_owned()),
            ("a".to_owned(), "1".to_owned()),
            ("c".to_owned(), "3".to_owned()),
        ];
        assert_eq!(canonical_query_string(&params), "a=1&b=2&c=3");
    }

    #[test]
    fn test_should_sort_duplicate_query_keys_by_value() {
        let params = vec![
            ("events".to_owned(), "s3:ObjectCreated:*".to_owned()),
            ("events".to_owned(), "s3:ObjectAccessed:*".to_owned()),
        ];
        assert_eq!(
            canonical_query_string(&params),
            "events=s3%3AObjectAccessed%3A%2A&events=s3%3AObjectCreated%3A%2A"
        );
    }

    #[test]
    fn test_should_keep_equals_sign_for_valueless_keys() {
        let params = vec![("uploads".to_owned(), String::new())];
        assert_eq!(canonical_query_string(&params), "uploads=");
    }

    #[test]
    fn test_should_return_empty_for_no_params() {
        assert_eq!(canonical_query_string(&[]), "");
    }

    #[test]
    fn test_should_exclude_ignored_headers_from_signing() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", HeaderValue::from_static("example.com"));
        headers.insert("Content-Type", HeaderValue::from_static("text/plain"));
        headers.insert("User-Agent", HeaderValue::from_static("tidewater"));
        headers.insert("Authorization", HeaderValue::from_static("x"));
        headers.insert("x-amz-date", HeaderValue::from_static("20130524T000000Z"));

        let signed = signed_header_names(&headers);
        assert_eq!(signed, vec!["host".to_owned(), "x-amz-date".to_owned()]);
    }

    #[test]
    fn test_should_build_canonical_headers_sorted_and_lowercased() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", HeaderValue::from_static("examplebucket.s3.amazonaws.com"));
        headers.insert("Range", HeaderValue::from_static("bytes=0-9"));
        headers.insert("x-amz-date", HeaderValue::from_static("20130524T000000Z"));

        let signed = signed_header_names(&headers);
        let result = canonical_headers(&headers, &signed);
        let expected = "host:examplebucket.s3.amazonaws.com\n\
                        range:bytes=0-9\n\
                        x-amz-date:20130524T000000Z";
        assert_eq!(result, expected);
    }

    #[test]
    fn test_should_collapse_whitespace_in_header_values() {
        let mut headers = HeaderMap::new();
        headers.insert("Host", HeaderValue::from_static("  example.com  "));
        headers.insert("x-custom", HeaderValue::from_static("a   b   c"));

        let signed = signed_header_names(&headers);
        let result = canonical_headers(&headers, &signed);
        assert_eq!(result, "host:example.com\nx-custom:a b c");
    }

    #[test]
    fn test_should_join_multi_valued_headers_with_commas() {
        let mut headers = HeaderMap::new();
        headers.append("x-custom", HeaderValue::from_static("one"));
        headers.append("x-custom", HeaderValue::from_static("two"));

        let signed = signed_header_names(&headers);
        let result = canonical_headers(&headers, &signed);
        assert_eq!(result, "x-custom:one,two");
    }

    #[test]
    fn test_should_build_canonical_request_matching_aws_example() {
        use sha2::{Digest, Sha256};

        // AWS test vector: GET /test.txt from examplebucket.
        let mut headers = HeaderMap::new();
        headers.insert("host", HeaderValue::from_static("examplebucket.s3.amazonaws.com"));
        headers.insert("range", HeaderValue::from_static("bytes=0-9"));
        headers.insert(
            "x-amz-content-sha256",
            HeaderValue::from_static(
                "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            ),
        );
        headers.insert("x-amz-date", HeaderValue::from_static("20130524T000000Z"));

        let signed = signed_header_names(&headers);
        let canonical = build_canonical_request(
            "GET",
            "/test.txt",
            "",
            &canonical_headers(&headers, &signed),
            &signed_headers_string(&signed),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
        );

        let expected = "GET\n\
                        /test.txt\n\
                        \n\
                        host:examplebucket.s3.amazonaws.com\n\
                        range:bytes=0-9\n\
                        x-amz-content-sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\
                        x-amz-date:20130524T000000Z\n\
                        \n\
                        host;range;x-amz-content-sha256;x-amz-date\n\
                        e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(canonical, expected);

        // The hash of the canonical request matches the published vector.
        let hash = hex::encode(Sha256::digest(canonical.as_bytes()));
        assert_eq!(
            hash,
            "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972"
        );
    }
}
