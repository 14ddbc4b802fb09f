//! API path building.
//!
//! Service paths are templates such as `/storage/buckets/{bucketId}/files`.
//! Placeholder values are percent-encoded so that user-provided ids cannot
//! break out of their path segment.

use crate::error::{Error, ErrorKind, Result};

/// Percent-encode a single path segment.
///
/// ```rust
/// use appwrite_client::path::encode_segment;
///
/// assert_eq!(encode_segment("a/../b"), "a%2F..%2Fb");
/// ```
#[must_use]
pub fn encode_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Fill `{name}` placeholders in `template` with encoded values.
///
/// Every placeholder must have a value; unknown names are a validation error.
///
/// ```rust
/// use appwrite_client::path::fill;
///
/// let path = fill("/storage/buckets/{bucketId}/files/{fileId}", &[
///     ("bucketId", "photos"),
///     ("fileId", "cat 1.png"),
/// ]).unwrap();
/// assert_eq!(path, "/storage/buckets/photos/files/cat%201.png");
/// ```
pub fn fill(template: &str, values: &[(&str, &str)]) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            Error::new(ErrorKind::Validation(format!(
                "Unterminated placeholder in path: {}",
                template
            )))
        })?;
        let name = &after[..close];
        let value = values
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
            .ok_or_else(|| {
                Error::new(ErrorKind::Validation(format!(
                    "No value for path placeholder {{{}}}",
                    name
                )))
            })?;
        out.push_str(&encode_segment(value));
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
