//! Decoding of `multipart/form-data` response bodies.
//!
//! Function executions can answer with a multipart body instead of JSON so
//! that binary response payloads survive untouched. A few part names carry
//! typed values; everything else is text or JSON.

use bytes::Bytes;

use crate::error::{Error, ErrorKind, Result};

/// Part holding the raw response payload.
pub const PART_RESPONSE_BODY: &str = "responseBody";
/// Part holding the numeric status code.
pub const PART_STATUS_CODE: &str = "responseStatusCode";
/// Part holding the elapsed duration in seconds.
pub const PART_DURATION: &str = "duration";

/// Binary payload taken from a multipart response.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub bytes: Bytes,
    pub filename: Option<String>,
}

impl Payload {
    /// The payload as UTF-8 text, replacing invalid sequences.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// A decoded multipart field.
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartValue {
    Payload(Payload),
    Int(i64),
    Float(f64),
    Json(serde_json::Value),
    Text(String),
}

/// Named fields of a multipart response, in body order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartFields {
    fields: Vec<(String, MultipartValue)>,
}

impl MultipartFields {
    pub fn get(&self, name: &str) -> Option<&MultipartValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MultipartValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a JSON object so the fields can feed typed models.
    ///
    /// Payloads become UTF-8 text.
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (name, value) in &self.fields {
            let json = match value {
                MultipartValue::Payload(payload) => serde_json::Value::String(payload.to_text()),
                MultipartValue::Int(i) => serde_json::Value::from(*i),
                MultipartValue::Float(f) => serde_json::Value::from(*f),
                MultipartValue::Json(v) => v.clone(),
                MultipartValue::Text(t) => serde_json::Value::String(t.clone()),
            };
            map.insert(name.clone(), json);
        }
        serde_json::Value::Object(map)
    }

    fn push(&mut self, name: String, value: MultipartValue) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }
}

/// Extract the boundary parameter from a `multipart/form-data` content type.
pub fn boundary_from_content_type(content_type: &str) -> Option<String> {
    let mime: mime::Mime = content_type.parse().ok()?;
    if mime.type_() != mime::MULTIPART || mime.subtype() != mime::FORM_DATA {
        return None;
    }
    mime.get_param(mime::BOUNDARY)
        .map(|boundary| boundary.as_str().trim_matches('"').to_string())
}

/// Returns true if the content type is `multipart/form-data` (any parameters).
pub fn is_multipart_form(content_type: &str) -> bool {
    content_type
        .trim_start()
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
}

struct RawPart<'a> {
    name: Option<String>,
    filename: Option<String>,
    content_type: Option<String>,
    body: &'a [u8],
}

/// Parse a multipart body into named fields.
pub fn parse(body: &[u8], boundary: &str) -> Result<MultipartFields> {
    let mut fields = MultipartFields::default();

    for part in split_parts(body, boundary) {
        let Some(name) = part.name else {
            continue;
        };

        let value = decode_part(&name, part.filename, part.content_type.as_deref(), part.body)?;
        fields.push(name, value);
    }

    Ok(fields)
}

fn decode_part(
    name: &str,
    filename: Option<String>,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<MultipartValue> {
    let value = match name {
        PART_RESPONSE_BODY => MultipartValue::Payload(Payload {
            bytes: Bytes::copy_from_slice(body),
            filename,
        }),
        PART_STATUS_CODE => {
            let text = String::from_utf8_lossy(body);
            let code = text.trim().parse::<i64>().map_err(|e| decode_error(name, e))?;
            MultipartValue::Int(code)
        }
        PART_DURATION => {
            let text = String::from_utf8_lossy(body);
            let duration = text.trim().parse::<f64>().map_err(|e| decode_error(name, e))?;
            MultipartValue::Float(duration)
        }
        _ if content_type.is_some_and(is_json_content_type) => {
            let json = serde_json::from_slice(body).map_err(|e| decode_error(name, e))?;
            MultipartValue::Json(json)
        }
        _ => MultipartValue::Text(String::from_utf8_lossy(body).into_owned()),
    };
    Ok(value)
}

fn decode_error(part: &str, err: impl std::fmt::Display) -> Error {
    Error::new(ErrorKind::Decode {
        part: part.to_string(),
        message: err.to_string(),
    })
}

fn is_json_content_type(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

fn split_parts<'a>(body: &'a [u8], boundary: &str) -> Vec<RawPart<'a>> {
    let delimiter = format!("--{}", boundary);
    let delimiter = delimiter.as_bytes();
    let mut parts = Vec::new();

    let Some(mut pos) = find(body, delimiter, 0) else {
        return parts;
    };

    loop {
        pos += delimiter.len();
        // Closing delimiter
        if body[pos..].starts_with(b"--") {
            break;
        }
        // Skip transport padding up to the line break
        let Some(line_end) = find(body, b"\r\n", pos) else {
            break;
        };
        let start = line_end + 2;

        let mut next_delimiter = Vec::with_capacity(delimiter.len() + 2);
        next_delimiter.extend_from_slice(b"\r\n");
        next_delimiter.extend_from_slice(delimiter);
        let Some(end) = find(body, &next_delimiter, start) else {
            break;
        };

        parts.push(parse_part(&body[start..end]));
        pos = end + 2;
    }

    parts
}

fn parse_part(raw: &[u8]) -> RawPart<'_> {
    let (head, body) = if raw.starts_with(b"\r\n") {
        (&raw[..0], &raw[2..])
    } else {
        match find(raw, b"\r\n\r\n", 0) {
            Some(split) => (&raw[..split], &raw[split + 4..]),
            None => (raw, &raw[raw.len()..]),
        }
    };

    let mut part = RawPart {
        name: None,
        filename: None,
        content_type: None,
        body,
    };

    for line in String::from_utf8_lossy(head).split("\r\n") {
        let Some((header, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if header.trim().eq_ignore_ascii_case("content-disposition") {
            part.name = disposition_param(value, "name");
            part.filename = disposition_param(value, "filename");
        } else if header.trim().eq_ignore_ascii_case("content-type") {
            part.content_type = Some(value.to_string());
        }
    }

    part
}

/// Read `key="value"` (or an unquoted value) from a content-disposition header.
fn disposition_param(disposition: &str, key: &str) -> Option<String> {
    disposition.split(';').skip(1).find_map(|param| {
        let (k, v) = param.trim().split_once('=')?;
        if !k.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        let v = v.trim();
        let v = v
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(v);
        Some(v.to_string())
    })
}

fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if from > haystack.len() || needle.is_empty() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| offset + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDARY: &str = "----awBoundary42";

    fn body(parts: &[(&str, &str)]) -> Vec<u8> {
        let mut out = Vec::new();
        for (headers, content) in parts {
            out.extend_from_slice(format!("--{}\r\n{}\r\n\r\n{}\r\n", BOUNDARY, headers, content).as_bytes());
        }
        out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        out
    }

    #[test]
    fn test_boundary_from_content_type() {
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=abc123"),
            Some("abc123".to_string())
        );
        assert_eq!(
            boundary_from_content_type("multipart/form-data; boundary=\"quoted-b\""),
            Some("quoted-b".to_string())
        );
        assert_eq!(boundary_from_content_type("application/json"), None);
        assert_eq!(boundary_from_content_type("multipart/form-data"), None);
    }

    #[test]
    fn test_is_multipart_form() {
        assert!(is_multipart_form("multipart/form-data"));
        assert!(is_multipart_form("Multipart/Form-Data; boundary=x"));
        assert!(!is_multipart_form("application/json"));
    }

    #[test]
    fn test_parse_execution_fields() {
        let raw = body(&[
            (
                "Content-Disposition: form-data; name=\"responseBody\"; filename=\"out.bin\"\r\nContent-Type: application/octet-stream",
                "binary-ish",
            ),
            ("Content-Disposition: form-data; name=\"responseStatusCode\"", "201"),
            ("Content-Disposition: form-data; name=\"duration\"", "0.125"),
            (
                "Content-Disposition: form-data; name=\"responseHeaders\"\r\nContent-Type: application/json",
                "[{\"name\":\"x-a\",\"value\":\"1\"}]",
            ),
            ("Content-Disposition: form-data; name=\"status\"", "completed"),
        ]);

        let fields = parse(&raw, BOUNDARY).unwrap();
        assert_eq!(fields.len(), 5);
        assert_eq!(
            fields.get("responseBody"),
            Some(&MultipartValue::Payload(Payload {
                bytes: Bytes::from_static(b"binary-ish"),
                filename: Some("out.bin".to_string()),
            }))
        );
        assert_eq!(fields.get("responseStatusCode"), Some(&MultipartValue::Int(201)));
        assert_eq!(fields.get("duration"), Some(&MultipartValue::Float(0.125)));
        assert_eq!(
            fields.get("responseHeaders"),
            Some(&MultipartValue::Json(
                serde_json::json!([{"name": "x-a", "value": "1"}])
            ))
        );
        assert_eq!(
            fields.get("status"),
            Some(&MultipartValue::Text("completed".to_string()))
        );
    }

    #[test]
    fn test_payload_keeps_crlf_inside_body() {
        let raw = body(&[(
            "Content-Disposition: form-data; name=\"responseBody\"",
            "line one\r\nline two",
        )]);

        let fields = parse(&raw, BOUNDARY).unwrap();
        match fields.get("responseBody") {
            Some(MultipartValue::Payload(p)) => {
                assert_eq!(&p.bytes[..], b"line one\r\nline two");
                assert_eq!(p.filename, None);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_unnamed_parts_are_skipped() {
        let raw = body(&[
            ("Content-Type: text/plain", "orphan"),
            ("Content-Disposition: form-data; name=\"kept\"", "yes"),
        ]);

        let fields = parse(&raw, BOUNDARY).unwrap();
        assert_eq!(fields.len(), 1);
        assert!(fields.get("kept").is_some());
    }

    #[test]
    fn test_invalid_json_part_names_the_part() {
        let raw = body(&[(
            "Content-Disposition: form-data; name=\"logs\"\r\nContent-Type: application/json; charset=utf-8",
            "{not json",
        )]);

        let err = parse(&raw, BOUNDARY).unwrap_err();
        match err.kind {
            ErrorKind::Decode { part, .. } => assert_eq!(part, "logs"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_status_code_is_decode_error() {
        let raw = body(&[(
            "Content-Disposition: form-data; name=\"responseStatusCode\"",
            "two hundred",
        )]);
        let err = parse(&raw, BOUNDARY).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Decode { .. }));
    }

    #[test]
    fn test_body_without_boundary_is_empty() {
        let fields = parse(b"plain text body", BOUNDARY).unwrap();
        assert!(fields.is_empty());
    }

    #[test]
    fn test_to_json() {
        let raw = body(&[
            ("Content-Disposition: form-data; name=\"responseBody\"", "hello"),
            ("Content-Disposition: form-data; name=\"responseStatusCode\"", "200"),
        ]);
        let json = parse(&raw, BOUNDARY).unwrap().to_json();
        assert_eq!(
            json,
            serde_json::json!({"responseBody": "hello", "responseStatusCode": 200})
        );
    }
}
