//! HTTP response decoding with Appwrite-specific extensions.

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};
use crate::multipart::{self, MultipartFields};

/// Header carrying non-fatal, semicolon-separated server warnings.
pub const WARNING_HEADER: &str = "x-appwrite-warning";

/// How the caller wants a successful response body decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// JSON, with multipart and raw-text fallbacks.
    #[default]
    Json,
    /// Raw payload, untouched (images, archives).
    Bytes,
    /// Do not follow redirects; return the `Location` header.
    Location,
    /// Always decode as a multipart field map.
    Multipart,
}

/// A decoded successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    /// Body that was not valid JSON, returned verbatim (may be empty).
    Text(String),
    Bytes(Bytes),
    Location(String),
    Multipart(MultipartFields),
}

impl ResponseBody {
    /// Deserialize the body into a typed model.
    ///
    /// Multipart fields are converted through [`MultipartFields::to_json`];
    /// an empty text body deserializes from `null` so `()` and `Option`
    /// targets work for endpoints answering 204.
    pub fn json<T: DeserializeOwned>(self) -> Result<T> {
        let value = match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Multipart(fields) => fields.to_json(),
            ResponseBody::Location(location) => serde_json::Value::String(location),
            ResponseBody::Text(text) if text.trim().is_empty() => serde_json::Value::Null,
            ResponseBody::Text(text) => return serde_json::from_str(&text).map_err(Into::into),
            ResponseBody::Bytes(bytes) => return serde_json::from_slice(&bytes).map_err(Into::into),
        };
        serde_json::from_value(value).map_err(Into::into)
    }

    /// The JSON value, if the body decoded as JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Raw bytes of the body, whatever it decoded as.
    pub fn into_bytes(self) -> Bytes {
        match self {
            ResponseBody::Bytes(bytes) => bytes,
            ResponseBody::Text(text) | ResponseBody::Location(text) => Bytes::from(text),
            ResponseBody::Json(value) => Bytes::from(value.to_string()),
            ResponseBody::Multipart(fields) => Bytes::from(fields.to_json().to_string()),
        }
    }

    /// The redirect target of a `Location` response.
    pub fn into_location(self) -> Option<String> {
        match self {
            ResponseBody::Location(location) => Some(location),
            _ => None,
        }
    }

    /// Read a string field from a JSON object body.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.as_json()?.get(name)?.as_str()
    }

    /// Read an unsigned integer field from a JSON object body.
    pub fn u64_field(&self, name: &str) -> Option<u64> {
        self.as_json()?.get(name)?.as_u64()
    }

    /// The server-assigned resource id (`$id`).
    pub fn id(&self) -> Option<&str> {
        self.str_field("$id")
    }
}

/// Decode a successful response according to the requested type.
pub(crate) async fn decode(
    response: reqwest::Response,
    response_type: ResponseType,
) -> Result<ResponseBody> {
    let status = response.status().as_u16();
    let content_type = header_value(&response, reqwest::header::CONTENT_TYPE.as_str());

    match response_type {
        ResponseType::Bytes => Ok(ResponseBody::Bytes(response.bytes().await?)),
        ResponseType::Location => header_value(&response, reqwest::header::LOCATION.as_str())
            .map(ResponseBody::Location)
            .ok_or_else(|| Error::new(ErrorKind::MissingLocation { status })),
        ResponseType::Multipart => {
            let boundary = content_type
                .as_deref()
                .and_then(multipart::boundary_from_content_type)
                .ok_or_else(|| {
                    Error::new(ErrorKind::Decode {
                        part: "content-type".to_string(),
                        message: "response is not multipart/form-data".to_string(),
                    })
                })?;
            let body = response.bytes().await?;
            Ok(ResponseBody::Multipart(multipart::parse(&body, &boundary)?))
        }
        ResponseType::Json => {
            if let Some(boundary) = content_type
                .as_deref()
                .and_then(multipart::boundary_from_content_type)
            {
                let body = response.bytes().await?;
                return Ok(ResponseBody::Multipart(multipart::parse(&body, &boundary)?));
            }

            let text = response.text().await?;
            Ok(decode_text(text))
        }
    }
}

/// JSON if it parses, the verbatim text otherwise.
pub(crate) fn decode_text(text: String) -> ResponseBody {
    match serde_json::from_str(&text) {
        Ok(value) => ResponseBody::Json(value),
        Err(_) => ResponseBody::Text(text),
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Split a warning header into individual warnings.
pub(crate) fn split_warnings(header: &str) -> Vec<String> {
    header
        .split(';')
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build an error from a status >= 400 and its body text.
///
/// JSON bodies follow the `{message, code, type}` convention. Anything else
/// becomes the message verbatim, with the status as code and an empty type.
pub(crate) fn parse_error_response(status: u16, body: &str) -> Error {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        let message = map
            .get("message")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| body.to_string());
        let code = map
            .get("code")
            .and_then(|v| v.as_u64())
            .and_then(|c| u16::try_from(c).ok())
            .filter(|c| *c > 0)
            .unwrap_or(status);
        let error_type = map
            .get("type")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        return Error::new(ErrorKind::Api {
            message,
            code,
            error_type,
            response: body.to_string(),
        });
    }

    Error::new(ErrorKind::Api {
        message: body.to_string(),
        code: status,
        error_type: String::new(),
        response: body.to_string(),
    })
}
