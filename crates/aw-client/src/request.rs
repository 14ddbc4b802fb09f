//! Request descriptors: method, path, headers, parameters and response type.

use std::collections::HashMap;

use crate::params::Params;
use crate::response::ResponseType;

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl RequestMethod {
    /// Convert to reqwest::Method.
    pub fn to_reqwest(&self) -> reqwest::Method {
        match self {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Patch => reqwest::Method::PATCH,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestMethod::Get => "GET",
            RequestMethod::Post => "POST",
            RequestMethod::Put => "PUT",
            RequestMethod::Patch => "PATCH",
            RequestMethod::Delete => "DELETE",
        }
    }
}

/// Header map with case-insensitive keys.
///
/// Keys are lowercased on insert, so `Content-Type` and `content-type` are
/// the same header and the later value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.inner
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Builder-style [`Headers::insert`].
    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.inner.remove(&name.to_ascii_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Layer `other` on top of `self`; `other` wins on conflicts.
    pub fn merged(&self, other: &Headers) -> Headers {
        let mut merged = self.clone();
        for (name, value) in &other.inner {
            merged.inner.insert(name.clone(), value.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns true if the content type asks for a multipart form body.
    pub fn is_multipart(&self) -> bool {
        self.get("content-type")
            .is_some_and(crate::multipart::is_multipart_form)
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

/// A single call to the transport.
#[derive(Debug, Clone)]
pub struct Request {
    pub(crate) method: RequestMethod,
    pub(crate) path: String,
    pub(crate) headers: Headers,
    pub(crate) params: Params,
    pub(crate) response_type: ResponseType,
}

impl Request {
    /// Create a new request for a path relative to the endpoint.
    pub fn new(method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Headers::new(),
            params: Params::new(),
            response_type: ResponseType::Json,
        }
    }

    /// Add a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace all per-call headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    /// Set the parameter bag.
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Set how the response should be decoded.
    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    /// Send as `application/json`.
    pub fn json(self) -> Self {
        self.header("content-type", "application/json")
    }

    /// Send as `multipart/form-data`.
    pub fn multipart(self) -> Self {
        self.header("content-type", "multipart/form-data")
    }

    pub fn method(&self) -> RequestMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headers_are_case_insensitive() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("CONTENT-TYPE", "multipart/form-data");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("content-type"), Some("multipart/form-data"));
        assert!(headers.contains("Content-type"));
        assert!(headers.is_multipart());
    }

    #[test]
    fn test_merged_overrides_defaults() {
        let defaults: Headers = [
            ("X-Appwrite-Project", "p1"),
            ("content-type", "application/json"),
        ]
        .into_iter()
        .collect();
        let call = Headers::new().with("Content-Type", "multipart/form-data; boundary=x");

        let merged = defaults.merged(&call);
        assert_eq!(merged.get("x-appwrite-project"), Some("p1"));
        assert_eq!(
            merged.get("content-type"),
            Some("multipart/form-data; boundary=x")
        );
        // Defaults untouched
        assert_eq!(defaults.get("content-type"), Some("application/json"));
    }

    #[test]
    fn test_request_builder() {
        let req = Request::new(RequestMethod::Get, "/storage/buckets")
            .header("X-Custom", "value")
            .params(Params::new().with("search", "logs"))
            .response_type(ResponseType::Bytes);

        assert_eq!(req.method(), RequestMethod::Get);
        assert_eq!(req.path(), "/storage/buckets");
        assert_eq!(req.headers.get("x-custom"), Some("value"));
        assert_eq!(req.params.len(), 1);
        assert_eq!(req.response_type, ResponseType::Bytes);
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(RequestMethod::Patch.to_reqwest(), reqwest::Method::PATCH);
        assert_eq!(RequestMethod::Delete.as_str(), "DELETE");
    }
}
