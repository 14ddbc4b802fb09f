//! Error types for appwrite-client.

/// Result type alias for appwrite-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for appwrite-client operations.
///
/// Every failure a caller can observe, whether it came from the network, the
/// server or a malformed payload, is reported through this one type. The
/// populated fields tell the origins apart: [`Error::code`] is only present
/// for protocol-level (HTTP status) failures.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for a missing required parameter.
    pub fn missing_parameter(name: &str) -> Self {
        Self::new(ErrorKind::Validation(format!(
            "Missing required parameter: \"{}\"",
            name
        )))
    }

    /// The human readable message, without the kind prefix.
    pub fn message(&self) -> String {
        match &self.kind {
            ErrorKind::Api { message, .. } => message.clone(),
            ErrorKind::Network(message)
            | ErrorKind::Validation(message)
            | ErrorKind::Json(message)
            | ErrorKind::InvalidUrl(message)
            | ErrorKind::Config(message)
            | ErrorKind::Io(message)
            | ErrorKind::Upload(message) => message.clone(),
            ErrorKind::Decode { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status (or server supplied code) for protocol-level errors.
    pub fn code(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Api { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Server supplied error type, e.g. `storage_file_not_found`.
    ///
    /// Empty when the server answered with a non-JSON body.
    pub fn error_type(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Api { error_type, .. } => Some(error_type),
            _ => None,
        }
    }

    /// The raw error body as received from the server.
    pub fn response(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Api { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Returns true if the request never produced an HTTP response.
    pub fn is_network(&self) -> bool {
        matches!(self.kind, ErrorKind::Network(_))
    }

    /// Returns true if the server answered with a status >= 400.
    pub fn is_api(&self) -> bool {
        matches!(self.kind, ErrorKind::Api { .. })
    }

    /// Returns true if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(404)
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// A required parameter was missing; raised before any network activity.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Connection, DNS, TLS or timeout failure. No HTTP status is available.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with a status >= 400.
    #[error("Appwrite API error: {code} {message}")]
    Api {
        message: String,
        code: u16,
        error_type: String,
        response: String,
    },

    /// A successful response carried a payload that could not be decoded.
    #[error("Decoding error in part '{part}': {message}")]
    Decode { part: String, message: String },

    /// A redirect-location response had no `Location` header.
    #[error("Response has no Location header (status {status})")]
    MissingLocation { status: u16 },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading an upload source failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The chunked upload could not complete.
    #[error("Upload error: {0}")]
    Upload(String),

    /// The upload was cancelled before the next chunk was sent.
    #[error("Upload cancelled after {chunks_sent} chunk(s)")]
    Cancelled { chunks_sent: u64 },
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timeout: {}", err)
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            err.to_string()
        };

        Error::with_source(ErrorKind::Network(message), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::with_source(ErrorKind::InvalidUrl(err.to_string()), err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::with_source(ErrorKind::Io(err.to_string()), err)
    }
}
