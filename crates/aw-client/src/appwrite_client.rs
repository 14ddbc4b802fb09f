//! High-level Appwrite client: endpoint, default headers and the transport.
//!
//! ## Security
//!
//! - API keys, sessions and JWTs are redacted in Debug output
//! - Header values are skipped in tracing spans

use tracing::instrument;

use crate::client::HttpTransport;
use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::params::Params;
use crate::request::{Headers, Request, RequestMethod};
use crate::response::{ResponseBody, ResponseType};
use crate::{DEFAULT_ENDPOINT, RESPONSE_FORMAT};

/// Header names set by the semantic setters.
pub mod headers {
    pub const PROJECT: &str = "x-appwrite-project";
    pub const KEY: &str = "x-appwrite-key";
    pub const SESSION: &str = "x-appwrite-session";
    pub const LOCALE: &str = "x-appwrite-locale";
    pub const JWT: &str = "x-appwrite-jwt";
    pub const FORWARDED_USER_AGENT: &str = "x-forwarded-user-agent";
    pub const RESPONSE_FORMAT: &str = "x-appwrite-response-format";
    /// Resource id sent with every chunk after the first.
    pub const ID: &str = "x-appwrite-id";
    pub const CONTENT_RANGE: &str = "content-range";
}

const REDACTED_HEADERS: &[&str] = &[headers::KEY, headers::SESSION, headers::JWT];

/// Appwrite API client.
///
/// Owns the endpoint and the default headers every request starts from.
/// The setters mutate that state, so requests needing different credentials
/// at the same time should use separate (cloned) clients. Clones share the
/// connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use appwrite_client::{Client, Headers, Params, RequestMethod, ResponseType};
///
/// let mut client = Client::new()?;
/// client
///     .set_endpoint("https://cloud.appwrite.io/v1")?
///     .set_project("my-project")
///     .set_key("standard_...");
///
/// let user = client
///     .call(RequestMethod::Get, "/account", Headers::new(), Params::new(), ResponseType::Json)
///     .await?;
/// ```
#[derive(Clone)]
pub struct Client {
    http: HttpTransport,
    endpoint: String,
    headers: Headers,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let headers: Vec<(&str, &str)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if REDACTED_HEADERS.contains(&name) {
                    (name, "[REDACTED]")
                } else {
                    (name, value)
                }
            })
            .collect();

        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("headers", &headers)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client for the default endpoint.
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client with custom HTTP configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http = HttpTransport::new(config)?;
        Ok(Self {
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            headers: default_headers(),
        })
    }

    /// Create a client from `APPWRITE_*` environment variables.
    ///
    /// `APPWRITE_ENDPOINT` is required; `APPWRITE_PROJECT`,
    /// `APPWRITE_API_KEY`, `APPWRITE_SESSION` and `APPWRITE_LOCALE` are
    /// applied when set.
    pub fn from_env() -> Result<Self> {
        Self::from_env_with_config(ClientConfig::default())
    }

    /// [`Client::from_env`] with custom HTTP configuration.
    pub fn from_env_with_config(config: ClientConfig) -> Result<Self> {
        let endpoint = env_var("APPWRITE_ENDPOINT").ok_or_else(|| {
            Error::new(ErrorKind::Config(
                "APPWRITE_ENDPOINT environment variable is not set".to_string(),
            ))
        })?;

        let mut client = Self::with_config(config)?;
        client.set_endpoint(endpoint)?;

        if let Some(project) = env_var("APPWRITE_PROJECT") {
            client.set_project(project);
        }
        if let Some(key) = env_var("APPWRITE_API_KEY") {
            client.set_key(key);
        }
        if let Some(session) = env_var("APPWRITE_SESSION") {
            client.set_session(session);
        }
        if let Some(locale) = env_var("APPWRITE_LOCALE") {
            client.set_locale(locale);
        }

        Ok(client)
    }

    /// Set the API endpoint, e.g. `https://cloud.appwrite.io/v1`.
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> Result<&mut Self> {
        let endpoint = endpoint.into();
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(Error::new(ErrorKind::InvalidUrl(format!(
                "Invalid endpoint URL: {}",
                endpoint
            ))));
        }
        url::Url::parse(&endpoint)?;
        self.endpoint = endpoint.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Accept self-signed certificates. Rebuilds the HTTP stack.
    pub fn set_self_signed(&mut self, self_signed: bool) -> Result<&mut Self> {
        let mut config = self.http.config().clone();
        config.self_signed = self_signed;
        self.http = HttpTransport::new(config)?;
        Ok(self)
    }

    /// Add (or replace) a default header sent with every request.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    /// Your project ID.
    pub fn set_project(&mut self, project: impl Into<String>) -> &mut Self {
        self.add_header(headers::PROJECT, project)
    }

    /// Your secret API key.
    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.add_header(headers::KEY, key)
    }

    /// The user session to authenticate with.
    pub fn set_session(&mut self, session: impl Into<String>) -> &mut Self {
        self.add_header(headers::SESSION, session)
    }

    /// Locale for translated server messages.
    pub fn set_locale(&mut self, locale: impl Into<String>) -> &mut Self {
        self.add_header(headers::LOCALE, locale)
    }

    /// The user agent of the end user, when acting on their behalf.
    pub fn set_forwarded_user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.add_header(headers::FORWARDED_USER_AGENT, user_agent)
    }

    /// A JWT issued for a user session.
    pub fn set_jwt(&mut self, jwt: impl Into<String>) -> &mut Self {
        self.add_header(headers::JWT, jwt)
    }

    /// Get the endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Get the default headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Get the HTTP configuration.
    pub fn config(&self) -> &ClientConfig {
        self.http.config()
    }

    /// Build the absolute URL for an API path.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoint, path)
    }

    /// Perform one API call.
    #[instrument(skip(self, headers, params), fields(method = method.as_str()))]
    pub async fn call(
        &self,
        method: RequestMethod,
        path: &str,
        headers: Headers,
        params: Params,
        response_type: ResponseType,
    ) -> Result<ResponseBody> {
        let request = Request::new(method, path)
            .headers(headers)
            .params(params)
            .response_type(response_type);
        self.send(request).await
    }

    /// Send a prepared request.
    pub async fn send(&self, request: Request) -> Result<ResponseBody> {
        self.http
            .execute(&self.endpoint, &self.headers, request)
            .await
    }

    /// Build the outgoing HTTP request without sending it.
    pub fn prepare(&self, request: &Request) -> Result<reqwest::Request> {
        self.http
            .build_request(&self.endpoint, &self.headers, request)
    }
}

fn default_headers() -> Headers {
    Headers::new()
        .with("x-sdk-name", "Rust")
        .with("x-sdk-platform", "server")
        .with("x-sdk-language", "rust")
        .with("x-sdk-version", env!("CARGO_PKG_VERSION"))
        .with(headers::RESPONSE_FORMAT, RESPONSE_FORMAT)
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}
