//! Core HTTP transport: one request in, one decoded response out.

use reqwest::multipart::{Form, Part};
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::params::{FlatValue, Params};
use crate::request::{Headers, Request, RequestMethod};
use crate::response::{self, ResponseBody, ResponseType, WARNING_HEADER};

/// HTTP transport for Appwrite APIs.
///
/// Turns a [`Request`] into exactly one HTTP round-trip. The parameter bag
/// becomes a query string (GET), a multipart form (multipart content type)
/// or a JSON body (everything else). Statuses >= 400 are mapped to
/// [`ErrorKind::Api`]; nothing is retried.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    /// Same settings, redirects disabled. Used for `ResponseType::Location`.
    no_redirect: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Create a new transport.
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let inner = Self::build_client(&config, true)?;
        let no_redirect = Self::build_client(&config, false)?;
        Ok(Self {
            inner,
            no_redirect,
            config,
        })
    }

    /// Create a new transport with default configuration.
    pub fn default_transport() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    fn build_client(config: &ClientConfig, follow_redirects: bool) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(config.accept_compressed)
            .deflate(config.accept_compressed);

        if !follow_redirects {
            builder = builder.redirect(reqwest::redirect::Policy::none());
        }

        if config.self_signed {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build the outgoing HTTP request without sending it.
    ///
    /// `defaults` are the instance-level headers; the request's own headers
    /// are layered on top of them.
    pub fn build_request(
        &self,
        endpoint: &str,
        defaults: &Headers,
        request: &Request,
    ) -> Result<reqwest::Request> {
        let mut url = url::Url::parse(&format!(
            "{}{}",
            endpoint.trim_end_matches('/'),
            request.path
        ))?;
        let mut headers = defaults.merged(&request.headers);

        enum Body {
            None,
            Form(Form),
            Json,
        }

        let body = if request.method == RequestMethod::Get {
            append_query(&mut url, &request.params)?;
            Body::None
        } else if headers.is_multipart() {
            // reqwest writes its own content type with the boundary
            headers.remove("content-type");
            Body::Form(build_form(&request.params)?)
        } else {
            Body::Json
        };

        let mut builder = self
            .client_for(request.response_type)
            .request(request.method.to_reqwest(), url);

        for (name, value) in headers.iter() {
            builder = builder.header(name, value);
        }

        builder = match body {
            Body::None => builder,
            Body::Form(form) => builder.multipart(form),
            Body::Json => builder.json(&request.params),
        };

        builder
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))
    }

    /// Execute a request and decode the response.
    #[instrument(
        skip(self, endpoint, defaults, request),
        fields(method = request.method.as_str(), path = %request.path)
    )]
    pub async fn execute(
        &self,
        endpoint: &str,
        defaults: &Headers,
        request: Request,
    ) -> Result<ResponseBody> {
        let http_request = self.build_request(endpoint, defaults, &request)?;

        if self.config.enable_tracing {
            debug!(
                method = request.method.as_str(),
                url = %http_request.url(),
                "Sending request"
            );
        }

        let response = self
            .client_for(request.response_type)
            .execute(http_request)
            .await?;

        let status = response.status().as_u16();

        if self.config.enable_tracing {
            let content_length = response.content_length();
            if status < 400 {
                debug!(status, content_length, "Response received");
            } else {
                info!(status, content_length, "Non-success response");
            }
        }

        log_warnings(&response);

        if status >= 400 {
            let body = response.text().await?;
            return Err(response::parse_error_response(status, &body));
        }

        response::decode(response, request.response_type).await
    }

    fn client_for(&self, response_type: ResponseType) -> &reqwest::Client {
        match response_type {
            ResponseType::Location => &self.no_redirect,
            _ => &self.inner,
        }
    }
}

fn append_query(url: &mut url::Url, params: &Params) -> Result<()> {
    let pairs = params.to_query_pairs();
    if pairs.is_empty() {
        return Ok(());
    }

    let encoded = serde_urlencoded::to_string(&pairs)
        .map_err(|e| Error::with_source(ErrorKind::Json(e.to_string()), e))?;
    let query = match url.query() {
        Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
        _ => encoded,
    };
    url.set_query(Some(&query));
    Ok(())
}

fn build_form(params: &Params) -> Result<Form> {
    let mut form = Form::new();

    for (key, value) in params.flatten() {
        form = match value {
            FlatValue::Text(text) => form.text(key, text),
            FlatValue::File(file) => {
                let length = file.bytes.len() as u64;
                let mut part = Part::stream_with_length(reqwest::Body::from(file.bytes), length)
                    .file_name(file.filename);
                if let Some(mime_type) = file.mime_type {
                    part = part
                        .mime_str(&mime_type)
                        .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
                }
                form.part(key, part)
            }
        };
    }

    Ok(form)
}

fn log_warnings(response: &reqwest::Response) {
    for value in response.headers().get_all(WARNING_HEADER) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for warning in response::split_warnings(value) {
            warn!(warning = %warning, "Appwrite warning");
        }
    }
}
