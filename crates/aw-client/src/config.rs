//! Client configuration.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Configuration for the HTTP transport and the chunked uploader.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Pool idle timeout.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// User-Agent header value.
    pub user_agent: String,
    /// Whether to enable request/response tracing.
    pub enable_tracing: bool,
    /// Accept gzip/deflate encoded responses.
    pub accept_compressed: bool,
    /// Accept self-signed TLS certificates (local development servers).
    pub self_signed: bool,
    /// Size of each chunk sent by the chunked uploader, in bytes.
    pub chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 10,
            user_agent: crate::USER_AGENT.to_string(),
            enable_tracing: true,
            accept_compressed: true,
            self_signed: false,
            chunk_size: crate::DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::new(ErrorKind::Config(
                "chunk size must be greater than zero".to_string(),
            )));
        }
        Ok(())
    }
}

/// Builder for ClientConfig.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set pool idle timeout.
    pub fn with_pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set maximum idle connections per host.
    pub fn with_pool_max_idle(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Set custom User-Agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable request/response tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.config.enable_tracing = enabled;
        self
    }

    /// Accept compressed responses.
    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.config.accept_compressed = enabled;
        self
    }

    /// Accept self-signed certificates.
    pub fn with_self_signed(mut self, enabled: bool) -> Self {
        self.config.self_signed = enabled;
        self
    }

    /// Set the upload chunk size in bytes.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size;
        self
    }

    /// Build the client configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.chunk_size, 5 * 1024 * 1024);
        assert!(config.accept_compressed);
        assert!(!config.self_signed);
        assert!(config.user_agent.contains("appwrite"));
    }

    #[test]
    fn test_builder() {
        let config = ClientConfig::builder()
            .with_timeout(Duration::from_secs(60))
            .with_compression(false)
            .with_self_signed(true)
            .with_chunk_size(1024)
            .with_user_agent("custom-agent/1.0")
            .build();

        assert!(!config.accept_compressed);
        assert!(config.self_signed);
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.user_agent, "custom-agent/1.0");
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        let config = ClientConfig::builder().with_chunk_size(0).build();
        let err = config.validate().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Config(_)));
        assert!(ClientConfig::default().validate().is_ok());
    }
}
