//! Shared HTTP client configuration

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;

/// Invalid HTTP client settings
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A timeout is zero
    #[error("invalid {0} timeout: {1:?}")]
    InvalidTimeout(&'static str, Duration),
}

/// Errors raised while building the client pool
#[derive(Debug, Error)]
pub enum PoolError {
    /// Settings rejected before building
    #[error(transparent)]
    Config(#[from] ConfigValidationError),

    /// reqwest failed to build the client
    #[error("failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Configuration for the HTTP client pool.
///
/// The idle pool is unbounded per host by default so that every benchmark
/// client keeps its own connection to the server under test.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Idle connection timeout
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections per host
    pub pool_max_idle_per_host: usize,

    /// Request timeout
    pub request_timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// TCP keepalive interval
    pub tcp_keepalive: Option<Duration>,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: usize::MAX,
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(2),
            tcp_keepalive: Some(Duration::from_secs(60)),
            user_agent: format!("http-bench/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpConfig {
    /// Create config with custom request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Create config with custom connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Cap the idle pool per host.
    pub fn with_pool_max_idle(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Check the timeouts are usable.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.request_timeout.is_zero() {
            return Err(ConfigValidationError::InvalidTimeout("request", self.request_timeout));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigValidationError::InvalidTimeout("connect", self.connect_timeout));
        }
        Ok(())
    }
}

/// Shared HTTP client with connection pooling.
///
/// Cloning is cheap; every clone shares the same connection pool.
///
/// # Example
///
/// ```rust,ignore
/// let pool = HttpClientPool::new(&HttpConfig::default())?;
/// let target = HttpTarget::new(&pool, 8080, &TestCase::api_hello());
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientPool {
    client: Client,
    config: HttpConfig,
}

impl HttpClientPool {
    /// Create a new HTTP client pool with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the client cannot
    /// be built.
    pub fn new(config: &HttpConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let mut builder = Client::builder()
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent);

        if let Some(keepalive) = config.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        let client = builder.build()?;
        tracing::debug!(
            request_timeout_ms = config.request_timeout.as_millis() as u64,
            max_idle_per_host = config.pool_max_idle_per_host,
            "HTTP client pool ready"
        );

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Get a reference to the underlying HTTP client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get the configuration for this pool.
    pub fn config(&self) -> &HttpConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_is_unbounded() {
        let config = HttpConfig::default();
        assert_eq!(config.pool_max_idle_per_host, usize::MAX);
        assert!(config.user_agent.starts_with("http-bench/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let err = HttpConfig::default()
            .with_request_timeout(Duration::ZERO)
            .validate()
            .unwrap_err();
        assert_eq!(err, ConfigValidationError::InvalidTimeout("request", Duration::ZERO));

        let config = HttpConfig::default().with_connect_timeout(Duration::ZERO);
        let result = HttpClientPool::new(&config);
        assert!(matches!(result, Err(PoolError::Config(_))));
    }

    #[test]
    fn test_pool_keeps_config() {
        let config = HttpConfig::default().with_pool_max_idle(16);
        let pool = HttpClientPool::new(&config).expect("pool");
        assert_eq!(pool.config().pool_max_idle_per_host, 16);
    }
}
