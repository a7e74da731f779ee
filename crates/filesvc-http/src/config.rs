//! Public configuration for the HTTP fetcher.

use std::time::Duration;

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the HTTP fetcher.
///
/// Storage keys are resolved relative to `base_url`, so a base of
/// `https://cdn.example.com/files/` and a key of `img-42.png` fetch
/// `https://cdn.example.com/files/img-42.png`. Keys that are absolute URLs
/// are fetched as-is.
///
/// # Example
///
/// ```
/// use filesvc_http::HttpFetcherConfig;
/// use std::time::Duration;
///
/// let config = HttpFetcherConfig::new()
///     .with_base_url("https://cdn.example.com/files/")
///     .with_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Base URL storage keys are joined onto
    pub(crate) base_url: Option<String>,
    /// User agent string for HTTP requests
    pub(crate) user_agent: String,
    /// Whole-request timeout
    pub(crate) timeout: Duration,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            user_agent: concat!("filesvc-http/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl HttpFetcherConfig {
    /// Create a new configuration with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL that storage keys are resolved against.
    ///
    /// Without a base URL every key must be an absolute `http(s)` URL.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set an optional base URL.
    #[must_use]
    pub fn with_optional_base_url(mut self, url: Option<String>) -> Self {
        self.base_url = url;
        self
    }

    /// Set the user agent string for HTTP requests.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the request timeout.
    ///
    /// Defaults to 30 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
