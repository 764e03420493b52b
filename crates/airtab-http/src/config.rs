//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;
use crate::rate_limit::RateLimitConfig;

pub const DEFAULT_ROOT_URL: &str = "https://api.airtable.com";
pub const DEFAULT_VERSION: &str = "v0";

pub const ENV_API_KEY: &str = "AIRTABLE_API_KEY";
pub const ENV_BASE_ID: &str = "AIRTABLE_BASE_ID";
pub const ENV_ROOT_URL: &str = "AIRTABLE_ROOT_URL";
pub const ENV_VERSION: &str = "AIRTABLE_VERSION";
pub const ENV_NO_LIMIT: &str = "AIRTABLE_NO_LIMIT";

/// A validated API root URL.
///
/// The URL must be absolute and use HTTPS; plain HTTP is accepted for
/// localhost only, which is what test servers use.
///
/// # Example
///
/// ```
/// use airtab_http::RootUrl;
///
/// let root = RootUrl::new("https://api.airtable.com/").unwrap();
/// assert_eq!(
///     root.endpoint("v0", "appXXX", "Main%20Table", ""),
///     "https://api.airtable.com/v0/appXXX/Main%20Table"
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RootUrl(Url);

impl RootUrl {
    /// Parse and validate a root URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRootUrl`] if the URL cannot be parsed, is
    /// not absolute, has no host, or uses plain HTTP for a remote host.
    pub fn new(s: impl AsRef<str>) -> Result<Self, ConfigError> {
        let s = s.as_ref();
        let invalid = |reason: &str| ConfigError::InvalidRootUrl {
            value: s.to_string(),
            reason: reason.to_string(),
        };

        let url = Url::parse(s).map_err(|e| invalid(&e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }
        let Some(host) = url.host_str() else {
            return Err(invalid("must have a host"));
        };

        let is_localhost = matches!(host, "localhost" | "127.0.0.1" | "[::1]" | "::1");
        let scheme = url.scheme();
        if scheme != "https" && !(scheme == "http" && is_localhost) {
            return Err(invalid("must use HTTPS (HTTP allowed only for localhost)"));
        }
        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not have a query or fragment"));
        }

        Ok(Self(url))
    }

    /// URL of a resource: `{root}/{version}/{base}/{path}?{query}`.
    ///
    /// `path` and `query` must already be escaped. An empty query adds no
    /// `?`.
    pub fn endpoint(&self, version: &str, base_id: &str, path: &str, query: &str) -> String {
        let root = self.0.as_str().trim_end_matches('/');
        let mut url = format!("{root}/{version}/{base_id}/{path}");
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        url
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

impl fmt::Display for RootUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for RootUrl {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Retry policy for failed requests.
///
/// Rate-limited (429) and server error (5xx) responses, timeouts and
/// connection failures are retried with exponential backoff. Other errors
/// are returned at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Never retry.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt + 1`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let delay = self.initial_backoff.saturating_mul(2u32.saturating_pow(attempt));
        delay.min(self.max_backoff)
    }
}

/// Settings for [`HttpTransport`](crate::HttpTransport).
///
/// The API key is never shown in `Debug` output.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_id: String,
    root_url: RootUrl,
    version: String,
    rate_limit: Option<RateLimitConfig>,
    retry: RetryPolicy,
    timeout: Duration,
    user_agent: String,
}

impl Config {
    /// Start building a configuration for the base `base_id`.
    pub fn builder(api_key: impl Into<String>, base_id: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder {
            api_key: api_key.into(),
            base_id: base_id.into(),
            root_url: None,
            version: None,
            rate_limit: Some(RateLimitConfig::default()),
            retry: RetryPolicy::default(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("airtab/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// Uses `AIRTABLE_API_KEY` and `AIRTABLE_BASE_ID`, and optionally
    /// `AIRTABLE_ROOT_URL`, `AIRTABLE_VERSION` and `AIRTABLE_NO_LIMIT` (any
    /// non-empty value turns rate limiting off).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let mut builder = Config::builder(
            var(ENV_API_KEY).unwrap_or_default(),
            var(ENV_BASE_ID).unwrap_or_default(),
        );
        if let Some(root) = var(ENV_ROOT_URL) {
            builder = builder.root_url(root);
        }
        if let Some(version) = var(ENV_VERSION) {
            builder = builder.version(version);
        }
        if var(ENV_NO_LIMIT).is_some() {
            builder = builder.no_rate_limit();
        }
        builder.build()
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    pub fn root_url(&self) -> &RootUrl {
        &self.root_url
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rate_limit(&self) -> Option<&RateLimitConfig> {
        self.rate_limit.as_ref()
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Only for building the authorization header. Never log it.
    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Full URL of `path` within the configured base.
    pub fn endpoint(&self, path: &str, query: &str) -> String {
        self.root_url
            .endpoint(&self.version, &self.base_id, path, query)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.base_id)
            .field("root_url", &self.root_url)
            .field("version", &self.version)
            .field("rate_limit", &self.rate_limit)
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`Config`].
#[derive(Clone)]
pub struct ConfigBuilder {
    api_key: String,
    base_id: String,
    root_url: Option<String>,
    version: Option<String>,
    rate_limit: Option<RateLimitConfig>,
    retry: RetryPolicy,
    timeout: Duration,
    user_agent: String,
}

impl ConfigBuilder {
    /// Use another API root, e.g. a local test server.
    pub fn root_url(mut self, url: impl Into<String>) -> Self {
        self.root_url = Some(url.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn rate_limit(mut self, config: RateLimitConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.rate_limit = None;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Timeout of a single attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Fails if the API key or base id is empty, the root URL is invalid, or
    /// the version is not a single path segment.
    pub fn build(self) -> Result<Config, ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        if self.base_id.trim().is_empty() {
            return Err(ConfigError::MissingBaseId);
        }

        let root_url = RootUrl::new(self.root_url.as_deref().unwrap_or(DEFAULT_ROOT_URL))?;

        let version = self.version.unwrap_or_else(|| DEFAULT_VERSION.to_string());
        if version.is_empty() || version.contains(['/', '?', '#']) {
            return Err(ConfigError::InvalidVersion(version));
        }

        Ok(Config {
            api_key: self.api_key,
            base_id: self.base_id,
            root_url,
            version,
            rate_limit: self.rate_limit,
            retry: self.retry,
            timeout: self.timeout,
            user_agent: self.user_agent,
        })
    }
}

impl fmt::Debug for ConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigBuilder")
            .field("api_key", &"[REDACTED]")
            .field("base_id", &self.base_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn valid_https_root() {
        let root = RootUrl::new("https://api.airtable.com").unwrap();
        assert_eq!(root.host(), Some("api.airtable.com"));
    }

    #[test]
    fn localhost_http_allowed() {
        assert!(RootUrl::new("http://localhost:8080").is_ok());
        assert!(RootUrl::new("http://127.0.0.1:41234").is_ok());
    }

    #[test]
    fn remote_http_rejected() {
        let err = RootUrl::new("http://api.airtable.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRootUrl { .. }));
    }

    #[test]
    fn relative_root_rejected() {
        assert!(RootUrl::new("/v0/app").is_err());
        assert!(RootUrl::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn endpoint_joins_segments() {
        let root = RootUrl::new("https://api.airtable.com/").unwrap();
        assert_eq!(
            root.endpoint("v0", "appABC", "Main/rec1", "maxRecords=3"),
            "https://api.airtable.com/v0/appABC/Main/rec1?maxRecords=3"
        );
    }

    #[test]
    fn builder_defaults() {
        let config = Config::builder("key", "appABC").build().unwrap();
        assert_eq!(config.root_url().as_str(), "https://api.airtable.com/");
        assert_eq!(config.version(), "v0");
        assert!(config.rate_limit().is_some());
        assert_eq!(
            config.endpoint("Main", ""),
            "https://api.airtable.com/v0/appABC/Main"
        );
    }

    #[test]
    fn builder_requires_key_and_base() {
        assert_eq!(
            Config::builder("", "appABC").build().unwrap_err(),
            ConfigError::MissingApiKey
        );
        assert_eq!(
            Config::builder("key", " ").build().unwrap_err(),
            ConfigError::MissingBaseId
        );
    }

    #[test]
    fn builder_rejects_bad_version() {
        let err = Config::builder("key", "app").version("v0/x").build().unwrap_err();
        assert_eq!(err, ConfigError::InvalidVersion("v0/x".to_string()));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = Config::builder("keySECRET", "appABC").build().unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("keySECRET"));
        assert!(shown.contains("[REDACTED]"));
        assert!(!format!("{:?}", Config::builder("keySECRET", "app")).contains("keySECRET"));
    }

    #[test]
    fn reads_environment() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_API_KEY, "keyXYZ"),
            (ENV_BASE_ID, "appXYZ"),
            (ENV_ROOT_URL, "http://localhost:9000"),
            (ENV_VERSION, "v1"),
            (ENV_NO_LIMIT, "1"),
        ]);
        let config = Config::from_lookup(|name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.api_key(), "keyXYZ");
        assert_eq!(config.endpoint("T", ""), "http://localhost:9000/v1/appXYZ/T");
        assert!(config.rate_limit().is_none());
    }

    #[test]
    fn empty_environment_is_missing_key() {
        let err = Config::from_lookup(|_| None).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn empty_no_limit_keeps_rate_limit() {
        let config = Config::from_lookup(|name| match name {
            ENV_API_KEY => Some("k".to_string()),
            ENV_BASE_ID => Some("b".to_string()),
            ENV_NO_LIMIT => Some(String::new()),
            _ => None,
        })
        .unwrap();
        assert!(config.rate_limit().is_some());
    }

    #[test]
    fn backoff_doubles_up_to_max() {
        let retry = RetryPolicy {
            max_retries: 5,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(500),
        };
        assert_eq!(retry.backoff(0), Duration::from_millis(100));
        assert_eq!(retry.backoff(1), Duration::from_millis(200));
        assert_eq!(retry.backoff(2), Duration::from_millis(400));
        assert_eq!(retry.backoff(3), Duration::from_millis(500));
        assert_eq!(retry.backoff(40), Duration::from_millis(500));
    }
}
