//! Client configuration
//!
//! Everything a page source needs to reach a service (region, endpoint,
//! credentials, HTTP tuning) lives in one explicit [`ClientConfig`] that is
//! passed into the source constructor. Configuration is layered:
//! YAML file, then environment variables, then command-line flags.

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, RetryPolicy};
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Environment variable overriding the region
pub const ENV_REGION: &str = "PAGEWALK_REGION";

/// Environment variable overriding the endpoint URL
pub const ENV_ENDPOINT_URL: &str = "PAGEWALK_ENDPOINT_URL";

/// Environment variable providing a bearer token
pub const ENV_TOKEN: &str = "PAGEWALK_TOKEN";

// ============================================================================
// Client Config
// ============================================================================

/// Complete client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Region substituted into endpoint templates
    #[serde(default)]
    pub region: Option<String>,

    /// Endpoint override (e.g. a local emulator)
    #[serde(default)]
    pub endpoint_url: Option<String>,

    /// Request credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Extra service definition files
    #[serde(default)]
    pub services: Vec<PathBuf>,
}

impl ClientConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup
    #[must_use]
    pub fn with_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(region) = non_empty(ENV_REGION) {
            self.region = Some(region);
        }
        if let Some(endpoint) = non_empty(ENV_ENDPOINT_URL) {
            self.endpoint_url = Some(endpoint);
        }
        if let Some(token) = non_empty(ENV_TOKEN) {
            self.credentials = Credentials::bearer(token);
        }
        self
    }

    /// Set the region
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the endpoint override
    #[must_use]
    pub fn with_endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    /// Set credentials
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Resolve the base URL for a service endpoint template
    ///
    /// The override wins; otherwise `{region}` in the template is replaced
    /// with the configured region.
    pub fn resolve_endpoint(&self, template: &str) -> Result<String> {
        let endpoint = match &self.endpoint_url {
            Some(url) => url.clone(),
            None if template.contains("{region}") => {
                let region = self.region.as_deref().ok_or_else(|| {
                    Error::config(format!(
                        "A region is required for endpoint '{template}' (use --region or {ENV_REGION})"
                    ))
                })?;
                template.replace("{region}", region)
            }
            None => template.to_string(),
        };

        let parsed = Url::parse(&endpoint)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "Endpoint '{endpoint}' must use http or https"
            )));
        }
        Ok(endpoint)
    }

    /// Build the HTTP client configuration for a resolved endpoint
    pub fn http_client_config(&self, base_url: impl Into<String>) -> HttpClientConfig {
        let backoff = &self.http.retry_backoff;
        HttpClientConfig {
            base_url: base_url.into(),
            timeout: Duration::from_secs(self.http.timeout_seconds),
            connect_timeout: Duration::from_secs(self.http.connect_timeout_seconds),
            retry: RetryPolicy {
                max_retries: self.http.max_retries,
                backoff: backoff.backoff_type,
                initial_delay: Duration::from_millis(backoff.initial_ms),
                max_delay: Duration::from_millis(backoff.max_ms),
            },
            rate_limit: self.http.rate_limit.clone(),
            credentials: self.credentials.clone(),
        }
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Maximum number of retries per page request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff configuration
    #[serde(default)]
    pub retry_backoff: BackoffConfig,

    /// Rate limiting (`null` disables it)
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_retries: default_max_retries(),
            retry_backoff: BackoffConfig::default(),
            rate_limit: default_rate_limit(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type", default)]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_ms")]
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_ms")]
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: default_initial_ms(),
            max_ms: default_max_ms(),
        }
    }
}

fn default_initial_ms() -> u64 {
    100
}

fn default_max_ms() -> u64 {
    20_000
}
