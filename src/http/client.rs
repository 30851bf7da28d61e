//! JSON-over-HTTP client bound to one service endpoint

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::retry::RetryPolicy;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Wait used when a throttled response carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 1;

/// Settings for a client bound to one endpoint
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Resolved service endpoint; request paths are appended to it
    pub base_url: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Retry budget applied to every call
    pub retry: RetryPolicy,
    /// Pacing between attempts, if any
    pub rate_limit: Option<RateLimiterConfig>,
    /// Attached to every attempt
    pub credentials: Credentials,
}

/// One JSON request relative to the client's endpoint
#[derive(Debug, Clone)]
pub struct JsonRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

/// Client for one service endpoint
pub struct HttpClient {
    inner: Client,
    config: HttpClientConfig,
    limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Build a client from its settings
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let inner = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            inner,
            config,
            limiter,
        })
    }

    /// Send a request and decode its JSON response
    ///
    /// The retry budget belongs to this call alone, so every page of a
    /// listing starts with a fresh one. The error of the last attempt is
    /// returned once the budget is spent.
    pub async fn request_json(&self, request: &JsonRequest) -> Result<Value> {
        let url = self.url_for(&request.path);
        let retry = &self.config.retry;
        let mut retries_used = 0;

        loop {
            if let Some(limiter) = &self.limiter {
                limiter.wait().await;
            }

            let error = match self.send_once(&url, request).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };
            if !retry.allows_retry(&error, retries_used) {
                return Err(error);
            }

            let delay = retry.delay_before_retry(&error, retries_used);
            retries_used += 1;
            warn!(
                "{} {} failed ({error}), retry {retries_used}/{} in {delay:?}",
                request.method, request.path, retry.max_retries
            );
            tokio::time::sleep(delay).await;
        }
    }

    async fn send_once(&self, url: &str, request: &JsonRequest) -> Result<Value> {
        let mut builder = self.inner.request(request.method.clone(), url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder = self.config.credentials.apply(builder);

        let response = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(Error::RateLimited {
                retry_after_seconds: retry_after(&response),
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        if !status.is_success() {
            return Err(classify_error_body(status.as_u16(), text));
        }

        debug!("{} {url} -> {}", request.method, status.as_u16());
        decode_body(&text)
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(e)
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("retry", &self.config.retry)
            .field("credentials", &self.config.credentials)
            .field("paced", &self.limiter.is_some())
            .finish_non_exhaustive()
    }
}

fn retry_after(response: &Response) -> u64 {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECONDS)
}

// Some list endpoints answer an empty page with no body at all
fn decode_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_str(text)
        .map_err(|e| Error::decode(format!("Response is not valid JSON: {e}")))
}

/// Turn an error response into a typed error
///
/// JSON bodies carrying an error code (`__type`, `code` or `Code`) become
/// [`Error::Service`]; anything else stays a plain status error.
pub(crate) fn classify_error_body(status: u16, body: String) -> Error {
    let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&body) else {
        return Error::http_status(status, body);
    };

    let code = ["__type", "code", "Code"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str));
    let Some(code) = code else {
        return Error::http_status(status, body);
    };

    // "com.amazonaws.service#ResourceNotFoundException" -> "ResourceNotFoundException"
    let code = code.rsplit('#').next().unwrap_or(code);
    let message = ["message", "Message"]
        .iter()
        .find_map(|key| map.get(*key).and_then(Value::as_str))
        .unwrap_or_default();

    Error::service(status, code, message)
}
