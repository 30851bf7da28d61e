//! Request credentials
//!
//! Credentials are part of the explicit client configuration and are handed
//! to the HTTP client at construction time. Nothing reads them from ambient
//! process state after the configuration has been built.

use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials attached to every request
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// Anonymous requests
    #[default]
    None,

    /// `Authorization: Bearer <token>`
    Bearer {
        /// The bearer token
        token: String,
    },

    /// Static key sent in a header
    ApiKey {
        /// Header name
        #[serde(default = "default_api_key_header")]
        header: String,
        /// The key value
        value: String,
    },

    /// HTTP Basic authentication
    Basic {
        /// Username
        username: String,
        /// Password
        password: String,
    },
}

fn default_api_key_header() -> String {
    "X-Api-Key".to_string()
}

impl Credentials {
    /// Bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// API key credentials
    pub fn api_key(header: impl Into<String>, value: impl Into<String>) -> Self {
        Self::ApiKey {
            header: header.into(),
            value: value.into(),
        }
    }

    /// Whether requests are sent anonymously
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Attach the credentials to a request
    pub fn apply(&self, req: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => req,
            Self::Bearer { token } => req.bearer_auth(token),
            Self::ApiKey { header, value } => req.header(header.as_str(), value.as_str()),
            Self::Basic { username, password } => req.basic_auth(username, Some(password)),
        }
    }
}

// Secrets stay out of logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
            Self::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("header", header)
                .finish_non_exhaustive(),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
        }
    }
}
