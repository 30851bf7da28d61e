//! Error types for pagewalk
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! Errors fall into four groups: caller misuse (raised before any page is
//! fetched), transport/service failures (raised by a page fetch), control
//! signals (cancellation), and configuration/IO problems.

use thiserror::Error;

/// The main error type for pagewalk
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Caller Misuse
    // ============================================================================
    #[error("Invalid value for '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    #[error("Unknown service '{service}'")]
    UnknownService { service: String },

    #[error("Unknown operation '{operation}' for service '{service}'")]
    UnknownOperation { service: String, operation: String },

    #[error("Operation '{operation}' has no filter named '{filter}'")]
    UnknownFilter { operation: String, filter: String },

    #[error("Missing required filter '{filter}' for operation '{operation}'")]
    MissingFilter { operation: String, filter: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid service definition '{service}': {message}")]
    InvalidDefinition { service: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport / Service Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Service error {code} (HTTP {status}): {message}")]
    Service {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("JSONPath error: {message}")]
    JsonPath { message: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Control
    // ============================================================================
    #[error("Listing cancelled after {pages_fetched} page(s)")]
    Cancelled { pages_fetched: u32 },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid definition error
    pub fn definition(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a service error
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            status,
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } | Error::Service { status, .. } => {
                is_retryable_status(*status)
            }
            _ => false,
        }
    }

    /// Check if this error was caused by invalid caller input
    pub fn is_caller_misuse(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument { .. }
                | Error::UnknownService { .. }
                | Error::UnknownOperation { .. }
                | Error::UnknownFilter { .. }
                | Error::MissingFilter { .. }
        )
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Result type alias for pagewalk
pub type Result<T> = std::result::Result<T, Error>;
