//! HTTP transport for page sources
//!
//! One [`HttpClient`] is bound to one service endpoint. It sends a single
//! JSON request per call, re-sends it on throttling, 5xx responses,
//! timeouts and refused connections, and maps error bodies to typed errors.

mod client;
mod rate_limit;
mod retry;

pub use client::{HttpClient, HttpClientConfig, JsonRequest};
pub use rate_limit::RateLimiterConfig;
pub use retry::RetryPolicy;

#[cfg(test)]
mod tests;
