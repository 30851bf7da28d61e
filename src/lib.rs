// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # pagewalk
//!
//! Auto-pagination for remote list/describe operations that page with an
//! opaque continuation token (`Marker`, `NextToken`).
//!
//! ## Features
//!
//! - **Generic fetcher**: one `ListFetcher` drives any `PageFetcher`
//! - **Item limits**: stop requesting pages once enough items were emitted
//! - **Manual paging**: fetch one page and hand the next token back
//! - **Declarative operations**: built-in ElastiCache and Internet Monitor
//!   definitions, plus custom YAML definitions
//! - **Resilient transport**: retries, backoff and rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::{Catalog, ClientConfig, JsonPageSource, ListFetcher, PagingOptions};
//!
//! #[tokio::main]
//! async fn main() -> pagewalk::Result<()> {
//!     let config = ClientConfig::new().with_region("us-east-1").with_env();
//!     let catalog = Catalog::builtin()?;
//!     let (service, op) = catalog.find_operation("elasticache", "describe-cache-clusters")?;
//!
//!     let source = JsonPageSource::new(&config, service, op)?;
//!     let template = source.request(&["ShowCacheNodeInfo=true"])?;
//!     let bounds = source.bounds();
//!
//!     let outcome = ListFetcher::with_bounds(
//!         source,
//!         template,
//!         PagingOptions::new().with_emit_limit(50),
//!         bounds,
//!     )?
//!     .collect()
//!     .await;
//!
//!     let (clusters, _) = outcome.into_result()?;
//!     println!("{} clusters", clusters.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       CLI (clap)                         │
//! └───────────────────────────┬──────────────────────────────┘
//!                             │
//! ┌───────────┬───────────────┴───────┬──────────────────────┐
//! │  Catalog  │     Pagination        │  Service             │
//! ├───────────┼───────────────────────┼──────────────────────┤
//! │ YAML defs │ ListFetcher           │ ListRequest          │
//! │ Built-ins │ IterationState        │ JsonPageSource       │
//! │ Validate  │ Limits / manual mode  │ Item + cursor paths  │
//! └───────────┴───────────────────────┴──────────┬───────────┘
//!                                                │
//!                      ┌─────────────────────────┴──────────┐
//!                      │  HTTP: retry, backoff, rate limit  │
//!                      └────────────────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Request credentials
pub mod credentials;

/// HTTP client with retry and rate limiting
pub mod http;

/// Paginated list fetcher
pub mod pagination;

/// Client configuration
pub mod config;

/// Service and operation definitions
pub mod catalog;

/// JSON HTTP page source
pub mod service;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use catalog::{Catalog, OperationDefinition, ServiceDefinition};
pub use config::ClientConfig;
pub use credentials::Credentials;
pub use pagination::{
    CancelToken, ListFetcher, ListOutcome, NextCursor, Page, PageFetcher, PageRequest,
    PagingOptions,
};
pub use service::{JsonPageSource, ListRequest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
