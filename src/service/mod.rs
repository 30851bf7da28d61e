//! JSON HTTP page source
//!
//! Binds a catalog operation to the pagination engine.
//!
//! # Overview
//!
//! The service module provides:
//! - `ListRequest` - typed filter values plus cursor and page size
//! - `JsonPageSource` - `PageFetcher` that sends requests and extracts pages
//! - Item and cursor extraction by dot path or JSONPath

mod extract;
mod request;
mod source;

pub use extract::{extract_cursor, extract_items};
pub use request::{FilterValue, ListRequest, RenderedRequest};
pub use source::JsonPageSource;
