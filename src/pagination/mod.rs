//! Pagination module
//!
//! Cursor-following list fetcher shared by every listing operation.
//!
//! # Overview
//!
//! A listing operation returns one page of records plus an opaque
//! continuation cursor (`Marker`, `NextToken`). [`ListFetcher`] threads that
//! cursor back into the next request until:
//! - the service stops returning a cursor,
//! - the caller's item limit has been reached, or
//! - the caller has taken manual control of paging (one fetch, cursor
//!   surfaced via [`ListFetcher::manual_next_cursor`], or through the
//!   [`NextCursor`] returned by [`ListFetcher::into_stream_with_cursor`]).
//!
//! The remote call itself is supplied through the [`PageFetcher`] trait.

mod fetcher;
mod types;

pub use fetcher::{ListFetcher, PageFetcher};
pub use types::{
    CancelToken, FetchPhase, IterationState, ListOutcome, NextCursor, Page, PageRequest,
    PageSizeBounds, PagingOptions,
};
