//! Paginated list fetcher
//!
//! Follows continuation cursors across pages of a remote listing operation
//! until the cursor runs out, the caller's item limit is reached, or the
//! caller has taken manual control of paging.

use super::types::{
    CancelToken, FetchPhase, IterationState, ListOutcome, NextCursor, Page, PageRequest,
    PageSizeBounds, PagingOptions,
};
use crate::error::{Error, Result};
use crate::types::Cursor;
use async_trait::async_trait;
use futures::stream::{self, Stream};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// The remote call behind one listing operation
///
/// Implementations own transport concerns (authentication, endpoints,
/// retries, timeouts). A returned error ends the listing.
#[async_trait]
pub trait PageFetcher<R: PageRequest>: Send + Sync {
    /// Record type produced by the operation
    type Item: Send;

    /// Fetch a single page
    async fn fetch_page(&self, request: &R) -> Result<Page<Self::Item>>;
}

/// Drives a [`PageFetcher`] through successive pages
///
/// Each instance owns fresh iteration state; to restart a listing, build a
/// new fetcher.
pub struct ListFetcher<R, F> {
    fetcher: F,
    template: R,
    bounds: Option<PageSizeBounds>,
    page_size: Option<u32>,
    state: IterationState,
    cancel: CancelToken,
    label: String,
}

impl<R, F> ListFetcher<R, F>
where
    R: PageRequest,
    F: PageFetcher<R>,
{
    /// Create a fetcher with no service page-size bounds
    pub fn new(fetcher: F, template: R, options: PagingOptions) -> Result<Self> {
        Self::with_bounds(fetcher, template, options, None)
    }

    /// Create a fetcher for an operation with known page-size bounds
    ///
    /// Invalid paging options are rejected here, before any fetch.
    pub fn with_bounds(
        fetcher: F,
        template: R,
        options: PagingOptions,
        bounds: Option<PageSizeBounds>,
    ) -> Result<Self> {
        if let Some(b) = bounds {
            if b.min == 0 || b.min > b.max {
                return Err(Error::config(format!(
                    "Invalid page size bounds {}..={}",
                    b.min, b.max
                )));
            }
        }
        let page_size = options.validated_page_size(bounds)?;

        Ok(Self {
            fetcher,
            template,
            bounds,
            page_size,
            state: IterationState::new(&options),
            cancel: CancelToken::new(),
            label: "list".to_string(),
        })
    }

    /// Attach a cancellation token
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Name used in log messages
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Current iteration state
    pub fn state(&self) -> &IterationState {
        &self.state
    }

    /// Current lifecycle phase
    pub fn phase(&self) -> FetchPhase {
        self.state.phase
    }

    /// The cursor to hand back to a manually paging caller
    ///
    /// Only available once a manual listing has finished normally.
    pub fn manual_next_cursor(&self) -> Option<&Cursor> {
        if self.state.caller_controls_paging && self.state.phase == FetchPhase::Exhausted {
            self.state.current_cursor.as_ref()
        } else {
            None
        }
    }

    /// Page size hint for the next request
    fn resolve_page_size(&self) -> Option<u32> {
        if self.page_size.is_some() {
            return self.page_size;
        }
        let remaining = self.state.remaining()?;
        Some(match self.bounds {
            Some(bounds) => bounds.clamp(remaining),
            None => u32::try_from(remaining).unwrap_or(u32::MAX),
        })
    }

    fn finish(&mut self) {
        self.state.mark_done();
        info!(
            "{}: {} items in {} pages",
            self.label, self.state.items_emitted, self.state.pages_fetched
        );
    }

    /// Fetch the next page, or `None` once the listing is over
    ///
    /// After an error every further call returns `Ok(None)`.
    pub async fn next_page(&mut self) -> Result<Option<Page<F::Item>>> {
        match self.state.phase {
            FetchPhase::Exhausted | FetchPhase::Failed => return Ok(None),
            FetchPhase::Idle => {
                if self.state.emit_limit == Some(0) {
                    debug!("{}: item limit is zero, nothing to fetch", self.label);
                    self.finish();
                    return Ok(None);
                }
            }
            FetchPhase::Emitting | FetchPhase::Continuing => {
                self.state.phase = FetchPhase::Continuing;
                if !self.state.should_continue() {
                    self.finish();
                    return Ok(None);
                }
            }
            // A previous call was dropped mid-request; request the same page again
            FetchPhase::FetchingPage => {}
        }

        if self.cancel.is_cancelled() {
            self.state.mark_failed();
            warn!(
                "{}: cancelled after {} pages",
                self.label, self.state.pages_fetched
            );
            return Err(Error::Cancelled {
                pages_fetched: self.state.pages_fetched,
            });
        }

        let mut request = self.template.clone();
        request.set_cursor(self.state.current_cursor.clone());
        request.set_page_size(self.resolve_page_size());

        self.state.phase = FetchPhase::FetchingPage;
        debug!(
            "{}: fetching page {} (cursor: {})",
            self.label,
            self.state.pages_fetched + 1,
            self.state
                .current_cursor
                .as_ref()
                .map_or("<start>", Cursor::as_str)
        );

        match self.fetcher.fetch_page(&request).await {
            Ok(page) => {
                self.state.record_page(page.len(), page.next_cursor.clone());
                self.state.phase = FetchPhase::Emitting;
                debug!(
                    "{}: page {} returned {} items (more: {})",
                    self.label,
                    self.state.pages_fetched,
                    page.len(),
                    page.has_more()
                );
                Ok(Some(page))
            }
            Err(e) => {
                self.state.mark_failed();
                warn!(
                    "{}: page {} failed after {} items: {e}",
                    self.label,
                    self.state.pages_fetched + 1,
                    self.state.items_emitted
                );
                Err(e)
            }
        }
    }

    /// Drain the listing, keeping partial results if it fails
    pub async fn collect(mut self) -> ListOutcome<F::Item> {
        let mut items = Vec::new();
        let error = loop {
            match self.next_page().await {
                Ok(Some(page)) => items.extend(page.items),
                Ok(None) => break None,
                Err(e) => break Some(e),
            }
        };

        ListOutcome {
            items,
            next_cursor: self.manual_next_cursor().cloned(),
            pages_fetched: self.state.pages_fetched,
            error,
        }
    }

    /// Lazily yield items one by one
    ///
    /// A failure is yielded as a single trailing `Err`, after every item of
    /// the pages that succeeded. Use [`Self::into_stream_with_cursor`] when
    /// paging manually.
    pub fn into_stream(self) -> impl Stream<Item = Result<F::Item>> {
        self.into_stream_with_cursor().0
    }

    /// Like [`Self::into_stream`], plus the cursor to resume from
    ///
    /// The [`NextCursor`] is filled when the stream ends, under the same
    /// rules as [`Self::manual_next_cursor`].
    pub fn into_stream_with_cursor(self) -> (impl Stream<Item = Result<F::Item>>, NextCursor) {
        let next = NextCursor::default();
        let stream = stream::unfold(
            (self, VecDeque::new(), next.clone()),
            |(mut fetcher, mut buffered, next)| async move {
                loop {
                    if let Some(item) = buffered.pop_front() {
                        return Some((Ok(item), (fetcher, buffered, next)));
                    }
                    match fetcher.next_page().await {
                        Ok(Some(page)) => buffered.extend(page.items),
                        Ok(None) => {
                            next.set(fetcher.manual_next_cursor().cloned());
                            return None;
                        }
                        Err(e) => return Some((Err(e), (fetcher, buffered, next))),
                    }
                }
            },
        );
        (stream, next)
    }
}

impl<R, F> std::fmt::Debug for ListFetcher<R, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListFetcher")
            .field("label", &self.label)
            .field("bounds", &self.bounds)
            .field("page_size", &self.page_size)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
