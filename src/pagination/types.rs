//! Pagination types and traits
//!
//! Defines the request/response shapes and iteration state shared by the
//! list fetcher and every page source.

use crate::error::{Error, Result};
use crate::types::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

// ============================================================================
// Request / Response
// ============================================================================

/// A request template for one paged listing operation
///
/// Everything except the two paging controls is opaque to the fetcher. The
/// template is cloned for every page.
pub trait PageRequest: Clone + Send + Sync {
    /// Set the continuation cursor (`None` = start from the beginning)
    fn set_cursor(&mut self, cursor: Option<Cursor>);

    /// Set the per-page size hint (`None` = let the service decide)
    fn set_page_size(&mut self, page_size: Option<u32>);
}

/// One page returned by a listing operation
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records in service order
    pub items: Vec<T>,
    /// Continuation token, present iff more pages may exist
    pub next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Create a page, normalizing an empty token to "no more pages"
    pub fn new(items: Vec<T>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.and_then(Cursor::new),
        }
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page carries no records
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether the service signalled more pages
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

// ============================================================================
// Page Size
// ============================================================================

/// Service-defined per-page limits (e.g. `MaxRecords` 20..=100)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSizeBounds {
    /// Smallest page size the service accepts
    pub min: u32,
    /// Page-size ceiling
    pub max: u32,
}

impl PageSizeBounds {
    /// Create bounds
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    /// Clamp a derived value into the bounds
    pub fn clamp(&self, value: u64) -> u32 {
        let capped = value.min(u64::from(self.max)) as u32;
        capped.max(self.min)
    }
}

// ============================================================================
// Paging Options
// ============================================================================

/// Caller-supplied paging controls
///
/// Presence of each control is carried by the `Option`, so "did the caller
/// set this" never needs to be asked at runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagingOptions {
    /// Cursor to resume from; a non-empty value switches to manual paging
    pub starting_cursor: Option<Cursor>,
    /// Stop requesting pages once this many items were emitted
    pub emit_limit: Option<u64>,
    /// Explicit per-page size hint
    pub page_size: Option<u32>,
    /// Fetch exactly one page and surface its cursor
    pub no_auto_iteration: bool,
}

impl PagingOptions {
    /// Create default options (auto-iterate through everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a cursor
    #[must_use]
    pub fn with_starting_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.starting_cursor = Cursor::new(cursor);
        self
    }

    /// Cap the number of emitted items
    #[must_use]
    pub fn with_emit_limit(mut self, limit: u64) -> Self {
        self.emit_limit = Some(limit);
        self
    }

    /// Set the per-page size hint
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    /// Disable automatic continuation
    #[must_use]
    pub fn manual(mut self) -> Self {
        self.no_auto_iteration = true;
        self
    }

    /// Whether the caller drives paging across separate invocations
    pub fn caller_controls_paging(&self) -> bool {
        self.no_auto_iteration || self.starting_cursor.is_some()
    }

    /// Validate the explicit page size against the service bounds
    ///
    /// Returns the effective explicit page size: rejected below the
    /// minimum, clamped to the ceiling.
    pub fn validated_page_size(&self, bounds: Option<PageSizeBounds>) -> Result<Option<u32>> {
        let Some(size) = self.page_size else {
            return Ok(None);
        };

        if size == 0 {
            return Err(Error::invalid_argument(
                "page_size",
                "must be greater than zero",
            ));
        }

        match bounds {
            Some(bounds) if size < bounds.min => Err(Error::invalid_argument(
                "page_size",
                format!("{size} is below the service minimum of {}", bounds.min),
            )),
            Some(bounds) if size > bounds.max => {
                tracing::debug!(
                    "Page size {size} above service ceiling, clamping to {}",
                    bounds.max
                );
                Ok(Some(bounds.max))
            }
            _ => Ok(Some(size)),
        }
    }
}

// ============================================================================
// Iteration State
// ============================================================================

/// Lifecycle of one listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPhase {
    /// Nothing fetched yet
    #[default]
    Idle,
    /// A page request is in flight
    FetchingPage,
    /// The last page was handed to the consumer
    Emitting,
    /// Deciding whether to request another page
    Continuing,
    /// Finished normally
    Exhausted,
    /// Aborted by an error
    Failed,
}

impl FetchPhase {
    /// Whether no further pages will be produced
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Failed)
    }
}

/// Tracks pagination state during one listing
#[derive(Debug, Clone, Default)]
pub struct IterationState {
    /// Cursor for the next request
    pub current_cursor: Option<Cursor>,
    /// Total items emitted so far
    pub items_emitted: u64,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Optional cap on emitted items
    pub emit_limit: Option<u64>,
    /// Manual paging: one fetch, cursor surfaced to the caller
    pub caller_controls_paging: bool,
    /// Current lifecycle phase
    pub phase: FetchPhase,
}

impl IterationState {
    /// Create fresh state from caller options
    pub fn new(options: &PagingOptions) -> Self {
        Self {
            current_cursor: options.starting_cursor.clone(),
            emit_limit: options.emit_limit,
            caller_controls_paging: options.caller_controls_paging(),
            ..Default::default()
        }
    }

    /// Record a fetched page
    pub fn record_page(&mut self, items: usize, next_cursor: Option<Cursor>) {
        self.pages_fetched += 1;
        self.items_emitted += items as u64;
        self.current_cursor = next_cursor;
    }

    /// Whether the emit limit has been reached
    pub fn limit_reached(&self) -> bool {
        self.emit_limit
            .is_some_and(|limit| self.items_emitted >= limit)
    }

    /// Remaining item budget, if bounded
    pub fn remaining(&self) -> Option<u64> {
        self.emit_limit
            .map(|limit| limit.saturating_sub(self.items_emitted))
    }

    /// Whether another page should be requested
    pub fn should_continue(&self) -> bool {
        !self.caller_controls_paging && self.current_cursor.is_some() && !self.limit_reached()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.phase = FetchPhase::Exhausted;
    }

    /// Mark pagination as failed
    pub fn mark_failed(&mut self) {
        self.phase = FetchPhase::Failed;
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// Everything a listing produced, including a failure if one occurred
#[derive(Debug)]
pub struct ListOutcome<T> {
    /// Items emitted before termination
    pub items: Vec<T>,
    /// Final cursor in manual paging mode
    pub next_cursor: Option<Cursor>,
    /// Number of successful page fetches
    pub pages_fetched: u32,
    /// Terminal failure, if the listing did not finish normally
    pub error: Option<Error>,
}

impl<T> ListOutcome<T> {
    /// Whether the listing finished without error
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Convert into a plain result, discarding partial items on failure
    pub fn into_result(self) -> Result<(Vec<T>, Option<Cursor>)> {
        match self.error {
            Some(err) => Err(err),
            None => Ok((self.items, self.next_cursor)),
        }
    }
}

// ============================================================================
// Cancellation
// ============================================================================

/// Cooperative cancellation flag, checked before every page fetch
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a new, uncancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Streamed Cursor
// ============================================================================

/// Next cursor of a streamed listing
///
/// Filled once the stream of a manual listing ends normally; stays empty
/// for automatic listings and after a failure.
#[derive(Debug, Clone, Default)]
pub struct NextCursor {
    slot: Arc<Mutex<Option<Cursor>>>,
}

impl NextCursor {
    /// The cursor to resume from, if any
    pub fn get(&self) -> Option<Cursor> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set(&self, cursor: Option<Cursor>) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = cursor;
    }
}
