//! Search box debouncing and page tracking for a list view.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::query::{ListParams, ListQuery, QueryState};
use crate::Resource;

/// Suspend-and-supersede timer: each value cancels the pending one and
/// is delivered on the receiver only if nothing newer arrives within `delay`.
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + 'static> Debouncer<T> {
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let debouncer = Self {
            delay,
            pending: None,
            tx,
        };
        (debouncer, rx)
    }

    pub fn push(&mut self, value: T) {
        self.cancel();

        let tx = self.tx.clone();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // receiver gone means the view is gone
            let _ = tx.send(value);
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

/// Current page of a list view. Never goes below 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current: u32,
    initial: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1)
    }
}

impl Pagination {
    pub fn new(initial: u32) -> Self {
        let initial = initial.max(1);
        Self {
            current: initial,
            initial,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn set(&mut self, page: u32) {
        self.current = page.max(1);
    }

    pub fn next(&mut self) {
        self.current += 1;
    }

    pub fn prev(&mut self) {
        self.current = self.current.saturating_sub(1).max(1);
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }

    pub fn has_next(&self, total_pages: u32) -> bool {
        self.current < total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }
}

/// Search term + page for one list, fetching through a [`ListQuery`].
///
/// A new search term resets the page to 1. Moving between pages keeps the
/// term. Asking again for the parameters already on screen does not hit
/// the server unless the cache entry went stale.
pub struct ListController<R: Resource> {
    query: ListQuery<R>,
    search: String,
    pagination: Pagination,
    last_requested: Option<ListParams>,
}

impl<R: Resource> ListController<R> {
    pub fn new(query: ListQuery<R>) -> Self {
        Self {
            query,
            search: String::new(),
            pagination: Pagination::default(),
            last_requested: None,
        }
    }

    pub fn params(&self) -> ListParams {
        ListParams::new(self.search.clone(), self.pagination.current())
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> u32 {
        self.pagination.current()
    }

    pub fn state(&self) -> QueryState<R> {
        self.query.state()
    }

    /// Applies a settled (debounced) search term.
    pub async fn apply_search(&mut self, term: impl Into<String>) -> QueryState<R> {
        let term = term.into();
        if term != self.search {
            self.search = term;
            self.pagination.reset();
        }
        self.load().await
    }

    pub async fn next_page(&mut self) -> QueryState<R> {
        let has_next = self.state().data.map(|page| page.has_next()).unwrap_or(false);
        if has_next {
            self.pagination.next();
        }
        self.load().await
    }

    pub async fn prev_page(&mut self) -> QueryState<R> {
        let has_prev = self.state().data.map(|page| page.has_prev()).unwrap_or(false);
        if has_prev {
            self.pagination.prev();
        }
        self.load().await
    }

    pub async fn go_to_page(&mut self, page: u32) -> QueryState<R> {
        self.pagination.set(page);
        self.load().await
    }

    /// Fetches the current parameters unless they are already fresh in the cache.
    pub async fn load(&mut self) -> QueryState<R> {
        let params = self.params();
        let cache = self.query.cache();
        if self.last_requested.as_ref() == Some(&params) && !cache.needs_fetch(R::KEY, &params) {
            return self.state();
        }
        self.refresh().await
    }

    /// Unconditional re-fetch, used by the retry action.
    pub async fn refresh(&mut self) -> QueryState<R> {
        let params = self.params();
        self.last_requested = Some(params.clone());
        self.query.refetch(params).await
    }
}
