//! Client-side query cache.
//!
//! One entry per [`QueryKey`] holding the last page that was fetched
//! successfully, the parameters it was fetched with and the fetch status.
//! Reads are stale-while-revalidate. Fetch cancellation is cooperative:
//! every fetch takes a generation number and its result is dropped if the
//! entry moved on to a newer generation before it resolved.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::task::JoinHandle;

use crate::error::ApiError;
use crate::services::ResourceApi;
use crate::toast::Toaster;
use crate::{PagedResult, QueryKey, Resource, Role, User};

#[derive(Debug, Clone, PartialEq)]
pub enum CachedPage {
    Users(PagedResult<User>),
    Roles(PagedResult<Role>),
}

/// Parameters of a list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListParams {
    pub search: String,
    pub page: u32,
}

impl Default for ListParams {
    fn default() -> Self {
        Self::new("", 1)
    }
}

impl ListParams {
    pub fn new(search: impl Into<String>, page: u32) -> Self {
        Self {
            search: search.into(),
            page,
        }
    }

    pub fn search_term(&self) -> Option<&str> {
        Some(self.search.as_str()).filter(|term| !term.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStatus {
    #[default]
    Idle,
    Fetching,
    Settled,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPhase {
    #[default]
    None,
    /// An optimistic patch is installed and its snapshot is pinned.
    Mutating,
    Committed,
    RolledBack,
}

#[derive(Debug, Default)]
struct CacheEntry {
    data: Option<CachedPage>,
    data_params: Option<ListParams>,
    requested: Option<ListParams>,
    status: FetchStatus,
    error: Option<ApiError>,
    stale: bool,
    generation: u64,
    mutation: MutationPhase,
}

/// Point-in-time view of one cache entry, typed for its resource.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<R> {
    pub data: Option<PagedResult<R>>,
    pub params: Option<ListParams>,
    pub status: FetchStatus,
    pub mutation: MutationPhase,
    pub error: Option<ApiError>,
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_error: bool,
    pub is_stale: bool,
}

impl<R> QueryState<R> {
    pub fn rows(&self) -> &[R] {
        self.data.as_ref().map(|page| page.data.as_slice()).unwrap_or(&[])
    }
}

/// Handle for one fetch started with [`QueryCache::begin_fetch`].
#[derive(Debug, Clone)]
pub struct FetchTicket {
    key: QueryKey,
    generation: u64,
    params: ListParams,
}

impl FetchTicket {
    pub fn params(&self) -> &ListParams {
        &self.params
    }
}

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn data<R: Resource>(&self) -> Option<PagedResult<R>> {
        self.entries
            .get(&R::KEY)
            .and_then(|entry| entry.data.as_ref().and_then(R::unwrap).cloned())
    }

    /// Replaces the cached page without touching fetch status.
    pub fn set_data<R: Resource>(&self, page: Option<PagedResult<R>>) {
        let mut entry = self.entries.entry(R::KEY).or_default();
        entry.data = page.map(R::wrap);
    }

    pub fn state<R: Resource>(&self) -> QueryState<R> {
        match self.entries.get(&R::KEY) {
            Some(entry) => {
                let data = entry.data.as_ref().and_then(R::unwrap).cloned();
                let is_fetching = entry.status == FetchStatus::Fetching;
                QueryState {
                    is_loading: is_fetching && data.is_none(),
                    data,
                    params: entry.data_params.clone(),
                    status: entry.status,
                    mutation: entry.mutation,
                    error: entry.error.clone(),
                    is_fetching,
                    is_error: entry.status == FetchStatus::Error,
                    is_stale: entry.stale,
                }
            }
            None => QueryState {
                data: None,
                params: None,
                status: FetchStatus::Idle,
                mutation: MutationPhase::None,
                error: None,
                is_loading: false,
                is_fetching: false,
                is_error: false,
                is_stale: false,
            },
        }
    }

    /// Marks the entry stale so the next read goes to the server.
    pub fn invalidate(&self, key: QueryKey) {
        if let Some(mut entry) = self.entries.get_mut(&key) {
            entry.stale = true;
        }
    }

    pub fn is_stale(&self, key: QueryKey) -> bool {
        self.entries.get(&key).map(|entry| entry.stale).unwrap_or(false)
    }

    /// Abandons the in-flight fetch for `key`, if any. Its result will be
    /// discarded when it arrives.
    pub fn cancel(&self, key: QueryKey) -> bool {
        let Some(mut entry) = self.entries.get_mut(&key) else {
            return false;
        };
        if entry.status != FetchStatus::Fetching {
            return false;
        }

        entry.generation += 1;
        entry.requested = None;
        entry.status = if entry.data.is_some() {
            FetchStatus::Settled
        } else {
            FetchStatus::Idle
        };
        tracing::debug!(%key, generation = entry.generation, "fetch cancelled");
        true
    }

    /// Whether a read with `params` has to hit the server.
    pub fn needs_fetch(&self, key: QueryKey, params: &ListParams) -> bool {
        let Some(entry) = self.entries.get(&key) else {
            return true;
        };
        if entry.status == FetchStatus::Fetching {
            return entry.requested.as_ref() != Some(params);
        }

        entry.data.is_none()
            || entry.stale
            || entry.status == FetchStatus::Error
            || entry.data_params.as_ref() != Some(params)
    }

    /// Starts a fetch. Any fetch already in flight for the key is superseded.
    pub fn begin_fetch(&self, key: QueryKey, params: ListParams) -> FetchTicket {
        let mut entry = self.entries.entry(key).or_default();
        entry.generation += 1;
        entry.status = FetchStatus::Fetching;
        entry.requested = Some(params.clone());

        FetchTicket {
            key,
            generation: entry.generation,
            params,
        }
    }

    /// Records a fetch result. Returns `false` when the fetch had been
    /// cancelled or superseded and the result was dropped.
    pub fn finish_fetch<R: Resource>(&self, ticket: &FetchTicket, result: Result<PagedResult<R>, ApiError>) -> bool {
        let mut entry = self.entries.entry(ticket.key).or_default();
        if entry.generation != ticket.generation {
            tracing::debug!(
                key = %ticket.key,
                ticket = ticket.generation,
                current = entry.generation,
                "discarding superseded fetch result"
            );
            return false;
        }

        entry.requested = None;
        match result {
            Ok(page) => {
                entry.data = Some(R::wrap(page));
                entry.data_params = Some(ticket.params.clone());
                entry.status = FetchStatus::Settled;
                entry.error = None;
                entry.stale = false;
            }
            Err(err) => {
                entry.status = FetchStatus::Error;
                entry.error = Some(err);
            }
        }
        true
    }

    pub(crate) fn set_mutation(&self, key: QueryKey, phase: MutationPhase) {
        let mut entry = self.entries.entry(key).or_default();
        entry.mutation = phase;
    }
}

/// Result of [`ListQuery::read`]: the cached state right now, plus the
/// background refresh when one was started.
#[derive(Debug)]
pub struct QueryRead<R> {
    pub state: QueryState<R>,
    pub refresh: Option<JoinHandle<QueryState<R>>>,
}

/// List query for one resource: the cache entry plus the service that fills it.
pub struct ListQuery<R: Resource> {
    cache: Arc<QueryCache>,
    api: Arc<dyn ResourceApi<R>>,
    toaster: Toaster,
}

impl<R: Resource> Clone for ListQuery<R> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            api: self.api.clone(),
            toaster: self.toaster.clone(),
        }
    }
}

impl<R: Resource> ListQuery<R> {
    pub fn new(cache: Arc<QueryCache>, api: Arc<dyn ResourceApi<R>>, toaster: Toaster) -> Self {
        Self { cache, api, toaster }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub fn state(&self) -> QueryState<R> {
        self.cache.state::<R>()
    }

    /// Serves whatever is cached and, if it is missing, stale or for other
    /// parameters, refreshes it in the background.
    pub fn read(&self, params: ListParams) -> QueryRead<R> {
        let refresh = if self.cache.needs_fetch(R::KEY, &params) {
            let ticket = self.cache.begin_fetch(R::KEY, params);
            let query = self.clone();
            Some(tokio::spawn(async move { query.run(ticket).await }))
        } else {
            None
        };

        QueryRead {
            state: self.state(),
            refresh,
        }
    }

    /// Fetches `params` now and returns the state once it settles.
    pub async fn refetch(&self, params: ListParams) -> QueryState<R> {
        let ticket = self.cache.begin_fetch(R::KEY, params);
        self.run(ticket).await
    }

    async fn run(&self, ticket: FetchTicket) -> QueryState<R> {
        let params = ticket.params();
        let result = self.api.list(params.search_term(), params.page).await;
        let failure = result.as_ref().err().map(|err| err.message.clone());

        let applied = self.cache.finish_fetch(&ticket, result);
        if let (true, Some(message)) = (applied, failure) {
            tracing::warn!(key = %R::KEY, error = %message, "list fetch failed");
            self.toaster
                .error(format!("Failed to load {}: {}", R::KEY, message))
                .await;
        }

        self.state()
    }
}
