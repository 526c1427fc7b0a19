// ── Post filter store ──
//
// Search text and publication-status filter for the post list. Each
// field has its own `watch` channel so a subscriber only wakes when the
// field it reads actually changes.

use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use postdesk_api::PostListItem;

use crate::error::CoreError;

/// Publication-status filter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Published,
    Draft,
}

/// Point-in-time copy of the filter fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub search_query: String,
    pub status_filter: StatusFilter,
}

/// A resolved predicate over post list rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostFilter {
    needle: String,
    status: StatusFilter,
}

impl PostFilter {
    pub fn new(search_query: &str, status: StatusFilter) -> Self {
        Self {
            needle: search_query.to_lowercase(),
            status,
        }
    }

    /// Title contains the query (case-insensitive) and the status matches.
    pub fn matches(&self, post: &PostListItem) -> bool {
        let title_ok = self.needle.is_empty() || post.title.to_lowercase().contains(&self.needle);
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Published => post.is_published,
            StatusFilter::Draft => !post.is_published,
        };
        title_ok && status_ok
    }

    /// Keep the matching rows, preserving order.
    pub fn apply<'a>(&self, posts: &'a [PostListItem]) -> Vec<&'a PostListItem> {
        posts.iter().filter(|p| self.matches(p)).collect()
    }
}

impl From<&FilterState> for PostFilter {
    fn from(state: &FilterState) -> Self {
        Self::new(&state.search_query, state.status_filter)
    }
}

/// Observable filter state for one dashboard post list.
#[derive(Debug)]
pub struct PostFilterStore {
    search_query: watch::Sender<String>,
    status_filter: watch::Sender<StatusFilter>,
}

impl Default for PostFilterStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PostFilterStore {
    pub fn new() -> Self {
        let (search_query, _) = watch::channel(String::new());
        let (status_filter, _) = watch::channel(StatusFilter::default());
        Self {
            search_query,
            status_filter,
        }
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Setting the current value again notifies nobody.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.search_query.send_if_modified(|current| {
            if *current == query {
                return false;
            }
            *current = query;
            true
        });
    }

    pub fn set_status_filter(&self, status: StatusFilter) {
        self.status_filter.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }

    /// Back to an empty query and `all`.
    pub fn reset(&self) {
        debug!("resetting post filters");
        self.set_search_query(String::new());
        self.set_status_filter(StatusFilter::All);
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub fn search_query(&self) -> String {
        self.search_query.borrow().clone()
    }

    pub fn status_filter(&self) -> StatusFilter {
        *self.status_filter.borrow()
    }

    pub fn snapshot(&self) -> FilterState {
        FilterState {
            search_query: self.search_query(),
            status_filter: self.status_filter(),
        }
    }

    pub fn filter(&self) -> PostFilter {
        PostFilter::from(&self.snapshot())
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_search_query(&self) -> watch::Receiver<String> {
        self.search_query.subscribe()
    }

    pub fn subscribe_status_filter(&self) -> watch::Receiver<StatusFilter> {
        self.status_filter.subscribe()
    }

    /// Stream of search query values, starting with the current one.
    pub fn search_query_stream(&self) -> WatchStream<String> {
        WatchStream::new(self.search_query.subscribe())
    }

    pub fn status_filter_stream(&self) -> WatchStream<StatusFilter> {
        WatchStream::new(self.status_filter.subscribe())
    }
}

/// Provider for a `PostFilterStore`.
///
/// The store exists only while the scope is active. Every `activate()`
/// within one activation hands back the same instance.
#[derive(Debug, Default)]
pub struct FilterScope {
    store: Mutex<Option<Arc<PostFilterStore>>>,
}

impl FilterScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the store on first call, reuse it afterwards.
    pub fn activate(&self) -> Arc<PostFilterStore> {
        let mut slot = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slot.get_or_insert_with(|| {
            debug!("filter scope activated");
            Arc::new(PostFilterStore::new())
        }))
    }

    /// Drop the store. The next `activate()` starts from defaults.
    pub fn deactivate(&self) {
        let mut slot = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.take().is_some() {
            debug!("filter scope deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// The active store, or `FilterScopeInactive` outside a scope.
    pub fn store(&self) -> Result<Arc<PostFilterStore>, CoreError> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(CoreError::FilterScopeInactive)
    }
}
