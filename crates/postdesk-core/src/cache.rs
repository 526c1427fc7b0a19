// ── Query cache ──
//
// Keyed cache of fetched pages. Entries go stale after `STALE_TIME` or
// when invalidated; a stale entry is refetched on the next read. Failed
// fetches are never cached and never retried here.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, trace};

/// How long a fetched entry is served without refetching.
pub const STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Query key prefix for the dashboard post list.
pub const POSTS_LIST: &str = "posts-list";

/// Identity of a cached query: a resource prefix plus the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    pub prefix: &'static str,
    pub page: u32,
}

impl QueryKey {
    pub fn posts_list(page: u32) -> Self {
        Self {
            prefix: POSTS_LIST,
            page,
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[page={}]", self.prefix, self.page)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    fetched_at: Instant,
    invalidated: bool,
}

impl<V> Entry<V> {
    fn is_fresh(&self, stale_time: Duration) -> bool {
        !self.invalidated && self.fetched_at.elapsed() < stale_time
    }
}

/// Concurrent query cache.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: DashMap<QueryKey, Entry<V>>,
    stale_time: Duration,
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new(STALE_TIME)
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            stale_time,
        }
    }

    /// Fresh cached value, if any.
    pub fn get(&self, key: &QueryKey) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(self.stale_time))
            .map(|entry| entry.value.clone())
    }

    pub fn insert(&self, key: QueryKey, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                fetched_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Serve from cache when fresh, otherwise run `fetch` and store the
    /// result. Errors pass through untouched.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: QueryKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            trace!(%key, "cache hit");
            return Ok(value);
        }
        debug!(%key, "cache miss, fetching");
        let value = fetch().await?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Mark every entry under `prefix` stale. Returns how many were hit.
    pub fn invalidate(&self, prefix: &str) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if entry.key().prefix == prefix {
                entry.invalidated = true;
                count += 1;
            }
        }
        debug!(prefix, count, "invalidated queries");
        count
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
