//! Autocomplete result cache / 自动补全缓存
//!
//! Bounded LRU keyed by the exact prefix, with a per-entry time-to-live.
//! Expired entries are dropped on access. When built with an invalidation
//! subscription, pending "invalidate caches" events are drained on every
//! access and clear the whole cache.

use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::time::Duration;
use tokio::time::Instant;

use crate::events::CacheSubscription;
use crate::models::AutoCompleteItem;

struct CacheEntry {
    items: Vec<AutoCompleteItem>,
    inserted_at: Instant,
}

struct CacheInner {
    entries: LruCache<String, CacheEntry>,
    events: Option<CacheSubscription>,
}

impl CacheInner {
    fn apply_invalidations(&mut self) {
        let invalidated = self
            .events
            .as_mut()
            .map(|events| events.take_invalidation())
            .unwrap_or(false);
        if invalidated {
            tracing::debug!("Auto-complete cache invalidated ({} entries)", self.entries.len());
            self.entries.clear();
        }
    }
}

pub struct AutoCompleteCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
}

impl AutoCompleteCache {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self::build(max_entries, ttl, None)
    }

    /// Cache that clears itself on every broadcast invalidation / 订阅失效事件
    pub fn with_events(max_entries: usize, ttl: Duration, events: CacheSubscription) -> Self {
        Self::build(max_entries, ttl, Some(events))
    }

    fn build(max_entries: usize, ttl: Duration, events: Option<CacheSubscription>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(CacheInner { entries: LruCache::new(capacity), events }),
            ttl,
        }
    }

    /// Cached items for `prefix`, if present and younger than the TTL
    pub fn get(&self, prefix: &str) -> Option<Vec<AutoCompleteItem>> {
        let mut inner = self.inner.lock();
        inner.apply_invalidations();

        if let Some(entry) = inner.entries.get(prefix) {
            if entry.inserted_at.elapsed() < self.ttl {
                return Some(entry.items.clone());
            }
            // expired
            inner.entries.pop(prefix);
        }
        None
    }

    /// Store items, evicting the least recently used entry when full
    pub fn set(&self, prefix: &str, items: Vec<AutoCompleteItem>) {
        let mut inner = self.inner.lock();
        inner.apply_invalidations();
        inner.entries.put(
            prefix.to_string(),
            CacheEntry { items, inserted_at: Instant::now() },
        );
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for AutoCompleteCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoCompleteCache")
            .field("len", &self.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
