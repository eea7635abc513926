use crate::key::CacheKey;
use crate::registry::OperationId;
use serde::Serialize;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Point-in-time counters of one operation's cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub capacity: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    pub stored: u64,
    pub refused: u64,
}

/// Capacity-limited store of computed results for one operation.
///
/// The capacity is an admission cap: once `at_most` distinct keys are stored,
/// new keys are refused and existing entries stay where they are. Nothing is
/// evicted; only [`clear`](Self::clear) (driven by a registry reset) empties it.
///
/// Admission check and insertion happen under the same write lock, so
/// concurrent `put`s never push the size past the capacity.
pub struct BoundedCache<R> {
    id: OperationId,
    entries: RwLock<HashMap<CacheKey, R>>,
    capacity: Option<NonZeroUsize>,
    hits: AtomicU64,
    misses: AtomicU64,
    stored: AtomicU64,
    refused: AtomicU64,
    saturated: AtomicBool,
}

impl<R: Clone> BoundedCache<R> {
    /// Copy of the stored result, if any.
    pub fn get(&self, key: &CacheKey) -> Option<R> {
        self.read().get(key).cloned()
    }

    /// Like [`get`](Self::get), but counted as a hit or a miss.
    pub(crate) fn fetch(&self, key: &CacheKey) -> Option<R> {
        let found = self.get(key);
        let counter = if found.is_some() { &self.hits } else { &self.misses };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.read().contains_key(key)
    }

    /// Stores `result` under `key` unless the cache is full.
    ///
    /// Returns `true` when `key` maps to a stored result afterwards. A key that
    /// is already present keeps its first result.
    pub fn put(&self, key: CacheKey, result: R) -> bool {
        let mut entries = self.write();
        if entries.contains_key(&key) {
            return true;
        }
        if let Some(capacity) = self.capacity {
            if entries.len() >= capacity.get() {
                drop(entries);
                self.refused.fetch_add(1, Ordering::Relaxed);
                if !self.saturated.swap(true, Ordering::Relaxed) {
                    crate::warn!("cache '{}' reached at_most={}, new argument sets will be computed without caching", self.id, capacity);
                } else {
                    crate::debug!("cache '{}' refused {}", self.id, key);
                }
                return false;
            }
        }
        entries.insert(key, result);
        self.stored.fetch_add(1, Ordering::Relaxed);
        true
    }
}

impl<R> BoundedCache<R> {
    pub fn new(id: OperationId, capacity: Option<NonZeroUsize>) -> Self {
        Self {
            id,
            entries: RwLock::new(HashMap::new()),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            stored: AtomicU64::new(0),
            refused: AtomicU64::new(0),
            saturated: AtomicBool::new(false),
        }
    }

    // A panic while holding the lock cannot leave a half-inserted entry behind,
    // so a poisoned map is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<CacheKey, R>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<CacheKey, R>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity.map(NonZeroUsize::get)
    }

    pub fn is_full(&self) -> bool {
        self.capacity().is_some_and(|cap| self.len() >= cap)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.len(),
            capacity: self.capacity(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
        }
    }

    /// Drops every entry and counter; the capacity is kept.
    pub(crate) fn clear(&self) {
        self.write().clear();
        for counter in [&self.hits, &self.misses, &self.stored, &self.refused] {
            counter.store(0, Ordering::Relaxed);
        }
        self.saturated.store(false, Ordering::Relaxed);
    }
}
