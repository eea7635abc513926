use crate::args::Arguments;
use crate::cache::{BoundedCache, CacheStats};
use crate::config::MemoConfig;
use crate::error::MemoError;
use crate::memo_fn::{MemoFn, TryMemoFn};
use std::any::{type_name, Any, TypeId};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::ops::Deref;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Stable identifier of a memoized operation, usually its qualified name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(Arc<str>);

impl OperationId {
    pub fn qualified(scope: &str, name: &str) -> Self {
        OperationId(format!("{}::{}", scope, name).into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OperationId {
    fn from(s: &str) -> Self {
        OperationId(s.into())
    }
}

impl From<String> for OperationId {
    fn from(s: String) -> Self {
        OperationId(s.into())
    }
}

impl Borrow<str> for OperationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shared handle to the cache of one operation.
pub struct CacheHandle<R> {
    cache: Arc<BoundedCache<R>>,
}

impl<R> Clone for CacheHandle<R> {
    fn clone(&self) -> Self {
        CacheHandle { cache: Arc::clone(&self.cache) }
    }
}

impl<R> Deref for CacheHandle<R> {
    type Target = BoundedCache<R>;

    fn deref(&self) -> &Self::Target {
        &self.cache
    }
}

impl<R> CacheHandle<R> {
    pub fn same_cache(&self, other: &CacheHandle<R>) -> bool {
        Arc::ptr_eq(&self.cache, &other.cache)
    }
}

// Operations that do not need the result type.
trait ErasedCache: Send + Sync {
    fn clear(&self);
    fn stats(&self) -> CacheStats;
    fn capacity(&self) -> Option<usize>;
}

impl<R: Send + Sync> ErasedCache for BoundedCache<R> {
    fn clear(&self) {
        BoundedCache::clear(self)
    }

    fn stats(&self) -> CacheStats {
        BoundedCache::stats(self)
    }

    fn capacity(&self) -> Option<usize> {
        BoundedCache::capacity(self)
    }
}

struct Slot {
    typed: Arc<dyn Any + Send + Sync>,
    erased: Arc<dyn ErasedCache>,
    type_id: TypeId,
    type_name: &'static str,
}

impl Slot {
    fn new<R: Clone + Send + Sync + 'static>(cache: Arc<BoundedCache<R>>) -> Self {
        Slot {
            typed: cache.clone() as Arc<dyn Any + Send + Sync>,
            erased: cache as Arc<dyn ErasedCache>,
            type_id: TypeId::of::<R>(),
            type_name: type_name::<R>(),
        }
    }

    fn handle<R: Clone + Send + Sync + 'static>(&self, id: &str) -> Result<CacheHandle<R>, MemoError> {
        if self.type_id != TypeId::of::<R>() {
            return Err(MemoError::TypeMismatch { id: id.to_string(), expected: self.type_name, found: type_name::<R>() });
        }
        Arc::downcast::<BoundedCache<R>>(Arc::clone(&self.typed))
            .map(|cache| CacheHandle { cache })
            .map_err(|_| MemoError::TypeMismatch { id: id.to_string(), expected: self.type_name, found: type_name::<R>() })
    }
}

/// Owner of every operation's cache; one cache per [`OperationId`].
///
/// Re-registering an identifier with the same result type and capacity hands
/// back the live cache. A different capacity is rejected with
/// [`MemoError::AlreadyMemoized`], a different result type with
/// [`MemoError::TypeMismatch`]; a second cache is never created.
#[derive(Default)]
pub struct Registry {
    slots: Mutex<HashMap<OperationId, Slot>>,
    config: MemoConfig,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registries never touch the process-wide log level, see [`MemoConfig::init_logging`].
    pub fn with_config(config: MemoConfig) -> Self {
        Registry { slots: Mutex::new(HashMap::new()), config }
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<OperationId, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn register<R>(&self, id: impl Into<OperationId>, at_most: Option<usize>) -> Result<CacheHandle<R>, MemoError>
    where
        R: Clone + Send + Sync + 'static,
    {
        let id = id.into();
        let requested = self.config.effective_capacity(id.as_str(), at_most);
        let capacity = match requested {
            Some(0) => return Err(MemoError::InvalidCapacity { id: id.to_string() }),
            other => other.and_then(NonZeroUsize::new),
        };

        let mut slots = self.slots();
        if let Some(slot) = slots.get(id.as_str()) {
            let handle = slot.handle::<R>(id.as_str())?;
            let existing = handle.capacity();
            if existing != requested {
                crate::warn!("operation '{}' re-declared with at_most={:?}, keeping at_most={:?}", id, requested, existing);
                return Err(MemoError::AlreadyMemoized { id: id.to_string(), existing, requested });
            }
            return Ok(handle);
        }

        let cache = Arc::new(BoundedCache::<R>::new(id.clone(), capacity));
        slots.insert(id.clone(), Slot::new(Arc::clone(&cache)));
        drop(slots);
        crate::info!("memoizing '{}' ({}) with at_most={:?}", id, type_name::<R>(), requested);
        Ok(CacheHandle { cache })
    }

    /// Cache bound to `id`, if the operation was registered.
    pub fn lookup<R>(&self, id: &str) -> Result<Option<CacheHandle<R>>, MemoError>
    where
        R: Clone + Send + Sync + 'static,
    {
        self.slots().get(id).map(|slot| slot.handle::<R>(id)).transpose()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.slots().contains_key(id)
    }

    /// Empties the cache of `id`, keeping its capacity. Returns false for an
    /// unknown operation.
    pub fn reset(&self, id: &str) -> bool {
        let erased = self.slots().get(id).map(|slot| Arc::clone(&slot.erased));
        match erased {
            Some(cache) => {
                cache.clear();
                crate::info!("reset cache of '{}'", id);
                true
            }
            None => false,
        }
    }

    pub fn reset_all(&self) {
        let caches: Vec<Arc<dyn ErasedCache>> = self.slots().values().map(|slot| Arc::clone(&slot.erased)).collect();
        for cache in &caches {
            cache.clear();
        }
        crate::info!("reset {} caches", caches.len());
    }

    pub fn operations(&self) -> Vec<OperationId> {
        let mut ids: Vec<OperationId> = self.slots().keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn capacity(&self, id: &str) -> Option<Option<usize>> {
        self.slots().get(id).map(|slot| slot.erased.capacity())
    }

    pub fn stats(&self, id: &str) -> Option<CacheStats> {
        self.slots().get(id).map(|slot| slot.erased.stats())
    }

    /// Statistics of every operation, sorted by identifier.
    pub fn report(&self) -> Vec<(OperationId, CacheStats)> {
        let mut report: Vec<(OperationId, CacheStats)> =
            self.slots().iter().map(|(id, slot)| (id.clone(), slot.erased.stats())).collect();
        report.sort_by(|a, b| a.0.cmp(&b.0));
        report
    }

    /// Registers `id` and wraps `compute` so that every call goes through its cache.
    pub fn memoize<A, R, F>(&self, id: impl Into<OperationId>, at_most: Option<usize>, compute: F) -> Result<MemoFn<A, R>, MemoError>
    where
        A: Arguments,
        R: Clone + Send + Sync + 'static,
        F: Fn(A) -> R + Send + Sync + 'static,
    {
        let handle = self.register::<R>(id, at_most)?;
        Ok(MemoFn::new(handle, self.is_enabled(), Arc::new(compute)))
    }

    /// Like [`memoize`](Self::memoize) for computations that can fail; only
    /// successful results are cached.
    pub fn memoize_fallible<A, T, E, F>(&self, id: impl Into<OperationId>, at_most: Option<usize>, compute: F) -> Result<TryMemoFn<A, T, E>, MemoError>
    where
        A: Arguments,
        T: Clone + Send + Sync + 'static,
        F: Fn(A) -> Result<T, E> + Send + Sync + 'static,
    {
        let handle = self.register::<T>(id, at_most)?;
        Ok(TryMemoFn::new(handle, self.is_enabled(), Arc::new(compute)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::key::CacheKey;

    #[test]
    fn register_is_idempotent_for_same_declaration() {
        let registry = Registry::new();
        let a = registry.register::<u64>("fib", Some(2)).unwrap();
        let b = registry.register::<u64>("fib", Some(2)).unwrap();
        assert!(a.same_cache(&b));
        assert_eq!(registry.operations(), vec![OperationId::from("fib")]);
    }

    #[test]
    fn conflicting_capacity_is_rejected() {
        let registry = Registry::new();
        registry.register::<u64>("fib", Some(2)).unwrap();
        match registry.register::<u64>("fib", None) {
            Err(MemoError::AlreadyMemoized { existing, requested, .. }) => {
                assert_eq!(existing, Some(2));
                assert_eq!(requested, None);
            }
            other => panic!("expected AlreadyMemoized, got {:?}", other.map(|_| ())),
        }
        assert_eq!(registry.capacity("fib"), Some(Some(2)));
    }

    #[test]
    fn conflicting_result_type_is_rejected() {
        let registry = Registry::new();
        registry.register::<u64>("fib", None).unwrap();
        let err = registry.register::<String>("fib", None).map(|_| ()).unwrap_err();
        assert!(matches!(err, MemoError::TypeMismatch { expected: "u64", .. }));
        assert!(registry.lookup::<String>("fib").is_err());
    }

    #[test]
    fn zero_capacity_is_invalid() {
        let registry = Registry::new();
        let err = registry.register::<u64>("fib", Some(0)).map(|_| ()).unwrap_err();
        assert!(matches!(err, MemoError::InvalidCapacity { .. }));
        assert!(!registry.is_registered("fib"));
    }

    #[test]
    fn lookup_unknown_is_none() {
        let registry = Registry::new();
        assert!(registry.lookup::<u64>("nope").unwrap().is_none());
        assert!(!registry.reset("nope"));
        assert!(registry.stats("nope").is_none());
    }

    #[test]
    fn reset_discards_entries_and_keeps_capacity() {
        let registry = Registry::new();
        let handle = registry.register::<u64>("sq", Some(3)).unwrap();
        handle.put(CacheKey::build(&args![4]).unwrap(), 16);
        assert_eq!(registry.stats("sq").unwrap().size, 1);

        assert!(registry.reset("sq"));
        assert!(handle.is_empty());
        assert_eq!(registry.capacity("sq"), Some(Some(3)));
        let again = registry.lookup::<u64>("sq").unwrap().unwrap();
        assert!(again.same_cache(&handle));
    }

    #[test]
    fn reset_all_clears_every_operation() {
        let registry = Registry::new();
        let a = registry.register::<u64>("a", None).unwrap();
        let b = registry.register::<String>("b", None).unwrap();
        a.put(CacheKey::empty(), 1);
        b.put(CacheKey::empty(), "x".into());
        registry.reset_all();
        assert!(a.is_empty() && b.is_empty());
        assert_eq!(registry.report().len(), 2);
    }

    #[test]
    fn config_overrides_declared_capacity() {
        let config = MemoConfig::from_toml_str(
            r#"
            default_at_most = 7
            [operations.fib]
            at_most = 1
            "#,
        )
        .unwrap();
        let registry = Registry::with_config(config);
        assert_eq!(registry.register::<u64>("fib", Some(100)).unwrap().capacity(), Some(1));
        assert_eq!(registry.register::<u64>("other", None).unwrap().capacity(), Some(7));
    }

    #[test]
    fn registry_config_leaves_log_level_alone() {
        let before = crate::logger::level();
        let quiet = if before == crate::logger::Level::Off { crate::logger::Level::Debug } else { crate::logger::Level::Off };
        let registry = Registry::with_config(MemoConfig { log_level: Some(quiet), ..MemoConfig::default() });
        assert_eq!(registry.config().log_level, Some(quiet));
        assert_eq!(crate::logger::level(), before);
    }

    #[test]
    fn qualified_ids() {
        let id = OperationId::qualified("billing", "quote");
        assert_eq!(id.as_str(), "billing::quote");
        assert_eq!(id.to_string(), "billing::quote");
    }
}
