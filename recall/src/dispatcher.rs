use crate::cache::BoundedCache;
use crate::error::{InvokeError, MemoError};
use crate::key::CacheKey;
use crate::registry::Registry;
use crate::value::Value;
use std::convert::Infallible;
use std::sync::Arc;

/// Call-site contract: decides per call whether to serve from the cache,
/// compute and store, or bypass the cache altogether.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<Registry>,
}

impl Dispatcher {
    pub fn new(registry: Arc<Registry>) -> Self {
        Dispatcher { registry }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Runs `compute` through the cache registered for `id`.
    ///
    /// * `non_deterministic` calls (callbacks, anything the argument list does
    ///   not capture) bypass the cache: no key is built, nothing is read or stored.
    /// * Arguments that cannot form a key fail the call before `compute` runs.
    /// * Unregistered operations are computed without caching.
    /// * A failed computation is returned as [`InvokeError::Compute`] and never cached.
    pub fn invoke<R, E, F>(&self, id: &str, args: &[Value], non_deterministic: bool, compute: F) -> Result<R, InvokeError<E>>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce() -> Result<R, E>,
    {
        if non_deterministic || !self.registry.is_enabled() {
            crate::debug!("bypassing cache of '{}'", id);
            return compute().map_err(InvokeError::Compute);
        }
        let key = CacheKey::build(args)?;
        match self.registry.lookup::<R>(id)? {
            Some(cache) => through_cache(&*cache, key, compute),
            None => compute().map_err(InvokeError::Compute),
        }
    }

    /// [`invoke`](Self::invoke) for computations that cannot fail.
    pub fn invoke_pure<R, F>(&self, id: &str, args: &[Value], non_deterministic: bool, compute: F) -> Result<R, MemoError>
    where
        R: Clone + Send + Sync + 'static,
        F: FnOnce() -> R,
    {
        self.invoke::<R, Infallible, _>(id, args, non_deterministic, || Ok(compute()))
            .map_err(|e| match e {
                InvokeError::Memo(e) => e,
                InvokeError::Compute(never) => match never {},
            })
    }
}

pub(crate) fn through_cache<R, E, F>(cache: &BoundedCache<R>, key: CacheKey, compute: F) -> Result<R, InvokeError<E>>
where
    R: Clone,
    F: FnOnce() -> Result<R, E>,
{
    if let Some(hit) = cache.fetch(&key) {
        return Ok(hit);
    }
    let fresh = compute().map_err(InvokeError::Compute)?;
    cache.put(key, fresh.clone());
    Ok(fresh)
}
