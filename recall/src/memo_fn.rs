use crate::args::Arguments;
use crate::dispatcher::through_cache;
use crate::error::{InvokeError, MemoError};
use crate::key::CacheKey;
use crate::registry::CacheHandle;
use std::convert::Infallible;
use std::sync::Arc;

type Compute<A, R> = Arc<dyn Fn(A) -> R + Send + Sync>;

/// A computation bound to its own cache. Callers invoke the wrapper instead
/// of the original function; the function itself stays uncached.
pub struct MemoFn<A, R> {
    handle: CacheHandle<R>,
    enabled: bool,
    compute: Compute<A, R>,
}

impl<A, R> Clone for MemoFn<A, R> {
    fn clone(&self) -> Self {
        MemoFn { handle: self.handle.clone(), enabled: self.enabled, compute: Arc::clone(&self.compute) }
    }
}

impl<A, R> MemoFn<A, R>
where
    A: Arguments,
    R: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(handle: CacheHandle<R>, enabled: bool, compute: Compute<A, R>) -> Self {
        MemoFn { handle, enabled, compute }
    }

    pub fn call(&self, args: A) -> Result<R, MemoError> {
        self.call_with(args, false)
    }

    /// `non_deterministic` marks a call carrying behavior its arguments do not
    /// capture; such calls always recompute and leave the cache alone.
    pub fn call_with(&self, args: A, non_deterministic: bool) -> Result<R, MemoError> {
        if non_deterministic || !self.enabled {
            return Ok((self.compute)(args));
        }
        let key = CacheKey::build(&args.to_values())?;
        through_cache::<R, Infallible, _>(&*self.handle, key, || Ok((self.compute)(args))).map_err(|e| match e {
            InvokeError::Memo(e) => e,
            InvokeError::Compute(never) => match never {},
        })
    }

    pub fn handle(&self) -> &CacheHandle<R> {
        &self.handle
    }
}

/// [`MemoFn`] over a fallible computation: `Ok` results are cached, errors are
/// handed back untouched.
pub struct TryMemoFn<A, T, E> {
    handle: CacheHandle<T>,
    enabled: bool,
    compute: Compute<A, Result<T, E>>,
}

impl<A, T, E> Clone for TryMemoFn<A, T, E> {
    fn clone(&self) -> Self {
        TryMemoFn { handle: self.handle.clone(), enabled: self.enabled, compute: Arc::clone(&self.compute) }
    }
}

impl<A, T, E> TryMemoFn<A, T, E>
where
    A: Arguments,
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(handle: CacheHandle<T>, enabled: bool, compute: Compute<A, Result<T, E>>) -> Self {
        TryMemoFn { handle, enabled, compute }
    }

    pub fn call(&self, args: A) -> Result<T, InvokeError<E>> {
        self.call_with(args, false)
    }

    pub fn call_with(&self, args: A, non_deterministic: bool) -> Result<T, InvokeError<E>> {
        if non_deterministic || !self.enabled {
            return (self.compute)(args).map_err(InvokeError::Compute);
        }
        let key = CacheKey::build(&args.to_values())?;
        through_cache(&*self.handle, key, || (self.compute)(args))
    }

    pub fn handle(&self) -> &CacheHandle<T> {
        &self.handle
    }
}
