//! recall memoizes pure, deterministic computations: a call with an argument list seen before is
//! answered from a per-operation cache instead of being executed again.
//!
//! A [`Registry`] owns one [`BoundedCache`] per operation identifier. Arguments are canonicalized into a
//! [`CacheKey`]; the [`Dispatcher`] (or a [`MemoFn`] wrapper produced by [`Registry::memoize`] and the
//! `#[memoize]` attribute) decides per call whether to serve a stored result, compute and store, or bypass.
//!
//! Capacity is an admission cap, not an eviction scheme: with `at_most = N` the first N distinct argument
//! sets are kept and later ones are computed on every call.
//!
//! Only referentially transparent operations may be memoized; the cache cannot tell a stale result from a
//! fresh one.

mod arg_macros;
pub mod args;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod key;
pub mod logger;
pub mod memo_fn;
pub mod registry;
pub mod value;

pub use args::Arguments;
pub use cache::{BoundedCache, CacheStats};
pub use crate::config::{MemoConfig, OperationSettings};
pub use dispatcher::Dispatcher;
pub use error::{InvokeError, MemoError};
pub use key::{CacheKey, KeyPart};
pub use macros::memoize;
pub use memo_fn::{MemoFn, TryMemoFn};
pub use registry::{CacheHandle, OperationId, Registry};
pub use value::{ToValue, Value};
