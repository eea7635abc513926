use config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoError {

    #[error("argument #{position} cannot be used as a cache key: {reason}")]
    NonHashableArgument { position: usize, reason: String },

    #[error("operation '{id}' is already memoized with at_most={existing:?}, requested at_most={requested:?}")]
    AlreadyMemoized { id: String, existing: Option<usize>, requested: Option<usize> },

    #[error("operation '{id}' caches results of type {expected}, not {found}")]
    TypeMismatch { id: String, expected: &'static str, found: &'static str },

    #[error("operation '{id}' declared with at_most=0, capacity must be positive")]
    InvalidCapacity { id: String },

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl MemoError {
    pub(crate) fn non_hashable(position: usize, reason: impl Into<String>) -> Self {
        MemoError::NonHashableArgument { position, reason: reason.into() }
    }
}

/// Failure of a memoized call: either the cache refused to take part
/// (see [`MemoError`]) or the computation itself failed.
#[derive(Debug, Error)]
pub enum InvokeError<E> {

    #[error(transparent)]
    Memo(#[from] MemoError),

    #[error("computation failed: {0}")]
    Compute(E),
}

impl<E> InvokeError<E> {
    pub fn into_compute(self) -> Option<E> {
        match self {
            InvokeError::Compute(e) => Some(e),
            InvokeError::Memo(_) => None,
        }
    }
}
