//! Client error types.

use quarry_pool::{BoxError, PoolError};
use thiserror::Error;

use crate::hooks::HookError;

/// Errors surfaced by the client at its connect, disconnect and request
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The connection string could not be parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// Pool sizing, connection establishment, acquisition or release failed.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// One or more exit hooks failed. Every hook still ran and the pool was
    /// drained before this was returned.
    #[error("{} exit hook(s) failed during disconnect", .0.len())]
    ExitHooks(Vec<HookError>),

    /// The request itself failed on its connection.
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// Installing an OS signal handler failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// The underlying pool error, if this is one.
    #[must_use]
    pub fn as_pool_error(&self) -> Option<&PoolError> {
        match self {
            Self::Pool(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;
