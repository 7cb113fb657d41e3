//! Pool error types.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

/// Boxed error returned by connection lifecycle implementations.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while sizing, filling, using or draining a pool.
///
/// The type is cheaply cloneable so that a single connection attempt can be
/// observed by every caller waiting on it.
#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum PoolError {
    /// The pool configuration is invalid (for example a zero size).
    #[error("invalid pool configuration: {0}")]
    Configuration(String),

    /// An underlying connection could not be established.
    #[error("failed to establish connection: {0}")]
    Connection(#[source] Arc<dyn std::error::Error + Send + Sync + 'static>),

    /// The pool is draining or closed and admits no new acquisitions.
    #[error("connection pool is closed")]
    PoolClosed,

    /// No connection became available before the deadline.
    #[error("timed out after {0:?} waiting for a connection")]
    Timeout(Duration),

    /// The pool protocol was misused, for example a double release.
    #[error("pool invariant violated: {0}")]
    InvariantViolation(String),
}

impl PoolError {
    /// Wrap a lifecycle failure as a connection error.
    pub fn connection(err: impl Into<BoxError>) -> Self {
        Self::Connection(Arc::from(err.into()))
    }

    /// Whether retrying the operation later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

/// Result type for pool operations.
pub type Result<T> = std::result::Result<T, PoolError>;
