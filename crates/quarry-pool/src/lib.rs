//! # quarry-pool
//!
//! Bounded connection pool with lifecycle management.
//!
//! The pool does not speak any wire protocol. The embedding driver supplies a
//! [`ConnectionLifecycle`] that opens and closes transports; the pool decides
//! how many to open, who gets which one, and when they are torn down.
//!
//! ## Features
//!
//! - Capacity from an explicit `connection_limit` or `2 * cpus + 1`
//! - Eager fill with cleanup of partially established pools
//! - First-come-first-served acquisition with optional timeouts
//! - Cancellation-safe waiting (no phantom wait-queue entries)
//! - Graceful drain that waits for checked-out connections
//! - Status snapshots and cumulative metrics
//!
//! ## Example
//!
//! ```rust,ignore
//! use quarry_pool::{Pool, PoolBuilder};
//! use std::time::Duration;
//!
//! let pool = PoolBuilder::new()
//!     .connection_limit(5)
//!     .acquire_timeout(Some(Duration::from_secs(10)))
//!     .connect(Arc::new(lifecycle))
//!     .await?;
//!
//! // Get a connection from the pool
//! let conn = pool.get().await?;
//! // Use connection...
//! pool.release(conn)?;
//!
//! // Check pool status
//! let status = pool.status();
//! println!("Pool utilization: {:.1}%", status.utilization());
//!
//! // Close everything once outstanding work is done
//! pool.drain().await;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod connection;
pub mod error;
pub mod lifecycle;
pub mod pool;
pub mod sizer;

// Configuration
pub use config::PoolConfig;

// Error types
pub use error::{BoxError, PoolError};

// Pool types
pub use pool::{
    Pool, PoolBuilder, PoolId, PoolMetrics, PoolState, PoolStatus, PooledConnection,
};

// Connections and their lifecycle
pub use connection::{ConnectionId, ConnectionMetadata, ConnectionState};
pub use lifecycle::ConnectionLifecycle;

// Sizing
pub use sizer::{compute_capacity, host_cpu_count};
