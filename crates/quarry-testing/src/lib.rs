//! # quarry-testing
//!
//! Test infrastructure for the quarry pool and client.
//!
//! [`MockLifecycle`] stands in for a database driver. It hands out in-memory
//! transports, counts every connect and close, and can be told to fail or
//! stall so tests can exercise establishment failures, timeouts and
//! cancellation without a server.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use quarry_pool::PoolBuilder;
//! use quarry_testing::MockLifecycle;
//!
//! let lifecycle = Arc::new(MockLifecycle::new());
//! let pool = PoolBuilder::new()
//!     .connection_limit(3)
//!     .connect(Arc::clone(&lifecycle))
//!     .await?;
//!
//! assert_eq!(lifecycle.open_connections(), 3);
//! pool.drain().await;
//! assert_eq!(lifecycle.open_connections(), 0);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod mock;

pub use mock::{MockError, MockLifecycle, MockTransport};

/// Install a `tracing` subscriber for tests.
///
/// Honors `RUST_LOG` and writes through the test harness so output is only
/// shown for failing tests. Safe to call from every test.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}
