//! Pool configuration.

use std::time::Duration;

use crate::error::{PoolError, Result};
use crate::sizer;

/// Configuration for a connection pool.
///
/// The configuration is read once when the pool is created and is immutable
/// for the pool's lifetime.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Explicit number of connections. When `None` the capacity is derived
    /// from [`physical_cpus`](Self::physical_cpus).
    pub connection_limit: Option<i64>,

    /// CPU count used by the derived capacity formula.
    pub physical_cpus: usize,

    /// Default timeout used by [`Pool::get`](crate::Pool::get).
    /// `None` waits indefinitely.
    pub acquire_timeout: Option<Duration>,

    /// Upper bound on establishing a single connection. `None` disables it.
    pub connect_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            connection_limit: None,
            physical_cpus: sizer::host_cpu_count(),
            acquire_timeout: Some(Duration::from_secs(10)),
            connect_timeout: Some(Duration::from_secs(5)),
        }
    }
}

impl PoolConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit connection limit.
    #[must_use]
    pub fn connection_limit(mut self, limit: i64) -> Self {
        self.connection_limit = Some(limit);
        self
    }

    /// Override the CPU count used by the derived capacity formula.
    #[must_use]
    pub fn physical_cpus(mut self, count: usize) -> Self {
        self.physical_cpus = count;
        self
    }

    /// Set the default acquire timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Set the per-connection establishment timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// The number of connections a pool built from this configuration holds.
    pub fn capacity(&self) -> Result<usize> {
        sizer::compute_capacity(self.connection_limit, self.physical_cpus)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        self.capacity()?;
        if self.connect_timeout.is_some_and(|t| t.is_zero()) {
            return Err(PoolError::Configuration(
                "connect_timeout must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}
