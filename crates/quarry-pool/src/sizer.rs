//! Pool capacity computation.

use std::num::NonZeroUsize;

use crate::error::{PoolError, Result};

/// Compute the number of connections a pool should hold.
///
/// An explicit limit is returned unchanged. Without one the capacity is
/// `2 * physical_cpu_count + 1`.
///
/// # Errors
///
/// Returns [`PoolError::Configuration`] when the explicit limit is zero or
/// negative, or when no limit is given and the CPU count is zero. Invalid
/// values are reported, never clamped.
///
/// # Example
///
/// ```
/// use quarry_pool::sizer::compute_capacity;
///
/// assert_eq!(compute_capacity(Some(5), 8).unwrap(), 5);
/// assert_eq!(compute_capacity(None, 4).unwrap(), 9);
/// assert!(compute_capacity(Some(0), 4).is_err());
/// ```
pub fn compute_capacity(explicit_limit: Option<i64>, physical_cpu_count: usize) -> Result<usize> {
    match explicit_limit {
        Some(limit) if limit >= 1 => usize::try_from(limit).map_err(|_| {
            PoolError::Configuration(format!("connection_limit {limit} exceeds platform limits"))
        }),
        Some(limit) => Err(PoolError::Configuration(format!(
            "connection_limit must be at least 1, got {limit}"
        ))),
        None if physical_cpu_count == 0 => Err(PoolError::Configuration(
            "physical CPU count must be at least 1".into(),
        )),
        None => Ok(physical_cpu_count.saturating_mul(2).saturating_add(1)),
    }
}

/// CPU count reported by the host, used when no override is configured.
#[must_use]
pub fn host_cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}
