//! Connection identity and state.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique connection identifier.
///
/// Identifiers are never reused, so connections from a pool created after a
/// reconnect are always distinguishable from those of the previous pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw identifier value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// State of a pooled connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Available for checkout.
    Idle,
    /// Checked out by exactly one caller.
    InUse,
    /// Torn down during pool drain. Terminal.
    Closed,
}

/// Metadata tracked for every connection in a pool.
#[derive(Debug, Clone)]
pub struct ConnectionMetadata {
    /// Connection identifier.
    pub id: ConnectionId,
    /// Current state.
    pub state: ConnectionState,
    /// When the connection was established.
    pub created_at: Instant,
    /// When the connection was last checked out.
    pub last_checkout: Option<Instant>,
    /// Number of times the connection has been checked out.
    pub checkout_count: u64,
}

impl ConnectionMetadata {
    pub(crate) fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: ConnectionState::Idle,
            created_at: Instant::now(),
            last_checkout: None,
            checkout_count: 0,
        }
    }

    pub(crate) fn mark_checked_out(&mut self) {
        self.state = ConnectionState::InUse;
        self.last_checkout = Some(Instant::now());
        self.checkout_count += 1;
    }

    /// Age of the connection.
    #[must_use]
    pub fn age(&self) -> std::time::Duration {
        self.created_at.elapsed()
    }
}
