//! In-memory connection lifecycle with fault injection.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use quarry_pool::{BoxError, ConnectionId, ConnectionLifecycle};
use thiserror::Error;

/// Failures produced by the mock driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MockError {
    /// A connect attempt was configured to fail.
    #[error("connection refused (attempt {attempt})")]
    ConnectRefused {
        /// One-based connect attempt number.
        attempt: usize,
    },

    /// Closing a transport was configured to fail.
    #[error("failed to close {0}")]
    CloseFailed(ConnectionId),

    /// A query was rejected.
    #[error("query rejected on {id}: {sql}")]
    QueryRejected {
        /// Connection the query ran on.
        id: ConnectionId,
        /// The rejected statement.
        sql: String,
    },
}

#[derive(Debug, Default)]
struct MockState {
    connect_attempts: usize,
    close_count: usize,
    open: HashSet<ConnectionId>,
    closed: Vec<ConnectionId>,
    busy: HashSet<ConnectionId>,
    overlapping_uses: usize,
    executed: Vec<(ConnectionId, String)>,

    fail_attempts: HashSet<usize>,
    fail_remaining: usize,
    fail_closes: bool,
    reject_queries: bool,
    connect_delay: Option<Duration>,
    query_delay: Option<Duration>,
}

/// A [`ConnectionLifecycle`] backed by in-memory transports.
///
/// All knobs use interior mutability so a test can change behavior while a
/// pool built on the lifecycle is live.
#[derive(Debug, Default)]
pub struct MockLifecycle {
    state: Arc<Mutex<MockState>>,
}

impl MockLifecycle {
    /// Create a lifecycle whose connects and closes always succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `attempt`-th connect (one-based, counted over the lifetime of
    /// the lifecycle).
    pub fn fail_connect_attempt(&self, attempt: usize) {
        self.state.lock().fail_attempts.insert(attempt);
    }

    /// Fail the next `count` connect attempts.
    pub fn fail_next_connects(&self, count: usize) {
        self.state.lock().fail_remaining = count;
    }

    /// Make every close report an error. The transport is still released.
    pub fn fail_closes(&self, fail: bool) {
        self.state.lock().fail_closes = fail;
    }

    /// Reject every query with [`MockError::QueryRejected`].
    pub fn reject_queries(&self, reject: bool) {
        self.state.lock().reject_queries = reject;
    }

    /// Delay each connect by `delay`.
    pub fn set_connect_delay(&self, delay: Option<Duration>) {
        self.state.lock().connect_delay = delay;
    }

    /// Delay each query by `delay`.
    pub fn set_query_delay(&self, delay: Option<Duration>) {
        self.state.lock().query_delay = delay;
    }

    /// Connect attempts made so far, successful or not.
    #[must_use]
    pub fn connect_attempts(&self) -> usize {
        self.state.lock().connect_attempts
    }

    /// Transports closed so far.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.state.lock().close_count
    }

    /// Transports established and not yet closed.
    #[must_use]
    pub fn open_connections(&self) -> usize {
        self.state.lock().open.len()
    }

    /// Ids of closed transports in close order.
    #[must_use]
    pub fn closed_ids(&self) -> Vec<ConnectionId> {
        self.state.lock().closed.clone()
    }

    /// Number of times a query started on a connection that was already
    /// running one. Always zero when the pool hands out connections
    /// exclusively.
    #[must_use]
    pub fn overlapping_uses(&self) -> usize {
        self.state.lock().overlapping_uses
    }

    /// Every executed statement with the connection it ran on.
    #[must_use]
    pub fn executed(&self) -> Vec<(ConnectionId, String)> {
        self.state.lock().executed.clone()
    }
}

#[async_trait]
impl ConnectionLifecycle for MockLifecycle {
    type Transport = MockTransport;

    async fn connect(&self, id: ConnectionId) -> Result<MockTransport, BoxError> {
        let (attempt, delay) = {
            let mut state = self.state.lock();
            state.connect_attempts += 1;
            (state.connect_attempts, state.connect_delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.state.lock();
        let fail = state.fail_attempts.remove(&attempt) || state.fail_remaining > 0;
        if fail {
            state.fail_remaining = state.fail_remaining.saturating_sub(1);
            tracing::debug!(connection_id = %id, attempt, "mock connect refused");
            return Err(MockError::ConnectRefused { attempt }.into());
        }

        state.open.insert(id);
        tracing::trace!(connection_id = %id, attempt, "mock connection opened");
        Ok(MockTransport {
            id,
            state: Arc::clone(&self.state),
        })
    }

    async fn close(&self, id: ConnectionId, transport: MockTransport) -> Result<(), BoxError> {
        drop(transport);
        let mut state = self.state.lock();
        state.open.remove(&id);
        state.closed.push(id);
        state.close_count += 1;
        if state.fail_closes {
            return Err(MockError::CloseFailed(id).into());
        }
        Ok(())
    }
}

/// An in-memory transport handed out by [`MockLifecycle`].
#[derive(Debug)]
pub struct MockTransport {
    id: ConnectionId,
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    /// The connection this transport belongs to.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Run a statement. Echoes the statement back tagged with the connection.
    pub async fn query(&mut self, sql: &str) -> Result<String, MockError> {
        let (delay, reject) = {
            let mut state = self.state.lock();
            if !state.busy.insert(self.id) {
                state.overlapping_uses += 1;
            }
            state.executed.push((self.id, sql.to_string()));
            (state.query_delay, state.reject_queries)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.state.lock().busy.remove(&self.id);

        if reject {
            return Err(MockError::QueryRejected {
                id: self.id,
                sql: sql.to_string(),
            });
        }
        Ok(format!("{}: {sql}", self.id))
    }
}
