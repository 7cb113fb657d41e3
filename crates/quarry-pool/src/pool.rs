//! Connection pool implementation.
//!
//! A [`Pool`] owns a fixed set of connections established up front by
//! [`Pool::fill`]. Callers check connections out with [`Pool::acquire`] and
//! hand them back with [`Pool::release`] or by dropping the
//! [`PooledConnection`]. When every connection is busy, acquirers queue and
//! are served strictly in arrival order. [`Pool::drain`] stops admission,
//! waits for outstanding connections and closes everything.

use std::collections::VecDeque;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use futures_util::future::join_all;
use parking_lot::Mutex;
use tokio::sync::{Notify, oneshot};

use crate::config::PoolConfig;
use crate::connection::{ConnectionId, ConnectionMetadata, ConnectionState};
use crate::error::{PoolError, Result};
use crate::lifecycle::ConnectionLifecycle;

static NEXT_POOL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique pool identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolId(u64);

impl PoolId {
    fn next() -> Self {
        Self(NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pool-{}", self.0)
    }
}

/// Lifecycle state of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Created, no connections yet.
    Empty,
    /// Connections are being established.
    Filling,
    /// Accepting acquisitions.
    Ready,
    /// Refusing acquisitions, waiting for checked-out connections.
    Draining,
    /// All connections closed. Terminal.
    Closed,
}

/// A bounded pool of database connections.
///
/// The pool is a cheap handle; clones share the same connections.
///
/// # Example
///
/// ```rust,ignore
/// use quarry_pool::{Pool, PoolConfig};
///
/// let pool = Pool::new(Arc::new(lifecycle), PoolConfig::new().connection_limit(4))?;
/// pool.fill().await?;
///
/// let conn = pool.acquire(Some(Duration::from_secs(5))).await?;
/// // Use connection...
/// pool.release(conn)?;
///
/// pool.drain().await;
/// ```
pub struct Pool<L: ConnectionLifecycle> {
    inner: Arc<PoolInner<L>>,
}

struct PoolInner<L: ConnectionLifecycle> {
    id: PoolId,
    lifecycle: Arc<L>,
    config: PoolConfig,
    capacity: usize,

    /// Slot table, idle queue and wait queue. The only lock in the pool.
    shared: Mutex<Shared<L::Transport>>,

    /// Signalled whenever a connection goes back to idle.
    released: Notify,

    /// Serializes `fill` and `drain`.
    transition: tokio::sync::Mutex<()>,

    created_at: Instant,
}

struct Shared<T> {
    state: PoolState,
    slots: Vec<Slot<T>>,
    idle: VecDeque<usize>,
    waiters: VecDeque<Waiter<T>>,
    next_waiter_id: u64,
    in_use: usize,
    metrics: PoolMetricsInner,
}

struct Slot<T> {
    metadata: ConnectionMetadata,
    /// `None` while the connection is checked out.
    transport: Option<T>,
}

struct Checkout<T> {
    index: usize,
    id: ConnectionId,
    transport: T,
}

struct Waiter<T> {
    id: u64,
    tx: oneshot::Sender<Checkout<T>>,
}

/// Internal metrics tracking.
#[derive(Debug, Default)]
struct PoolMetricsInner {
    connections_created: u64,
    connections_closed: u64,
    close_failures: u64,
    checkouts_successful: u64,
    checkouts_failed: u64,
    timeouts: u64,
}

impl<T> Shared<T> {
    fn new(capacity: usize) -> Self {
        Self {
            state: PoolState::Empty,
            slots: Vec::with_capacity(capacity),
            idle: VecDeque::with_capacity(capacity),
            waiters: VecDeque::new(),
            next_waiter_id: 0,
            in_use: 0,
            metrics: PoolMetricsInner::default(),
        }
    }

    fn admit(&self) -> Result<()> {
        match self.state {
            PoolState::Ready => Ok(()),
            _ => Err(PoolError::PoolClosed),
        }
    }

    fn checkout_idle(&mut self) -> Option<Checkout<T>> {
        let index = self.idle.pop_front()?;
        let slot = self.slots.get_mut(index)?;
        let transport = slot.transport.take()?;
        slot.metadata.mark_checked_out();
        self.in_use += 1;
        Some(Checkout {
            index,
            id: slot.metadata.id,
            transport,
        })
    }

    fn remove_waiter(&mut self, waiter_id: u64) -> bool {
        match self.waiters.iter().position(|w| w.id == waiter_id) {
            Some(pos) => {
                self.waiters.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Hand a returned connection to the oldest waiter, or park it as idle.
    ///
    /// Returns `true` when the connection went back to idle.
    fn checkin(&mut self, mut checkout: Checkout<T>) -> bool {
        if self.state == PoolState::Ready {
            while let Some(waiter) = self.waiters.pop_front() {
                let index = checkout.index;
                match waiter.tx.send(checkout) {
                    Ok(()) => {
                        if let Some(slot) = self.slots.get_mut(index) {
                            slot.metadata.mark_checked_out();
                        }
                        tracing::trace!(waiter = waiter.id, "handed connection to queued acquirer");
                        return false;
                    }
                    Err(returned) => checkout = returned,
                }
            }
        }

        if let Some(slot) = self.slots.get_mut(checkout.index) {
            slot.metadata.state = ConnectionState::Idle;
            slot.transport = Some(checkout.transport);
            self.idle.push_back(checkout.index);
        }
        self.in_use = self.in_use.saturating_sub(1);
        true
    }
}

impl<L: ConnectionLifecycle> PoolInner<L> {
    fn checkin(&self, index: usize, id: ConnectionId, transport: L::Transport) -> Result<()> {
        let mut shared = self.shared.lock();

        let state = shared
            .slots
            .get(index)
            .filter(|slot| slot.metadata.id == id)
            .map(|slot| slot.metadata.state)
            .ok_or_else(|| {
                PoolError::InvariantViolation(format!("{id} is not owned by {}", self.id))
            })?;
        if state != ConnectionState::InUse {
            return Err(PoolError::InvariantViolation(format!(
                "{id} released while {state:?}; connections must be released exactly once"
            )));
        }

        let freed = shared.checkin(Checkout {
            index,
            id,
            transport,
        });
        drop(shared);

        if freed {
            self.released.notify_waiters();
        }
        Ok(())
    }

    async fn establish(&self, id: ConnectionId) -> Result<L::Transport> {
        let attempt = self.lifecycle.connect(id);
        let outcome = match self.config.connect_timeout {
            Some(limit) => match tokio::time::timeout(limit, attempt).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(PoolError::connection(format!(
                        "{id} not established within {limit:?}"
                    )));
                }
            },
            None => attempt.await,
        };
        outcome.map_err(PoolError::connection)
    }
}

impl<L: ConnectionLifecycle> Pool<L> {
    /// Create an empty pool. Call [`fill`](Self::fill) before acquiring.
    ///
    /// The capacity is computed from the configuration here and never
    /// changes afterwards.
    pub fn new(lifecycle: Arc<L>, config: PoolConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.capacity()?;

        let inner = Arc::new(PoolInner {
            id: PoolId::next(),
            lifecycle,
            config,
            capacity,
            shared: Mutex::new(Shared::new(capacity)),
            released: Notify::new(),
            transition: tokio::sync::Mutex::new(()),
            created_at: Instant::now(),
        });

        tracing::info!(pool_id = %inner.id, capacity, "connection pool created");

        Ok(Self { inner })
    }

    /// Create a pool and fill it.
    pub async fn connect(lifecycle: Arc<L>, config: PoolConfig) -> Result<Self> {
        let pool = Self::new(lifecycle, config)?;
        pool.fill().await?;
        Ok(pool)
    }

    /// Establish every connection and start accepting acquisitions.
    ///
    /// Connections are opened concurrently. If any attempt fails, the ones
    /// that succeeded are closed again, the pool becomes
    /// [`Closed`](PoolState::Closed) and the first failure is returned.
    pub async fn fill(&self) -> Result<()> {
        let _transition = self.inner.transition.lock().await;
        {
            let mut shared = self.inner.shared.lock();
            if shared.state != PoolState::Empty {
                return Err(PoolError::InvariantViolation(format!(
                    "cannot fill {} while {:?}",
                    self.inner.id, shared.state
                )));
            }
            shared.state = PoolState::Filling;
        }

        tracing::debug!(
            pool_id = %self.inner.id,
            capacity = self.inner.capacity,
            "establishing connections"
        );

        let inner = &self.inner;
        let attempts = (0..inner.capacity).map(|_| {
            let id = ConnectionId::next();
            async move { (id, inner.establish(id).await) }
        });

        let mut established = Vec::with_capacity(inner.capacity);
        let mut failure = None;
        for (id, outcome) in join_all(attempts).await {
            match outcome {
                Ok(transport) => established.push((id, transport)),
                Err(err) => {
                    tracing::warn!(pool_id = %inner.id, connection_id = %id, error = %err, "connection attempt failed");
                    if failure.is_none() {
                        failure = Some(err);
                    }
                }
            }
        }

        if let Some(err) = failure {
            let opened = established.len() as u64;
            for (id, transport) in established {
                if let Err(close_err) = inner.lifecycle.close(id, transport).await {
                    tracing::warn!(connection_id = %id, error = %close_err, "failed to close connection after aborted fill");
                }
            }
            let mut shared = inner.shared.lock();
            shared.metrics.connections_created += opened;
            shared.metrics.connections_closed += opened;
            shared.state = PoolState::Closed;
            return Err(err);
        }

        let mut shared = inner.shared.lock();
        shared.metrics.connections_created += established.len() as u64;
        for (index, (id, transport)) in established.into_iter().enumerate() {
            shared.slots.push(Slot {
                metadata: ConnectionMetadata::new(id),
                transport: Some(transport),
            });
            shared.idle.push_back(index);
        }
        shared.state = PoolState::Ready;
        drop(shared);

        tracing::info!(pool_id = %inner.id, capacity = inner.capacity, "connection pool ready");
        Ok(())
    }

    /// Get a connection using the configured default acquire timeout.
    pub async fn get(&self) -> Result<PooledConnection<L>> {
        self.acquire(self.inner.config.acquire_timeout).await
    }

    /// Check out a connection, waiting until one is idle.
    ///
    /// Waiters are served first-come-first-served; a caller never overtakes
    /// one that started waiting earlier. A zero timeout fails immediately on
    /// an exhausted pool without joining the queue.
    ///
    /// # Errors
    ///
    /// - [`PoolError::PoolClosed`] if the pool is not ready, or starts
    ///   draining while the caller waits.
    /// - [`PoolError::Timeout`] if `timeout` elapses first.
    pub async fn acquire(&self, timeout: Option<Duration>) -> Result<PooledConnection<L>> {
        let mut pending = {
            let mut shared = self.inner.shared.lock();
            if let Err(err) = shared.admit() {
                shared.metrics.checkouts_failed += 1;
                return Err(err);
            }

            if shared.waiters.is_empty() {
                if let Some(checkout) = shared.checkout_idle() {
                    shared.metrics.checkouts_successful += 1;
                    drop(shared);
                    tracing::debug!(pool_id = %self.inner.id, connection_id = %checkout.id, "acquired idle connection");
                    return Ok(self.lease(checkout));
                }
            }

            if timeout.is_some_and(|t| t.is_zero()) {
                shared.metrics.checkouts_failed += 1;
                shared.metrics.timeouts += 1;
                return Err(PoolError::Timeout(Duration::ZERO));
            }

            let (tx, rx) = oneshot::channel();
            let waiter_id = shared.next_waiter_id;
            shared.next_waiter_id += 1;
            shared.waiters.push_back(Waiter { id: waiter_id, tx });
            tracing::debug!(
                pool_id = %self.inner.id,
                waiter = waiter_id,
                queued = shared.waiters.len(),
                "pool exhausted, waiting for a connection"
            );

            PendingAcquire {
                pool: Arc::clone(&self.inner),
                waiter_id,
                rx,
                settled: false,
            }
        };

        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, &mut pending.rx).await {
                Ok(received) => received,
                Err(_) => return pending.expire(limit).map(|checkout| self.lease(checkout)),
            },
            None => (&mut pending.rx).await,
        };
        pending.settled = true;

        let mut shared = self.inner.shared.lock();
        match received {
            Ok(checkout) => {
                shared.metrics.checkouts_successful += 1;
                drop(shared);
                tracing::debug!(pool_id = %self.inner.id, connection_id = %checkout.id, "acquired released connection");
                Ok(self.lease(checkout))
            }
            Err(_) => {
                shared.metrics.checkouts_failed += 1;
                Err(PoolError::PoolClosed)
            }
        }
    }

    /// Try to get a connection without waiting.
    ///
    /// Returns `None` if no connection is immediately available or other
    /// callers are already queued.
    pub fn try_acquire(&self) -> Result<Option<PooledConnection<L>>> {
        let mut shared = self.inner.shared.lock();
        shared.admit()?;
        if !shared.waiters.is_empty() {
            return Ok(None);
        }
        let checkout = shared.checkout_idle();
        if checkout.is_some() {
            shared.metrics.checkouts_successful += 1;
        }
        drop(shared);
        Ok(checkout.map(|checkout| self.lease(checkout)))
    }

    /// Return a connection to the pool.
    ///
    /// The connection is handed straight to the oldest waiter if there is
    /// one. Never blocks.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvariantViolation`] if the connection belongs to another
    /// pool or is not checked out. A foreign connection is still returned
    /// to the pool it came from.
    pub fn release(&self, mut conn: PooledConnection<L>) -> Result<()> {
        if !Arc::ptr_eq(&conn.pool, &self.inner) {
            let err = PoolError::InvariantViolation(format!(
                "{} belongs to {}, not {}",
                conn.id, conn.pool.id, self.inner.id
            ));
            tracing::debug!(error = %err, "connection released to the wrong pool");
            return Err(err);
        }

        let transport = conn.transport.take().ok_or_else(|| {
            PoolError::InvariantViolation(format!("{} already released", conn.id))
        })?;

        tracing::debug!(pool_id = %self.inner.id, connection_id = %conn.id, "releasing connection");
        self.inner.checkin(conn.index, conn.id, transport)
    }

    /// Stop admitting acquisitions, wait for checked-out connections and
    /// close every connection.
    ///
    /// Queued acquirers fail with [`PoolError::PoolClosed`]. Holders finish
    /// their work and release normally. Draining a closed pool is a no-op,
    /// and concurrent calls wait for the first to finish.
    pub async fn drain(&self) {
        let _transition = self.inner.transition.lock().await;
        let abandoned = {
            let mut shared = self.inner.shared.lock();
            match shared.state {
                PoolState::Closed => return,
                PoolState::Empty => {
                    shared.state = PoolState::Closed;
                    return;
                }
                _ => {}
            }
            shared.state = PoolState::Draining;
            tracing::info!(
                pool_id = %self.inner.id,
                in_use = shared.in_use,
                waiting = shared.waiters.len(),
                "draining connection pool"
            );
            let waiting = shared.waiters.len() as u64;
            shared.metrics.checkouts_failed += waiting;
            std::mem::take(&mut shared.waiters)
        };
        // Dropping the senders wakes every queued acquirer with `PoolClosed`.
        drop(abandoned);

        loop {
            let released = self.inner.released.notified();
            tokio::pin!(released);
            released.as_mut().enable();

            let in_use = self.inner.shared.lock().in_use;
            if in_use == 0 {
                break;
            }
            tracing::debug!(pool_id = %self.inner.id, in_use, "waiting for checked-out connections");
            released.await;
        }

        let open: Vec<(ConnectionId, L::Transport)> = {
            let mut shared = self.inner.shared.lock();
            shared.idle.clear();
            shared
                .slots
                .iter_mut()
                .filter_map(|slot| {
                    slot.metadata.state = ConnectionState::Closed;
                    let id = slot.metadata.id;
                    slot.transport.take().map(|transport| (id, transport))
                })
                .collect()
        };

        let closed = open.len() as u64;
        let mut failures = 0;
        for (id, transport) in open {
            if let Err(err) = self.inner.lifecycle.close(id, transport).await {
                tracing::warn!(pool_id = %self.inner.id, connection_id = %id, error = %err, "failed to close connection cleanly");
                failures += 1;
            }
        }

        {
            let mut shared = self.inner.shared.lock();
            shared.metrics.connections_closed += closed;
            shared.metrics.close_failures += failures;
            shared.state = PoolState::Closed;
        }

        tracing::info!(pool_id = %self.inner.id, closed, "connection pool closed");
    }

    /// Get the current pool status.
    #[must_use]
    pub fn status(&self) -> PoolStatus {
        let shared = self.inner.shared.lock();
        PoolStatus {
            state: shared.state,
            available: shared.idle.len(),
            in_use: shared.in_use,
            total: shared
                .slots
                .iter()
                .filter(|slot| slot.metadata.state != ConnectionState::Closed)
                .count(),
            capacity: self.inner.capacity,
            waiting: shared.waiters.len(),
        }
    }

    /// Snapshot of every connection the pool has held.
    #[must_use]
    pub fn connections(&self) -> Vec<ConnectionMetadata> {
        let shared = self.inner.shared.lock();
        shared.slots.iter().map(|slot| slot.metadata.clone()).collect()
    }

    /// Get pool metrics.
    #[must_use]
    pub fn metrics(&self) -> PoolMetrics {
        let shared = self.inner.shared.lock();
        let inner = &shared.metrics;
        PoolMetrics {
            connections_created: inner.connections_created,
            connections_closed: inner.connections_closed,
            close_failures: inner.close_failures,
            checkouts_successful: inner.checkouts_successful,
            checkouts_failed: inner.checkouts_failed,
            timeouts: inner.timeouts,
            uptime: self.inner.created_at.elapsed(),
        }
    }

    /// The pool's identifier.
    #[must_use]
    pub fn id(&self) -> PoolId {
        self.inner.id
    }

    /// Number of connections the pool holds once filled.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> PoolState {
        self.inner.shared.lock().state
    }

    /// Check if the pool is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state() == PoolState::Closed
    }

    /// Get the pool configuration.
    #[must_use]
    pub fn config(&self) -> &PoolConfig {
        &self.inner.config
    }

    fn lease(&self, checkout: Checkout<L::Transport>) -> PooledConnection<L> {
        PooledConnection {
            pool: Arc::clone(&self.inner),
            index: checkout.index,
            id: checkout.id,
            transport: Some(checkout.transport),
        }
    }
}

impl<L: ConnectionLifecycle> Clone for Pool<L> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<L: ConnectionLifecycle> fmt::Debug for Pool<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool")
            .field("id", &self.inner.id)
            .field("capacity", &self.inner.capacity)
            .field("state", &self.state())
            .finish()
    }
}

/// A queued acquisition.
///
/// Dropping it before it settles removes the wait-queue entry, and returns
/// a connection that was handed over in the meantime.
struct PendingAcquire<L: ConnectionLifecycle> {
    pool: Arc<PoolInner<L>>,
    waiter_id: u64,
    rx: oneshot::Receiver<Checkout<L::Transport>>,
    settled: bool,
}

impl<L: ConnectionLifecycle> PendingAcquire<L> {
    fn expire(&mut self, limit: Duration) -> Result<Checkout<L::Transport>> {
        self.settled = true;
        let mut shared = self.pool.shared.lock();
        if shared.remove_waiter(self.waiter_id) {
            shared.metrics.checkouts_failed += 1;
            shared.metrics.timeouts += 1;
            tracing::debug!(pool_id = %self.pool.id, waiter = self.waiter_id, "acquire timed out");
            return Err(PoolError::Timeout(limit));
        }

        // A release raced the deadline and already handed us a connection.
        match self.rx.try_recv() {
            Ok(checkout) => {
                shared.metrics.checkouts_successful += 1;
                Ok(checkout)
            }
            Err(_) => {
                shared.metrics.checkouts_failed += 1;
                Err(PoolError::PoolClosed)
            }
        }
    }
}

impl<L: ConnectionLifecycle> Drop for PendingAcquire<L> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut shared = self.pool.shared.lock();
        if shared.remove_waiter(self.waiter_id) {
            tracing::trace!(waiter = self.waiter_id, "cancelled acquire left the wait queue");
            return;
        }

        if let Ok(checkout) = self.rx.try_recv() {
            tracing::trace!(connection_id = %checkout.id, "cancelled acquire returning handed-off connection");
            let freed = shared.checkin(checkout);
            drop(shared);
            if freed {
                self.pool.released.notify_waiters();
            }
        }
    }
}

/// Builder for creating a connection pool.
///
/// # Example
///
/// ```rust,ignore
/// let pool = PoolBuilder::new()
///     .connection_limit(8)
///     .acquire_timeout(Some(Duration::from_secs(2)))
///     .connect(Arc::new(lifecycle))
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct PoolBuilder {
    pool_config: PoolConfig,
}

impl PoolBuilder {
    /// Create a new pool builder with default settings.
    pub fn new() -> Self {
        Self {
            pool_config: PoolConfig::default(),
        }
    }

    /// Set the pool configuration.
    #[must_use]
    pub fn pool_config(mut self, config: PoolConfig) -> Self {
        self.pool_config = config;
        self
    }

    /// Set an explicit connection limit.
    #[must_use]
    pub fn connection_limit(mut self, limit: i64) -> Self {
        self.pool_config.connection_limit = Some(limit);
        self
    }

    /// Override the CPU count used to derive the capacity.
    #[must_use]
    pub fn physical_cpus(mut self, count: usize) -> Self {
        self.pool_config.physical_cpus = count;
        self
    }

    /// Set the default acquire timeout.
    #[must_use]
    pub fn acquire_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool_config.acquire_timeout = timeout;
        self
    }

    /// Set the per-connection establishment timeout.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.pool_config.connect_timeout = timeout;
        self
    }

    /// Build an empty pool.
    pub fn build<L: ConnectionLifecycle>(self, lifecycle: Arc<L>) -> Result<Pool<L>> {
        Pool::new(lifecycle, self.pool_config)
    }

    /// Build the pool and fill it.
    pub async fn connect<L: ConnectionLifecycle>(self, lifecycle: Arc<L>) -> Result<Pool<L>> {
        Pool::connect(lifecycle, self.pool_config).await
    }
}

impl Default for PoolBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Status information about the pool.
#[derive(Debug, Clone, Copy)]
pub struct PoolStatus {
    /// Lifecycle state.
    pub state: PoolState,
    /// Number of idle connections available.
    pub available: usize,
    /// Number of connections currently in use.
    pub in_use: usize,
    /// Number of open connections.
    pub total: usize,
    /// Configured capacity.
    pub capacity: usize,
    /// Number of queued acquirers.
    pub waiting: usize,
}

impl PoolStatus {
    /// Calculate the utilization percentage.
    #[must_use]
    pub fn utilization(&self) -> f64 {
        if self.capacity == 0 {
            return 0.0;
        }
        (self.in_use as f64 / self.capacity as f64) * 100.0
    }

    /// Check if the pool is at capacity.
    #[must_use]
    pub fn is_at_capacity(&self) -> bool {
        self.total >= self.capacity
    }

    /// Check if every connection is checked out.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.available == 0
    }
}

/// Metrics collected from the pool.
#[derive(Debug, Clone)]
pub struct PoolMetrics {
    /// Total connections created since pool start.
    pub connections_created: u64,
    /// Total connections closed since pool start.
    pub connections_closed: u64,
    /// Closes that reported an error.
    pub close_failures: u64,
    /// Successful connection checkouts.
    pub checkouts_successful: u64,
    /// Failed connection checkouts (timeouts, pool closed).
    pub checkouts_failed: u64,
    /// Checkouts that failed because the deadline elapsed.
    pub timeouts: u64,
    /// Time since pool creation.
    pub uptime: Duration,
}

impl PoolMetrics {
    /// Calculate checkout success rate (0.0 to 1.0).
    #[must_use]
    pub fn checkout_success_rate(&self) -> f64 {
        let total = self.checkouts_successful + self.checkouts_failed;
        if total == 0 {
            return 1.0;
        }
        self.checkouts_successful as f64 / total as f64
    }
}

/// A connection checked out of the pool.
///
/// Dereferences to the underlying transport. When dropped, the connection is
/// automatically returned to the pool; [`Pool::release`] does the same but
/// reports misuse.
pub struct PooledConnection<L: ConnectionLifecycle> {
    pool: Arc<PoolInner<L>>,
    index: usize,
    id: ConnectionId,
    transport: Option<L::Transport>,
}

impl<L: ConnectionLifecycle> PooledConnection<L> {
    /// The connection identifier.
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// The pool this connection belongs to.
    #[must_use]
    pub fn pool_id(&self) -> PoolId {
        self.pool.id
    }

    /// Return the connection to the pool it came from.
    pub fn release(self) -> Result<()> {
        let pool = Pool {
            inner: Arc::clone(&self.pool),
        };
        pool.release(self)
    }
}

impl<L: ConnectionLifecycle> Deref for PooledConnection<L> {
    type Target = L::Transport;

    fn deref(&self) -> &Self::Target {
        match self.transport {
            Some(ref transport) => transport,
            None => unreachable!("transport is present until the connection is released"),
        }
    }
}

impl<L: ConnectionLifecycle> DerefMut for PooledConnection<L> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.transport {
            Some(ref mut transport) => transport,
            None => unreachable!("transport is present until the connection is released"),
        }
    }
}

impl<L: ConnectionLifecycle> fmt::Debug for PooledConnection<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledConnection")
            .field("id", &self.id)
            .field("pool_id", &self.pool.id)
            .finish()
    }
}

impl<L: ConnectionLifecycle> Drop for PooledConnection<L> {
    fn drop(&mut self) {
        if let Some(transport) = self.transport.take() {
            tracing::trace!(connection_id = %self.id, "returning dropped connection to pool");
            if let Err(err) = self.pool.checkin(self.index, self.id, transport) {
                tracing::error!(connection_id = %self.id, error = %err, "failed to return connection to pool");
            }
        }
    }
}
