//! Process shutdown coordination.
//!
//! A connected client keeps a *hold* on the process: it tells the host that
//! there is still a pool to tear down. Disconnecting releases the hold. The
//! client never terminates the process itself; the host decides when to exit,
//! typically once [`ShutdownCoordinator::wait_idle`] resolves.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tokio::sync::Notify;

/// Identifies one hold on the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HoldId(u64);

impl fmt::Display for HoldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hold-{}", self.0)
    }
}

/// Capability a client uses to keep the host process alive while connected.
pub trait ProcessShutdownCoordinator: Send + Sync {
    /// Register a hold. The process should not exit while it is held.
    fn register_hold(&self) -> HoldId;

    /// Release a previously registered hold. Releasing twice is a no-op.
    fn release_hold(&self, hold: HoldId);
}

/// Counts outstanding holds and wakes waiters when none remain.
#[derive(Default)]
pub struct ShutdownCoordinator {
    holds: Mutex<HashSet<HoldId>>,
    next_hold: AtomicU64,
    idle: Notify,
}

static GLOBAL: Lazy<Arc<ShutdownCoordinator>> = Lazy::new(|| Arc::new(ShutdownCoordinator::new()));

impl ShutdownCoordinator {
    /// Create a coordinator with no holds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide coordinator used by clients that are not given one.
    #[must_use]
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Number of outstanding holds.
    #[must_use]
    pub fn active_holds(&self) -> usize {
        self.holds.lock().len()
    }

    /// Wait until no holds remain.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();

            let released = self.holds.lock().is_empty();
            if released {
                return;
            }
            idle.await;
        }
    }
}

impl ProcessShutdownCoordinator for ShutdownCoordinator {
    fn register_hold(&self) -> HoldId {
        let hold = HoldId(self.next_hold.fetch_add(1, Ordering::Relaxed));
        let active = {
            let mut holds = self.holds.lock();
            holds.insert(hold);
            holds.len()
        };
        tracing::trace!(hold = %hold, active, "registered process hold");
        hold
    }

    fn release_hold(&self, hold: HoldId) {
        let remaining = {
            let mut holds = self.holds.lock();
            if !holds.remove(&hold) {
                return;
            }
            holds.len()
        };
        tracing::trace!(hold = %hold, remaining, "released process hold");
        if remaining == 0 {
            self.idle.notify_waiters();
        }
    }
}

impl fmt::Debug for ShutdownCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownCoordinator")
            .field("active_holds", &self.active_holds())
            .finish()
    }
}

/// Resolves when the process receives a termination signal.
///
/// Listens for SIGINT and SIGTERM on Unix and Ctrl-C elsewhere.
pub async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::select! {
            _ = sigint.recv() => tracing::info!(signal = "SIGINT", "shutdown signal"),
            _ = sigterm.recv() => tracing::info!(signal = "SIGTERM", "shutdown signal"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        tracing::info!("shutdown signal");
    }

    Ok(())
}
