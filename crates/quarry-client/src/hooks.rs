//! Exit hooks run by [`Client::disconnect`](crate::Client::disconnect).
//!
//! Hooks run one at a time, in registration order, before the pool starts
//! draining. The pool is still usable while they run, so a hook may issue
//! final requests through the client it captured.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use quarry_pool::BoxError;
use thiserror::Error;

type Hook = Arc<dyn Fn() -> BoxFuture<'static, Result<(), BoxError>> + Send + Sync>;

/// Handle identifying a registered hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookHandle(u64);

impl fmt::Display for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hook-{}", self.0)
    }
}

/// A failed exit hook.
#[derive(Debug, Error)]
#[error("exit hook {handle} (position {position}) failed: {source}")]
pub struct HookError {
    /// The failing hook.
    pub handle: HookHandle,
    /// Zero-based position in the invocation order.
    pub position: usize,
    /// What the hook returned.
    #[source]
    pub source: BoxError,
}

/// Ordered registry of exit hooks owned by one client.
#[derive(Default)]
pub struct ExitHookRegistry {
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    hooks: Vec<(HookHandle, Hook)>,
    next_handle: u64,
}

impl ExitHookRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook. It runs after every hook registered before it.
    pub fn register<F, Fut>(&self, hook: F) -> HookHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BoxError>> + Send + 'static,
    {
        let mut inner = self.inner.lock();
        let handle = HookHandle(inner.next_handle);
        inner.next_handle += 1;
        let boxed: Hook = Arc::new(move || hook().boxed());
        inner.hooks.push((handle, boxed));
        tracing::debug!(hook = %handle, "registered exit hook");
        handle
    }

    /// Remove a hook. Returns `false` if it was not registered.
    pub fn unregister(&self, handle: HookHandle) -> bool {
        let mut inner = self.inner.lock();
        let before = inner.hooks.len();
        inner.hooks.retain(|(h, _)| *h != handle);
        inner.hooks.len() != before
    }

    /// Number of registered hooks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().hooks.len()
    }

    /// Whether no hooks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().hooks.is_empty()
    }

    /// Run every hook sequentially and collect the failures.
    ///
    /// The set of hooks is snapshotted first; hooks registered while this
    /// runs are picked up by the next disconnect.
    pub(crate) async fn run(&self) -> Vec<HookError> {
        let hooks: Vec<(HookHandle, Hook)> = self.inner.lock().hooks.clone();
        let mut failures = Vec::new();

        for (position, (handle, hook)) in hooks.into_iter().enumerate() {
            tracing::debug!(hook = %handle, position, "running exit hook");
            if let Err(source) = hook().await {
                tracing::warn!(hook = %handle, position, error = %source, "exit hook failed");
                failures.push(HookError {
                    handle,
                    position,
                    source,
                });
            }
        }

        failures
    }
}

impl fmt::Debug for ExitHookRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitHookRegistry")
            .field("hooks", &self.len())
            .finish()
    }
}
