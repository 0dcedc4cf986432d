//! Debounced persistence scheduling.
//!
//! One [`SaveScheduler`] lives inside each entity store. A burst of save
//! requests within the debounce window collapses into a single write, and
//! the write always serializes the state as of fire time, not schedule
//! time (the flush closure reads the store when it runs).

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Default debounce window between a mutation burst and its write.
pub const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(5000);

#[derive(Default)]
struct Pending {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

/// Trailing-debounce timer owning at most one pending flush.
///
/// Scheduling while a flush is pending cancels and replaces it, so of any
/// burst exactly the last schedule's timer fires. There is no queue and no
/// retry: a cancelled or failed flush is simply gone.
pub struct SaveScheduler {
    interval: Duration,
    pending: Arc<Mutex<Pending>>,
}

impl SaveScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Schedule `flush` to run after the debounce interval, superseding any
    /// pending flush.
    pub fn schedule<F>(&self, flush: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Anchor the window at schedule time, not at the task's first
        // poll, so the deadline is exact regardless of executor latency.
        let deadline = tokio::time::Instant::now() + self.interval;
        let pending = Arc::clone(&self.pending);
        let mut guard = lock(&self.pending);
        if let Some(handle) = guard.handle.take() {
            handle.abort();
        }
        guard.generation += 1;
        let generation = guard.generation;
        guard.handle = Some(tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            flush.await;
            // Release our slot unless a newer schedule already took it.
            let mut guard = lock(&pending);
            if guard.generation == generation {
                guard.handle = None;
            }
        }));
    }

    /// Cancel any pending flush and run `flush` right now.
    pub async fn flush_now<F>(&self, flush: F)
    where
        F: Future<Output = ()>,
    {
        self.cancel();
        flush.await;
    }

    /// Cancel any pending flush without running it.
    pub fn cancel(&self) {
        let mut guard = lock(&self.pending);
        if let Some(handle) = guard.handle.take() {
            handle.abort();
        }
        guard.generation += 1;
    }

    /// Whether a debounced flush is currently waiting to fire.
    pub fn has_pending(&self) -> bool {
        lock(&self.pending)
            .handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

fn lock(mutex: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
