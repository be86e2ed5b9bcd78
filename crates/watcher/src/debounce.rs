//! Quiet-period debouncing of classified changes
//!
//! All changes enqueued while a batch is pending land in that one batch.
//! Every enqueue pushes the deadline back, so a batch is dispatched only
//! after a continuous idle gap of the configured delay. One timer task per
//! debouncer; enqueue itself never waits on it.

use layoutd_core::{ChangeBatch, WatchConfig};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

/// Configuration for the debouncer
#[derive(Debug, Clone)]
pub struct DebounceConfig {
    /// Quiet period measured from the last enqueue
    pub delay: Duration,
    /// When false (headless/test mode) expired batches are dropped
    pub dispatch_enabled: bool,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(300),
            dispatch_enabled: true,
        }
    }
}

impl From<&WatchConfig> for DebounceConfig {
    fn from(config: &WatchConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.debounce_ms),
            dispatch_enabled: config.dispatch,
        }
    }
}

/// Debounce aggregator backed by a single tokio timer task
pub struct Debouncer {
    shared: Arc<Shared>,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    config: DebounceConfig,
    state: Mutex<State>,
    wake: Notify,
    tx: mpsc::UnboundedSender<ChangeBatch>,
    dispatched: AtomicU64,
}

#[derive(Default)]
struct State {
    pending: ChangeBatch,
    deadline: Option<Instant>,
    disposed: bool,
}

impl Debouncer {
    /// Start a debouncer dispatching expired batches into `tx`
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: DebounceConfig, tx: mpsc::UnboundedSender<ChangeBatch>) -> Self {
        let shared = Arc::new(Shared {
            config,
            state: Mutex::new(State::default()),
            wake: Notify::new(),
            tx,
            dispatched: AtomicU64::new(0),
        });
        let task = tokio::spawn(run_timer(shared.clone()));

        Self {
            shared,
            task: Mutex::new(Some(task)),
        }
    }

    /// Merge changes into the pending batch and restart the quiet period
    ///
    /// No-op after [`dispose`](Self::dispose) or when both sets are empty.
    pub fn enqueue(&self, changed: HashSet<PathBuf>, deleted: HashSet<PathBuf>) {
        if changed.is_empty() && deleted.is_empty() {
            return;
        }

        {
            let mut state = self.shared.state.lock();
            if state.disposed {
                trace!("Debouncer disposed, dropping {} paths", changed.len() + deleted.len());
                return;
            }
            state.pending.merge(changed, deleted);
            state.deadline = Some(Instant::now() + self.shared.config.delay);
            trace!("Pending batch now holds {} paths", state.pending.len());
        }

        self.shared.wake.notify_one();
    }

    /// Dispatch the pending batch immediately
    pub fn flush(&self) {
        let batch = {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return;
            }
            state.deadline = None;
            std::mem::take(&mut state.pending)
        };
        self.shared.wake.notify_one();
        self.shared.dispatch(batch);
    }

    /// Stop the timer and discard any pending batch
    pub fn dispose(&self) {
        let discarded = {
            let mut state = self.shared.state.lock();
            if state.disposed {
                return;
            }
            state.disposed = true;
            state.deadline = None;
            std::mem::take(&mut state.pending)
        };
        if !discarded.is_empty() {
            debug!("Debouncer disposed with {} pending paths, discarding", discarded.len());
        }

        self.shared.wake.notify_one();
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    /// Number of paths waiting for the quiet period to elapse
    pub fn pending_count(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    /// Check if the debouncer has been disposed
    pub fn is_disposed(&self) -> bool {
        self.shared.state.lock().disposed
    }

    /// Number of batches handed to the receiver so far
    pub fn dispatched(&self) -> u64 {
        self.shared.dispatched.load(Ordering::Acquire)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl Shared {
    /// Take the pending batch if its deadline has passed
    fn take_if_due(&self) -> Option<ChangeBatch> {
        let mut state = self.state.lock();
        match state.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                state.deadline = None;
                Some(std::mem::take(&mut state.pending))
            }
            _ => None,
        }
    }

    fn dispatch(&self, batch: ChangeBatch) {
        if batch.is_empty() {
            return;
        }
        if !self.config.dispatch_enabled {
            debug!("Dispatch suppressed, dropping batch of {} paths", batch.len());
            return;
        }

        debug!(
            changed = batch.changed().len(),
            deleted = batch.deleted().len(),
            "Quiet period elapsed, dispatching batch"
        );
        // Counted before sending so the receiver never sees more batches than this
        self.dispatched.fetch_add(1, Ordering::AcqRel);
        if self.tx.send(batch).is_err() {
            self.dispatched.fetch_sub(1, Ordering::AcqRel);
            debug!("Batch receiver closed, dropping batch");
        }
    }
}

/// Timer loop: sleep until the current deadline, re-arming on every wake
async fn run_timer(shared: Arc<Shared>) {
    loop {
        let deadline = {
            let state = shared.state.lock();
            if state.disposed {
                break;
            }
            state.deadline
        };

        match deadline {
            None => shared.wake.notified().await,
            Some(deadline) => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => {
                        if let Some(batch) = shared.take_if_due() {
                            shared.dispatch(batch);
                        }
                    }
                    _ = shared.wake.notified() => {}
                }
            }
        }
    }
    trace!("Debounce timer stopped");
}
