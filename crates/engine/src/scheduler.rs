//! Per-unit invalidation scheduling
//!
//! Each unit has at most one active request. A request runs on the blocking
//! pool and compiles the unit's pending delta; deltas arriving while it runs
//! are folded into a single queued follow-up. Different units compile
//! concurrently and in no particular order.

use layoutd_core::{ChangeBatch, ProjectContext, RefreshSink, UnitId};
use parking_lot::Mutex;
use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tracing::{debug, info, trace, warn};

use crate::model::CompileOutcome;
use crate::registry::ModelRegistry;

/// Refresh state shared by every unit invalidated by one batch
type RefreshTracker = Arc<AtomicBool>;

/// Delta waiting to be compiled, with the batches it came from
struct Pending {
    batch: ChangeBatch,
    trackers: Vec<RefreshTracker>,
}

impl Pending {
    fn absorb(&mut self, other: Pending) {
        self.batch.absorb(other.batch);
        self.trackers.extend(other.trackers);
    }
}

#[derive(Default)]
struct ActiveRequest {
    /// Delta for the next compile; `None` once taken by the worker
    queued: Option<Pending>,
}

struct Inner {
    registry: Arc<ModelRegistry>,
    project: Arc<dyn ProjectContext>,
    refresh: Arc<dyn RefreshSink>,
    runtime: Handle,
    active: Mutex<HashMap<UnitId, ActiveRequest>>,
    idle: Notify,
}

/// Schedules incremental compiles per unit
#[derive(Clone)]
pub struct InvalidationScheduler {
    inner: Arc<Inner>,
}

impl InvalidationScheduler {
    /// Create a scheduler running compiles on `runtime`'s blocking pool
    pub fn new(
        registry: Arc<ModelRegistry>,
        project: Arc<dyn ProjectContext>,
        refresh: Arc<dyn RefreshSink>,
        runtime: Handle,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                registry,
                project,
                refresh,
                runtime,
                active: Mutex::new(HashMap::new()),
                idle: Notify::new(),
            }),
        }
    }

    /// Request regeneration of `units` for one batch of changes
    ///
    /// Never blocks on compilation. A unit with an active request gets the
    /// delta merged into its queued follow-up (deletion dominates); any other
    /// unit starts a new request.
    pub fn invalidate(
        &self,
        units: &HashSet<UnitId>,
        changed: &HashSet<PathBuf>,
        deleted: &HashSet<PathBuf>,
    ) {
        if units.is_empty() {
            return;
        }

        let tracker: RefreshTracker = Arc::new(AtomicBool::new(false));
        let mut started = Vec::new();

        {
            let mut active = self.inner.active.lock();
            for unit in units {
                let pending = Pending {
                    batch: ChangeBatch::from_sets(changed.clone(), deleted.clone()),
                    trackers: vec![tracker.clone()],
                };

                match active.get_mut(unit) {
                    Some(request) => {
                        trace!(unit = %unit, "Request active, merging delta");
                        match request.queued.as_mut() {
                            Some(queued) => queued.absorb(pending),
                            None => request.queued = Some(pending),
                        }
                    }
                    None => {
                        active.insert(
                            unit.clone(),
                            ActiveRequest {
                                queued: Some(pending),
                            },
                        );
                        started.push(unit.clone());
                    }
                }
            }
        }

        for unit in started {
            debug!(unit = %unit, "Starting generation request");
            let inner = self.inner.clone();
            self.inner
                .runtime
                .spawn_blocking(move || inner.run_unit(unit));
        }
    }

    /// Units with an active request, sorted
    pub fn active_units(&self) -> Vec<UnitId> {
        let mut units: Vec<_> = self.inner.active.lock().keys().cloned().collect();
        units.sort();
        units
    }

    /// Check if no request is active
    pub fn is_idle(&self) -> bool {
        self.inner.active.lock().is_empty()
    }

    /// Wait until no request is active
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl Inner {
    /// Worker loop for one unit: compile queued deltas until none remain
    fn run_unit(&self, unit: UnitId) {
        loop {
            let pending = {
                let mut active = self.active.lock();
                let Some(request) = active.get_mut(&unit) else {
                    break;
                };
                match request.queued.take() {
                    Some(pending) => pending,
                    None => {
                        active.remove(&unit);
                        if active.is_empty() {
                            self.idle.notify_waiters();
                        }
                        break;
                    }
                }
            };

            self.compile(&unit, pending);
        }
        trace!(unit = %unit, "Generation request finished");
    }

    fn compile(&self, unit: &UnitId, pending: Pending) {
        if self.project.is_disposed(unit) {
            debug!(unit = %unit, "Unit disposed, skipping generation");
            self.drop_queued(unit);
            return;
        }

        let Some(model) = self.registry.get(unit) else {
            debug!(unit = %unit, "No generator model registered, skipping");
            return;
        };

        // A panicking generator must not leave the unit marked active
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            model.compile(
                self.project.as_ref(),
                pending.batch.changed(),
                pending.batch.deleted(),
            )
        }));
        let result = match result {
            Ok(result) => result,
            Err(payload) => {
                warn!(unit = %unit, panic = %panic_message(payload.as_ref()), "Generator panicked");
                return;
            }
        };

        if self.project.is_disposed(unit) {
            debug!(unit = %unit, "Unit disposed during generation, discarding result");
            self.drop_queued(unit);
            return;
        }

        match result {
            Ok(CompileOutcome::Compiled) => {
                info!(unit = %unit, files = pending.batch.len(), "Generated sources updated");
                // At most one refresh per dispatched batch
                let fresh = pending
                    .trackers
                    .iter()
                    .map(|tracker| !tracker.swap(true, Ordering::AcqRel))
                    .fold(false, |any, first| any | first);
                if fresh {
                    self.refresh.request_async_refresh();
                }
            }
            Ok(CompileOutcome::Skipped) => {
                debug!(unit = %unit, "Generation skipped, output directory unresolvable");
            }
            Err(e) => {
                warn!(unit = %unit, error = %e, "Incremental generation failed");
            }
        }
    }

    fn drop_queued(&self, unit: &UnitId) {
        if let Some(request) = self.active.lock().get_mut(unit) {
            request.queued = None;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic"
    }
}
