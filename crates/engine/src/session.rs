//! Project session: the change pipeline for one project
//!
//! Raw events are classified and enqueued on the caller's thread. Expired
//! batches flow from the debouncer into a pipeline task that resolves the
//! affected units and hands them to the scheduler.

use layoutd_core::{ChangeBatch, ProjectContext, RefreshSink, TrackedFiles};
use layoutd_watcher::{classify, DebounceConfig, Debouncer, RawEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::registry::ModelRegistry;
use crate::resolver::resolve;
use crate::scheduler::InvalidationScheduler;

/// Progress of the pipeline task, for [`ProjectSession::wait_idle`]
#[derive(Default)]
struct Progress {
    handled: AtomicU64,
    notify: Notify,
}

/// Change pipeline attached to one project
pub struct ProjectSession {
    project: Arc<dyn ProjectContext>,
    tracked: Arc<dyn TrackedFiles>,
    debouncer: Debouncer,
    scheduler: InvalidationScheduler,
    progress: Arc<Progress>,
    pipeline: Mutex<Option<JoinHandle<()>>>,
    disposed: AtomicBool,
}

impl ProjectSession {
    /// Attach a pipeline to `project`
    ///
    /// Must be called from within a tokio runtime; the debounce timer and
    /// pipeline task run on it and compiles use its blocking pool.
    pub fn attach(
        project: Arc<dyn ProjectContext>,
        tracked: Arc<dyn TrackedFiles>,
        registry: Arc<ModelRegistry>,
        refresh: Arc<dyn RefreshSink>,
        config: DebounceConfig,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        info!(
            delay_ms = config.delay.as_millis() as u64,
            dispatch = config.dispatch_enabled,
            "Attaching project session"
        );

        let debouncer = Debouncer::spawn(config, tx);
        let scheduler =
            InvalidationScheduler::new(registry, project.clone(), refresh, Handle::current());
        let progress = Arc::new(Progress::default());
        let pipeline = tokio::spawn(run_pipeline(
            rx,
            project.clone(),
            scheduler.clone(),
            progress.clone(),
        ));

        Self {
            project,
            tracked,
            debouncer,
            scheduler,
            progress,
            pipeline: Mutex::new(Some(pipeline)),
            disposed: AtomicBool::new(false),
        }
    }

    /// Feed raw events from the event source
    ///
    /// Classification runs on the calling thread; this never waits on
    /// generation.
    pub fn on_events(&self, events: &[RawEvent]) {
        let classified = classify(events, |path| {
            self.tracked.is_tracked(path, self.project.as_ref())
        });
        if classified.is_empty() {
            return;
        }

        debug!(
            changed = classified.changed.len(),
            deleted = classified.deleted.len(),
            "Classified layout changes"
        );
        self.debouncer.enqueue(classified.changed, classified.deleted);
    }

    /// Enqueue already classified changes
    pub fn enqueue(&self, changed: HashSet<PathBuf>, deleted: HashSet<PathBuf>) {
        self.debouncer.enqueue(changed, deleted);
    }

    /// Dispatch the pending batch without waiting for the quiet period
    pub fn flush(&self) {
        self.debouncer.flush();
    }

    /// Tear the session down
    ///
    /// Pending changes are discarded and later events ignored. Compiles
    /// already running finish; their units' results are discarded if the
    /// units were disposed meanwhile.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.debouncer.dispose();
        if let Some(pipeline) = self.pipeline.lock().take() {
            pipeline.abort();
        }
        info!("Project session disposed");
    }

    /// Check if the session has been disposed
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Number of paths waiting in the debouncer
    pub fn pending_count(&self) -> usize {
        self.debouncer.pending_count()
    }

    /// Scheduler driving generation
    pub fn scheduler(&self) -> &InvalidationScheduler {
        &self.scheduler
    }

    /// Wait until every dispatched batch has been scheduled and no
    /// generation request is active
    ///
    /// Changes still inside their quiet period are not waited for; call
    /// [`flush`](Self::flush) first to include them.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.progress.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_disposed()
                || self.progress.handled.load(Ordering::Acquire) >= self.debouncer.dispatched()
            {
                break;
            }
            notified.await;
        }

        self.scheduler.wait_idle().await;
    }
}

impl Drop for ProjectSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run_pipeline(
    mut rx: mpsc::UnboundedReceiver<ChangeBatch>,
    project: Arc<dyn ProjectContext>,
    scheduler: InvalidationScheduler,
    progress: Arc<Progress>,
) {
    while let Some(batch) = rx.recv().await {
        let units = resolve(batch.paths(), project.as_ref());
        if units.is_empty() {
            debug!("Batch of {} paths affects no live unit", batch.len());
        } else {
            debug!(units = units.len(), paths = batch.len(), "Invalidating units");
            scheduler.invalidate(&units, batch.changed(), batch.deleted());
        }

        progress.handled.fetch_add(1, Ordering::AcqRel);
        progress.notify.notify_waiters();
    }
    debug!("Pipeline stopped");
}
