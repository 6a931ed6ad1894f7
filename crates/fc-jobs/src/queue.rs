//! Worker-pool job queue with completion notifications.
//!
//! Trees are executed by a fixed pool of worker threads pulling from a shared
//! channel. Every status change is persisted through the [`JobDb`] before the
//! registered completion handler is invoked, so a crash between the two at
//! worst replays a finished tree, never loses one. The completion handler
//! fires exactly once per tree, from a worker thread.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::db::JobDb;
use crate::error::{JobsError, JobsResult};
use crate::tree::{JobTree, JobTreeId, TreeStatus};
use crate::workflow::Stage;

/// How a single workflow stage actually executes.
///
/// Production runners shell out to external tools; tests substitute stubs.
pub trait StageRunner: Send + Sync + 'static {
    fn run_stage(&self, stage: Stage, tree: &JobTree) -> JobsResult<()>;
}

type CompletionHandler = Arc<dyn Fn(JobTreeId, TreeStatus) + Send + Sync>;

/// Point-in-time queue counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub queued: usize,
    pub running: usize,
    pub finished: usize,
    pub failed: usize,
}

impl QueueStats {
    pub fn in_flight(&self) -> usize {
        self.queued + self.running
    }
}

struct QueueShared {
    db: JobDb,
    runner: Box<dyn StageRunner>,
    handler: Mutex<Option<CompletionHandler>>,
    stats: Mutex<QueueStats>,
    idle: Condvar,
}

/// Fixed-size worker pool executing job trees.
pub struct JobQueue {
    shared: Arc<QueueShared>,
    tx: Option<Sender<JobTree>>,
    workers: Vec<JoinHandle<()>>,
}

impl JobQueue {
    pub fn new(db: JobDb, runner: impl StageRunner, workers: usize) -> Self {
        let shared = Arc::new(QueueShared {
            db,
            runner: Box::new(runner),
            handler: Mutex::new(None),
            stats: Mutex::new(QueueStats::default()),
            idle: Condvar::new(),
        });

        let (tx, rx) = channel::<JobTree>();
        let rx = Arc::new(Mutex::new(rx));

        let worker_count = workers.max(1);
        let mut handles = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let shared = Arc::clone(&shared);
            let rx = Arc::clone(&rx);
            handles.push(thread::spawn(move || worker_loop(shared, rx)));
        }

        Self {
            shared,
            tx: Some(tx),
            workers: handles,
        }
    }

    /// Register the handler invoked once per tree when it reaches a terminal
    /// state. Replaces any previously registered handler.
    pub fn set_completion_handler(
        &self,
        handler: impl Fn(JobTreeId, TreeStatus) + Send + Sync + 'static,
    ) {
        *self.shared.handler.lock().unwrap() = Some(Arc::new(handler));
    }

    /// Persist and submit a tree. Returns immediately; execution is
    /// asynchronous and fire-and-forget.
    pub fn enqueue(&self, tree: JobTree) -> JobsResult<()> {
        self.shared.db.set_status(&tree, TreeStatus::Queued)?;
        {
            let mut stats = self.shared.stats.lock().unwrap();
            stats.queued += 1;
        }
        debug!(tree = %tree.id, stages = tree.workflow.stages.len(), "enqueueing job tree");
        self.tx
            .as_ref()
            .ok_or(JobsError::QueueClosed)?
            .send(tree)
            .map_err(|_| JobsError::QueueClosed)
    }

    pub fn stats(&self) -> QueueStats {
        *self.shared.stats.lock().unwrap()
    }

    /// Block until no trees are queued or running, or `timeout` elapses.
    /// Returns whether the queue drained. The engine never calls this; it is
    /// the substrate's own wait surface for callers and tests.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut stats = self.shared.stats.lock().unwrap();
        while stats.in_flight() > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, wait) = self
                .shared
                .idle
                .wait_timeout(stats, deadline - now)
                .unwrap();
            stats = guard;
            if wait.timed_out() && stats.in_flight() > 0 {
                return false;
            }
        }
        true
    }
}

impl Drop for JobQueue {
    fn drop(&mut self) {
        // Closing the channel lets idle workers exit; busy workers finish
        // their current tree first.
        self.tx.take();
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

fn worker_loop(shared: Arc<QueueShared>, rx: Arc<Mutex<Receiver<JobTree>>>) {
    loop {
        let tree = {
            let rx = rx.lock().unwrap();
            rx.recv()
        };
        match tree {
            Ok(tree) => process_tree(&shared, tree),
            Err(_) => break,
        }
    }
}

fn process_tree(shared: &QueueShared, tree: JobTree) {
    {
        let mut stats = shared.stats.lock().unwrap();
        stats.queued = stats.queued.saturating_sub(1);
        stats.running += 1;
    }
    if let Err(e) = shared.db.set_status(&tree, TreeStatus::Running) {
        warn!(tree = %tree.id, error = %e, "failed to persist running status");
    }

    let mut status = TreeStatus::Finished;
    for stage in &tree.workflow.stages {
        debug!(tree = %tree.id, stage = %stage, "running stage");
        if let Err(e) = shared.runner.run_stage(*stage, &tree) {
            warn!(tree = %tree.id, stage = %stage, error = %e, "stage failed");
            status = TreeStatus::Failed;
            break;
        }
    }

    if let Err(e) = shared.db.set_status(&tree, status) {
        warn!(tree = %tree.id, error = %e, "failed to persist terminal status");
    }

    info!(tree = %tree.id, status = ?status, "job tree completed");

    // Notify before flipping the counters: a wait_idle return must imply the
    // handler (and whatever ingestion it performs) already ran.
    let handler = shared.handler.lock().unwrap().clone();
    if let Some(handler) = handler {
        handler(tree.id, status);
    }

    {
        let mut stats = shared.stats.lock().unwrap();
        stats.running = stats.running.saturating_sub(1);
        match status {
            TreeStatus::Failed => stats.failed += 1,
            _ => stats.finished += 1,
        }
    }
    shared.idle.notify_all();
}
