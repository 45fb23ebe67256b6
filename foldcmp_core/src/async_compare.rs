use crate::comparison::{CancelFlag, FolderComparator};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use foldcmp_common::{ComparisonOutcome, FoldCmpError};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, warn};

type ResultHandler = Box<dyn FnOnce(ComparisonOutcome)>;

// One stack frame set per directory level; PATH_MAX allows ~2000 levels
const WORKER_STACK_SIZE: usize = 64 * 1024 * 1024;

struct Job {
    id: u64,
    generation: u64,
    left: PathBuf,
    right: PathBuf,
}

struct Completion {
    id: u64,
    outcome: ComparisonOutcome,
}

/// Cancels the comparisons of an [`AsyncFolderComparator`] from any thread
#[derive(Clone)]
pub struct CancelHandle {
    generation: Arc<AtomicU64>,
    flag: CancelFlag,
}

impl CancelHandle {
    /// Cancel the running comparison and discard every queued one
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.flag.cancel();
    }
}

/// Runs folder comparisons on a background worker thread
///
/// Result handlers stay on the thread that owns this value and run there when
/// that thread calls [`dispatch_pending`](Self::dispatch_pending) or one of the
/// `wait_and_dispatch` methods. Every submitted comparison gets exactly one
/// outcome; dropping the comparator answers the outstanding ones with
/// `Cancelled` before it returns.
pub struct AsyncFolderComparator {
    cancel: CancelHandle,
    jobs: Option<Sender<Job>>,
    completions: Receiver<Completion>,
    handlers: HashMap<u64, ResultHandler>,
    next_id: u64,
    worker: Option<JoinHandle<()>>,
}

impl AsyncFolderComparator {
    pub fn new(comparator: FolderComparator) -> Result<Self, FoldCmpError> {
        let generation = Arc::new(AtomicU64::new(0));
        let cancel = CancelHandle {
            generation: generation.clone(),
            flag: comparator.cancel_flag(),
        };

        let (job_tx, job_rx) = channel::unbounded::<Job>();
        let (done_tx, done_rx) = channel::unbounded::<Completion>();

        let worker = std::thread::Builder::new()
            .name("foldcmp-worker".to_string())
            .stack_size(WORKER_STACK_SIZE)
            .spawn(move || run_worker(comparator, generation, job_rx, done_tx))
            .map_err(|e| FoldCmpError::Worker(format!("Failed to spawn comparison worker: {}", e)))?;

        Ok(Self {
            cancel,
            jobs: Some(job_tx),
            completions: done_rx,
            handlers: HashMap::new(),
            next_id: 0,
            worker: Some(worker),
        })
    }

    /// Queue a comparison of two folder trees
    ///
    /// Returns the id of the queued comparison. `on_result` runs later on
    /// this thread with the outcome.
    pub fn compare_async(
        &mut self,
        left: impl Into<PathBuf>,
        right: impl Into<PathBuf>,
        on_result: impl FnOnce(ComparisonOutcome) + 'static,
    ) -> u64 {
        self.next_id += 1;
        let job = Job {
            id: self.next_id,
            generation: self.cancel.generation.load(Ordering::SeqCst),
            left: left.into(),
            right: right.into(),
        };
        let id = job.id;

        let sent = self.jobs.as_ref().map(|jobs| jobs.send(job).is_ok()).unwrap_or(false);
        if sent {
            debug!("Queued comparison {}", id);
            self.handlers.insert(id, Box::new(on_result));
        } else {
            warn!("Comparison worker is gone, reporting comparison {} as cancelled", id);
            on_result(ComparisonOutcome::Cancelled);
        }
        id
    }

    /// Cancel the running comparison and discard every queued one
    pub fn cancel(&self) {
        debug!("Cancelling queued and running comparisons");
        self.cancel.cancel();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Number of comparisons whose handler has not run yet
    pub fn pending(&self) -> usize {
        self.handlers.len()
    }

    /// Run the handlers of every finished comparison without blocking
    pub fn dispatch_pending(&mut self) -> usize {
        let mut dispatched = 0;
        while let Ok(completion) = self.completions.try_recv() {
            self.deliver(completion);
            dispatched += 1;
        }
        dispatched
    }

    /// Block until the next comparison finishes and run its handler
    ///
    /// Returns `None` when nothing is pending.
    pub fn wait_and_dispatch(&mut self) -> Option<ComparisonOutcome> {
        if self.handlers.is_empty() {
            return None;
        }
        match self.completions.recv() {
            Ok(completion) => Some(self.deliver(completion)),
            Err(_) => self.cancel_remaining(),
        }
    }

    /// Like [`wait_and_dispatch`](Self::wait_and_dispatch), giving up after `timeout`
    pub fn wait_and_dispatch_timeout(&mut self, timeout: Duration) -> Option<ComparisonOutcome> {
        if self.handlers.is_empty() {
            return None;
        }
        match self.completions.recv_timeout(timeout) {
            Ok(completion) => Some(self.deliver(completion)),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => self.cancel_remaining(),
        }
    }

    /// Deliver what the worker already reported, then answer every handler
    /// still waiting with `Cancelled`
    fn cancel_remaining(&mut self) -> Option<ComparisonOutcome> {
        let mut last = None;
        while let Ok(completion) = self.completions.try_recv() {
            last = Some(self.deliver(completion));
        }

        let mut orphaned: Vec<_> = self.handlers.drain().collect();
        if !orphaned.is_empty() {
            warn!("Comparison worker stopped with {} comparisons outstanding", orphaned.len());
            orphaned.sort_by_key(|(id, _)| *id);
            for (_, handler) in orphaned {
                handler(ComparisonOutcome::Cancelled);
            }
            last = Some(ComparisonOutcome::Cancelled);
        }
        last
    }

    fn deliver(&mut self, completion: Completion) -> ComparisonOutcome {
        debug!("Comparison {} finished: {}", completion.id, completion.outcome);
        if let Some(handler) = self.handlers.remove(&completion.id) {
            handler(completion.outcome);
        }
        completion.outcome
    }
}

impl Drop for AsyncFolderComparator {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Comparison worker panicked");
            }
        }
        self.cancel_remaining();
    }
}

fn run_worker(
    comparator: FolderComparator,
    generation: Arc<AtomicU64>,
    jobs: Receiver<Job>,
    completions: Sender<Completion>,
) {
    for job in jobs.iter() {
        let outcome = if generation.load(Ordering::SeqCst) != job.generation {
            debug!("Discarding queued comparison {}", job.id);
            ComparisonOutcome::Cancelled
        } else {
            let outcome = comparator.compare(&job.left, &job.right);
            // A cancel racing with the start of compare() is only visible here
            if generation.load(Ordering::SeqCst) != job.generation {
                ComparisonOutcome::Cancelled
            } else {
                outcome
            }
        };

        if completions.send(Completion { id: job.id, outcome }).is_err() {
            break;
        }
    }
    debug!("Comparison worker exiting");
}
