use crate::{Error, KinematicsChain, Outcome, Solver};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, OnceLock};
use std::thread;

type Task = Box<dyn FnOnce() + Send + 'static>;

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(0);
static GLOBAL_POOL: OnceLock<Arc<SolverPool>> = OnceLock::new();

/// A single background worker fed by a bounded queue.
///
/// Submitting while the queue is full is rejected with [`Error::QueueFull`]; nothing is dropped
/// or queued silently. The worker exits once the pool is dropped and its queue drained.
pub struct SolverPool {
    sender: SyncSender<Task>,
    capacity: usize,
    submitted: AtomicUsize,
    completed: Arc<AtomicUsize>,
}

impl SolverPool {
    pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

    pub fn new(capacity: usize) -> Result<Arc<Self>, Error> {
        if capacity == 0 {
            return Err(Error::InvalidValue {
                message: "solver queue capacity must be at least 1".to_string(),
            });
        }
        let (sender, receiver) = mpsc::sync_channel::<Task>(capacity);
        let completed = Arc::new(AtomicUsize::new(0));
        let worker_completed = Arc::clone(&completed);

        let name = format!(
            "solver-thread-{}",
            NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed) + 1
        );
        thread::Builder::new()
            .name(name)
            .spawn(move || {
                for task in receiver {
                    // Tasks report their own panics; this only keeps the worker alive.
                    let _ = panic::catch_unwind(AssertUnwindSafe(task));
                    worker_completed.fetch_add(1, Ordering::Release);
                }
            })
            .map_err(|e| Error::WorkerUnavailable {
                message: e.to_string(),
            })?;

        Ok(Arc::new(Self {
            sender,
            capacity,
            submitted: AtomicUsize::new(0),
            completed,
        }))
    }

    /// The process-wide pool used by [`AsyncSolver::new`].
    pub fn global() -> Result<Arc<Self>, Error> {
        if let Some(pool) = GLOBAL_POOL.get() {
            return Ok(Arc::clone(pool));
        }
        let pool = Self::new(Self::DEFAULT_QUEUE_CAPACITY)?;
        Ok(Arc::clone(GLOBAL_POOL.get_or_init(|| pool)))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Tasks accepted so far.
    pub fn submitted_tasks(&self) -> usize {
        self.submitted.load(Ordering::Acquire)
    }

    /// Tasks that have run to completion (or panicked) so far.
    pub fn completed_tasks(&self) -> usize {
        self.completed.load(Ordering::Acquire)
    }

    fn submit(&self, task: Task) -> Result<(), Error> {
        match self.sender.try_send(task) {
            Ok(()) => {
                self.submitted.fetch_add(1, Ordering::AcqRel);
                Ok(())
            }
            Err(TrySendError::Full(_)) => Err(Error::QueueFull {
                capacity: self.capacity,
            }),
            Err(TrySendError::Disconnected(_)) => Err(Error::WorkerUnavailable {
                message: "worker thread has exited".to_string(),
            }),
        }
    }
}

/// State handed from the worker back to the polling side.
struct Shared<S> {
    solver: Option<S>,
    outcome: Option<Outcome>,
}

/// Runs a [`Solver`] on a [`SolverPool`] so it can be polled once per frame without blocking.
///
/// The first call to [`solve`](Self::solve) submits one background task that drives the wrapped
/// solver to a terminal outcome; until it finishes every call returns [`Outcome::Processing`],
/// afterwards the terminal outcome. At most one task is ever submitted per wrapper and a
/// submitted task is never cancelled. A panic inside the wrapped solver is logged and reported
/// as [`Outcome::Failure`].
pub struct AsyncSolver<S> {
    pool: Arc<SolverPool>,
    shared: Arc<Mutex<Shared<S>>>,
    submitted: bool,
    outcome: Option<Outcome>,
    inner_iterations: usize,
}

impl<S: Solver + 'static> AsyncSolver<S> {
    /// Iterations per inner `solve` call made by the background task.
    pub const DEFAULT_INNER_ITERATIONS: usize = 20_000;

    /// Wraps `solver` using the process-wide [`SolverPool`].
    pub fn new(solver: S) -> Result<Self, Error> {
        Ok(Self::with_pool(solver, SolverPool::global()?))
    }

    pub fn with_pool(solver: S, pool: Arc<SolverPool>) -> Self {
        Self {
            pool,
            shared: Arc::new(Mutex::new(Shared {
                solver: Some(solver),
                outcome: None,
            })),
            submitted: false,
            outcome: None,
            inner_iterations: Self::DEFAULT_INNER_ITERATIONS,
        }
    }

    pub fn with_inner_iterations(mut self, iterations: usize) -> Self {
        self.inner_iterations = iterations.max(1);
        self
    }

    /// Polls the background solve; never blocks on it.
    ///
    /// `_max_iterations` is accepted for parity with [`Solver::solve`]; the background task uses
    /// its own inner budget. Only fails when the task cannot be submitted.
    pub fn solve(&mut self, _max_iterations: usize) -> Result<Outcome, Error> {
        if let Some(outcome) = self.outcome {
            return Ok(outcome);
        }
        if !self.submitted {
            self.submit()?;
            return Ok(Outcome::Processing);
        }

        let published = self.shared.lock().outcome;
        match published {
            Some(outcome) => {
                self.outcome = Some(outcome);
                Ok(outcome)
            }
            None => Ok(Outcome::Processing),
        }
    }

    pub fn has_finished(&self) -> bool {
        self.outcome.is_some() || self.shared.lock().outcome.is_some()
    }

    /// Copy of the wrapped solver's chain; `None` while the background task owns the solver or
    /// after it panicked.
    pub fn chain(&self) -> Option<KinematicsChain> {
        self.shared
            .lock()
            .solver
            .as_ref()
            .map(|solver| solver.chain().clone())
    }

    /// Returns the wrapped solver once it is not in use by the background task.
    pub fn into_solver(self) -> Option<S> {
        let solver = self.shared.lock().solver.take();
        solver
    }

    fn submit(&mut self) -> Result<(), Error> {
        let shared = Arc::clone(&self.shared);
        let inner_iterations = self.inner_iterations;
        let task: Task = Box::new(move || run_to_completion(&shared, inner_iterations));

        self.pool.submit(task)?;
        self.submitted = true;
        log::debug!(
            "submitted background solve ({} tasks submitted to pool)",
            self.pool.submitted_tasks()
        );
        Ok(())
    }
}

fn run_to_completion<S: Solver>(shared: &Mutex<Shared<S>>, inner_iterations: usize) {
    let taken = shared.lock().solver.take();
    let Some(mut solver) = taken else {
        log::error!("background solve started without a solver");
        shared.lock().outcome = Some(Outcome::Failure);
        return;
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut outcome = solver.solve(inner_iterations);
        while !solver.has_finished() {
            outcome = solver.solve(inner_iterations);
        }
        outcome
    }));

    let mut guard = shared.lock();
    match result {
        Ok(outcome) => {
            guard.solver = Some(solver);
            guard.outcome = Some(outcome);
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic payload>".to_string());
            log::error!("solver panicked in background task: {message}");
            guard.outcome = Some(Outcome::Failure);
        }
    }
}
