use std::thread;

use crate::data::model::{EdgeCandidate, Timestamp};
use crate::dsp::edges::{find_edges, smoothed_gradient, EdgeDetectionConfig};
use crate::error::{LogError, Result};

// ---------------------------------------------------------------------------
// Tasks and results
// ---------------------------------------------------------------------------

/// The fixed set of pipeline stages a worker can execute. Dispatch is a
/// plain match over this enum.
#[derive(Debug, Clone)]
pub enum WorkerTask {
    /// Compute the smoothed gradient of one channel.
    Gradient {
        samples: Vec<f64>,
        timestamps: Vec<Timestamp>,
        config: EdgeDetectionConfig,
    },
    /// Extract edge candidates from an already computed gradient series.
    Edges {
        gradient: Vec<f64>,
        timestamps: Vec<Timestamp>,
        config: EdgeDetectionConfig,
    },
}

/// Output of a finished stage, one variant per [`WorkerTask`].
#[derive(Debug, Clone)]
pub enum StageOutput {
    Gradient(Vec<f64>),
    Edges(Vec<EdgeCandidate>),
}

fn run_task(task: WorkerTask) -> Result<StageOutput> {
    match task {
        WorkerTask::Gradient {
            samples,
            timestamps,
            config,
        } => smoothed_gradient(&samples, &timestamps, &config).map(StageOutput::Gradient),
        WorkerTask::Edges {
            gradient,
            timestamps,
            config,
        } => find_edges(&gradient, &timestamps, &config).map(StageOutput::Edges),
    }
}

// ---------------------------------------------------------------------------
// EdgeWorker – one task at a time, on its own thread
// ---------------------------------------------------------------------------

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Bound,
    Running,
    Completed,
}

enum Inner {
    Idle,
    Bound(WorkerTask),
    Running(flume::Receiver<Result<StageOutput>>),
    Completed(Result<StageOutput>),
}

/// A single-task execution unit for the edge pipeline.
///
/// Lifecycle: `Idle → Bound` on [`bind`](EdgeWorker::bind), `Bound →
/// Running` on [`start`](EdgeWorker::start), `Running → Completed` when the
/// stage returns, `Completed → Idle` when the result is collected. Exactly
/// one task may be bound and executing at a time: binding while a task runs
/// or while a result awaits collection fails with [`LogError::Busy`].
///
/// The stage runs on its own thread so a long smoothing/gradient pass never
/// blocks the caller; the result comes back through a single-slot channel
/// read once. There is no cancellation of an in-flight task; dropping the
/// worker detaches the thread.
pub struct EdgeWorker {
    inner: Inner,
}

impl Default for EdgeWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeWorker {
    pub fn new() -> Self {
        Self { inner: Inner::Idle }
    }

    /// Promote `Running` to `Completed` when the stage has finished.
    fn refresh(&mut self) {
        if !matches!(self.inner, Inner::Running(_)) {
            return;
        }
        if let Inner::Running(rx) = std::mem::replace(&mut self.inner, Inner::Idle) {
            self.inner = match rx.try_recv() {
                Ok(result) => Inner::Completed(result),
                Err(flume::TryRecvError::Empty) => Inner::Running(rx),
                Err(flume::TryRecvError::Disconnected) => {
                    Inner::Completed(Err(LogError::TaskAborted))
                }
            };
        }
    }

    pub fn state(&mut self) -> WorkerState {
        self.refresh();
        match self.inner {
            Inner::Idle => WorkerState::Idle,
            Inner::Bound(_) => WorkerState::Bound,
            Inner::Running(_) => WorkerState::Running,
            Inner::Completed(_) => WorkerState::Completed,
        }
    }

    /// Bind a task. Replaces a pending (not yet started) task; fails with
    /// [`LogError::Busy`] while a task is running or its result has not been
    /// collected yet.
    pub fn bind(&mut self, task: WorkerTask) -> Result<()> {
        self.refresh();
        match self.inner {
            Inner::Idle | Inner::Bound(_) => {
                self.inner = Inner::Bound(task);
                Ok(())
            }
            Inner::Running(_) | Inner::Completed(_) => Err(LogError::Busy),
        }
    }

    /// Start the bound task on its own thread. Fails with
    /// [`LogError::Busy`] when no task is bound or one is already in flight.
    pub fn start(&mut self) -> Result<()> {
        self.refresh();
        match std::mem::replace(&mut self.inner, Inner::Idle) {
            Inner::Bound(task) => {
                let (tx, rx) = flume::bounded(1);
                thread::spawn(move || {
                    // The receiver may be gone if the worker was dropped.
                    let _ = tx.send(run_task(task));
                });
                self.inner = Inner::Running(rx);
                Ok(())
            }
            other => {
                self.inner = other;
                Err(LogError::Busy)
            }
        }
    }

    /// Non-blocking poll. Returns `Ok(None)` while the task is still
    /// running (or none is); hands out the result exactly once and returns
    /// the worker to `Idle`.
    pub fn try_collect(&mut self) -> Result<Option<StageOutput>> {
        self.refresh();
        match std::mem::replace(&mut self.inner, Inner::Idle) {
            Inner::Completed(result) => result.map(Some),
            other => {
                self.inner = other;
                Ok(None)
            }
        }
    }

    /// Block until the running task finishes, then collect its result and
    /// return to `Idle`. Fails with [`LogError::Busy`] when nothing is
    /// running or completed.
    pub fn collect(&mut self) -> Result<StageOutput> {
        self.refresh();
        match std::mem::replace(&mut self.inner, Inner::Idle) {
            Inner::Completed(result) => result,
            Inner::Running(rx) => rx.recv().map_err(|_| LogError::TaskAborted)?,
            other => {
                self.inner = other;
                Err(LogError::Busy)
            }
        }
    }
}
