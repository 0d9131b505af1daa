//! Thread-per-task runner

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, error, instrument, trace, warn};

use super::config::{duration_to_ms, stagger, RunConfig};
use super::state::RunState;
use super::task::{collect_slots, Task};
use crate::sync::Latch;
use crate::{Result, TimeoutExceeded};

/// Runs a fixed set of blocking tasks as if simultaneously
///
/// Every [`run`](Operation::run) spawns one OS thread per task. All threads
/// park at a gate until the last one arrives, then they are released together.
///
/// A run that times out does not cancel its threads: they keep running to
/// completion in the background, and a task that never returns leaks its
/// thread. Task bodies must be safe to abandon.
pub struct Operation {
    tasks: Vec<Task>,
    run_lock: Mutex<()>,
}

impl Operation {
    /// Build an operation from closures.
    ///
    /// Fails with [`InvalidInput::Empty`](crate::InvalidInput::Empty) when
    /// `tasks` yields nothing.
    pub fn new<I, F>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Fn() + Send + Sync + 'static,
    {
        Self::from_slots(tasks.into_iter().map(|f| Some(Arc::new(f) as Task)))
    }

    /// Build an operation from task slots that may be absent.
    ///
    /// An empty list is rejected first, then the first `None` slot is
    /// reported by index.
    pub fn from_slots<I>(slots: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<Task>>,
    {
        Ok(Self {
            tasks: collect_slots(slots)?,
            run_lock: Mutex::new(()),
        })
    }

    /// Number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Always `false`; construction rejects empty task lists
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Run every task once.
    ///
    /// A zero `timeout` waits indefinitely. The task at position `i` sleeps
    /// `i * delay` after release before running. Concurrent calls on the same
    /// operation are serialized.
    #[instrument(skip(self), fields(tasks = self.tasks.len()))]
    pub fn run(&self, timeout: Duration, delay: Duration) -> Result<()> {
        let _guard = self.run_lock.lock();
        let started = Instant::now();
        let deadline = if timeout.is_zero() {
            None
        } else {
            started.checked_add(timeout)
        };

        let state = Arc::new(RunState::<Latch>::new(self.tasks.len()));

        for (position, task) in self.tasks.iter().enumerate() {
            let spawned = thread::Builder::new()
                .name(format!("simultaneous-task-{}", position))
                .spawn({
                    let task = task.clone();
                    let state = state.clone();
                    move || convene(position, &task, &state, delay)
                });

            if let Err(err) = spawned {
                error!(position, "Failed to spawn task thread: {}", err);
                state.abort();
                return Err(err.into());
            }
        }

        let finished = match deadline {
            Some(deadline) => state.completion().wait_deadline(deadline),
            None => {
                state.completion().wait();
                true
            }
        };

        if !finished {
            warn!(
                timeout_ms = duration_to_ms(timeout),
                "Timeout exceeded, {} tasks still running in the background",
                state.pending()
            );
            return Err(TimeoutExceeded.into());
        }

        debug!(elapsed_ms = duration_to_ms(started.elapsed()), "Run completed");
        Ok(())
    }

    /// Run with settings from a [`RunConfig`]
    pub fn run_with(&self, config: &RunConfig) -> Result<()> {
        self.run(config.timeout(), config.delay())
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

/// Body of one task thread
fn convene(position: usize, task: &Task, state: &RunState<Latch>, delay: Duration) {
    if state.arrive() {
        trace!("All tasks at the gate, releasing");
    }
    state.release().wait();

    if state.is_aborted() {
        return;
    }

    if !delay.is_zero() {
        thread::sleep(stagger(position, delay));
    }

    if panic::catch_unwind(AssertUnwindSafe(|| task())).is_err() {
        warn!(position, "Task panicked");
    }

    state.finish();
}
