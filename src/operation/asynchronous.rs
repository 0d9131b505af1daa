//! Task-per-future runner on tokio

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, instrument, trace, warn};

use super::config::{duration_to_ms, stagger, RunConfig};
use super::state::RunState;
use super::task::{collect_slots, AsyncTask};
use crate::sync::AsyncLatch;
use crate::{Result, TimeoutExceeded};

/// Runs a fixed set of async tasks as if simultaneously
///
/// Every [`run`](AsyncOperation::run) spawns one tokio task per entry and must
/// be called from within a tokio runtime. Spawned tasks are held at a gate
/// until all of them have been scheduled and reached it.
///
/// On timeout the spawned tasks are not aborted; they keep running on the
/// runtime until their futures complete.
pub struct AsyncOperation {
    tasks: Vec<AsyncTask>,
    run_lock: Mutex<()>,
}

impl AsyncOperation {
    /// Build an operation from async closures
    pub fn new<I, F, Fut>(tasks: I) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::from_slots(
            tasks
                .into_iter()
                .map(|f| Some(Arc::new(move || f().boxed()) as AsyncTask)),
        )
    }

    /// Build an operation from task slots that may be absent
    pub fn from_slots<I>(slots: I) -> Result<Self>
    where
        I: IntoIterator<Item = Option<AsyncTask>>,
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
    /// Same contract as [`Operation::run`](crate::Operation::run): a zero
    /// `timeout` waits indefinitely and position `i` sleeps `i * delay` after
    /// release.
    ///
    /// # Panics
    ///
    /// Panics if polled outside a tokio runtime, since every task is started
    /// with `tokio::spawn`.
    #[instrument(skip(self), fields(tasks = self.tasks.len()))]
    pub async fn run(&self, timeout: Duration, delay: Duration) -> Result<()> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();

        let state = Arc::new(RunState::<AsyncLatch>::new(self.tasks.len()));

        for (position, task) in self.tasks.iter().enumerate() {
            tokio::spawn(convene(position, task.clone(), state.clone(), delay));
        }

        let completion = state.completion().wait();
        if timeout.is_zero() {
            completion.await;
        } else if tokio::time::timeout(timeout, completion).await.is_err() {
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
    pub async fn run_with(&self, config: &RunConfig) -> Result<()> {
        self.run(config.timeout(), config.delay()).await
    }
}

impl fmt::Debug for AsyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncOperation")
            .field("tasks", &self.tasks.len())
            .finish()
    }
}

async fn convene(
    position: usize,
    task: AsyncTask,
    state: Arc<RunState<AsyncLatch>>,
    delay: Duration,
) {
    if state.arrive() {
        trace!("All tasks at the gate, releasing");
    }
    state.release().wait().await;

    if !delay.is_zero() {
        tokio::time::sleep(stagger(position, delay)).await;
    }

    // The call itself sits inside the guarded future so a panic while
    // building the task's future is caught too.
    let outcome = AssertUnwindSafe(async { task().await })
        .catch_unwind()
        .await;
    if outcome.is_err() {
        warn!(position, "Task panicked");
    }

    state.finish();
}
