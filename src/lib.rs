//! # Simultaneous
//!
//! Run a fixed batch of tasks as if they all started at the same instant,
//! bounded by one timeout for the whole batch.
//!
//! ## Overview
//!
//! Each run spawns one execution context per task. Every context parks at a
//! gate; once the last one arrives the gate opens for all of them at once.
//! The caller then waits for either every task to finish or the timeout to
//! elapse, whichever comes first. An optional stagger delays the task at
//! position `i` by `i * delay` after the gate opens.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use simultaneous::{is_timeout_exceeded, Operation};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let op = Operation::new((0..4).map(|i| move || println!("task {}", i)))?;
//!
//! match op.run(Duration::from_secs(1), Duration::ZERO) {
//!     Ok(()) => println!("all tasks finished"),
//!     Err(err) if is_timeout_exceeded(&err) => println!("gave up waiting"),
//!     Err(err) => return Err(err.into()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Caveats
//!
//! - A timed-out run does not cancel its tasks. They keep running in the
//!   background and a task that never returns leaks its thread or future.
//! - Panics inside task bodies are caught and logged, never reported through
//!   the run's result.
//!
//! ## Modules
//!
//! - [`operation`]: the blocking and async runners
//! - [`sync`]: one-shot latches and counting rendezvous

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

use std::error::Error as StdError;

use thiserror::Error;

/// Result type for runner operations
pub type Result<T> = std::result::Result<T, SimultaneousError>;

/// Main error type
#[derive(Error, Debug)]
pub enum SimultaneousError {
    /// Rejected task list at construction time
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),

    /// The batch did not finish before the timeout
    #[error(transparent)]
    TimeoutExceeded(#[from] TimeoutExceeded),

    /// The OS refused to spawn a task thread
    #[error("failed to spawn task thread: {0}")]
    Spawn(#[from] std::io::Error),
}

impl SimultaneousError {
    /// Whether this is the timeout condition
    pub fn is_timeout_exceeded(&self) -> bool {
        matches!(self, Self::TimeoutExceeded(_))
    }

    /// Whether this is a construction-time rejection
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}

/// Why a task list was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// No tasks were supplied
    #[error("got no tasks")]
    Empty,

    /// The slot at `index` held no task
    #[error("got missing task (index {index})")]
    MissingTask {
        /// Position of the first absent task
        index: usize,
    },
}

/// The batch did not finish before the timeout elapsed
#[derive(Error, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[error("timeout exceeded")]
pub struct TimeoutExceeded;

/// Whether `err`, or any error in its source chain, is a timeout.
///
/// Works through wrappers such as `anyhow` context or any error type that
/// exposes the timeout as its `source()`.
pub fn is_timeout_exceeded(err: &(dyn StdError + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(err) = current {
        if err.is::<TimeoutExceeded>() {
            return true;
        }
        if let Some(err) = err.downcast_ref::<SimultaneousError>() {
            if err.is_timeout_exceeded() {
                return true;
            }
        }
        current = err.source();
    }
    false
}

/// Runner implementations
pub mod operation;

/// Synchronization primitives used by the runners
pub mod sync;

pub use operation::{AsyncOperation, AsyncTask, Operation, RunConfig, Task};
