//! Per-invocation run state

use std::sync::atomic::{AtomicBool, Ordering};

use crate::sync::{Countdown, OneShot};

/// Counters and signals owned by exactly one invocation
///
/// The readiness countdown's signal is the release gate; the completion
/// countdown's signal tells the caller every task is done.
#[derive(Debug)]
pub(crate) struct RunState<S> {
    ready: Countdown<S>,
    ended: Countdown<S>,
    aborted: AtomicBool,
}

impl<S: OneShot> RunState<S> {
    pub(crate) fn new(tasks: usize) -> Self {
        Self {
            ready: Countdown::new(tasks),
            ended: Countdown::new(tasks),
            aborted: AtomicBool::new(false),
        }
    }

    /// Mark one context as parked at the gate; the last arrival opens it
    pub(crate) fn arrive(&self) -> bool {
        self.ready.arrive()
    }

    /// Mark one context as finished; the last one fires completion
    pub(crate) fn finish(&self) -> bool {
        self.ended.arrive()
    }

    /// Contexts that have not finished yet
    pub(crate) fn pending(&self) -> usize {
        self.ended.remaining()
    }

    pub(crate) fn release(&self) -> &S {
        self.ready.signal()
    }

    pub(crate) fn completion(&self) -> &S {
        self.ended.signal()
    }

    /// Open the gate without running any task body
    pub(crate) fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
        self.ready.signal().fire();
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }
}
