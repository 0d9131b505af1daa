//! Counting rendezvous

use std::sync::atomic::{AtomicUsize, Ordering};

use super::latch::OneShot;

/// Counter that fires its signal when the last expected party arrives
///
/// Arrivals past the target are ignored, so the signal fires exactly once.
#[derive(Debug)]
pub struct Countdown<S> {
    remaining: AtomicUsize,
    signal: S,
}

impl<S: OneShot> Countdown<S> {
    /// Create a countdown expecting `target` arrivals.
    ///
    /// A zero target fires immediately.
    pub fn new(target: usize) -> Self {
        let countdown = Self {
            remaining: AtomicUsize::new(target),
            signal: S::default(),
        };
        if target == 0 {
            countdown.signal.fire();
        }
        countdown
    }

    /// Record one arrival. Returns `true` for the arrival that fired the signal.
    pub fn arrive(&self) -> bool {
        let previous = self
            .remaining
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));

        match previous {
            Ok(1) => self.signal.fire(),
            _ => false,
        }
    }

    /// Arrivals still outstanding
    pub fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }

    /// The signal fired on the last arrival
    pub fn signal(&self) -> &S {
        &self.signal
    }
}
