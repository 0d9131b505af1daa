//! Broadcast-once latches
//!
//! A latch starts unset, is fired at most once, and from then on every current
//! and future waiter observes it as set. [`Latch`] blocks OS threads on a
//! condition variable; [`AsyncLatch`] suspends tokio tasks on a [`Notify`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

/// Common surface of the one-shot signals
pub trait OneShot: Default + Send + Sync {
    /// Fire the signal. Returns `true` only for the call that fired it.
    fn fire(&self) -> bool;

    /// Whether the signal has fired
    fn is_fired(&self) -> bool;
}

/// Blocking one-shot latch
#[derive(Debug, Default)]
pub struct Latch {
    fired: Mutex<bool>,
    cond: Condvar,
}

impl Latch {
    /// Create an unset latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the current thread until the latch fires
    pub fn wait(&self) {
        let mut fired = self.fired.lock();
        while !*fired {
            self.cond.wait(&mut fired);
        }
    }

    /// Block until the latch fires or `timeout` elapses.
    ///
    /// Returns `true` if the latch fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_deadline(deadline),
            None => {
                self.wait();
                true
            }
        }
    }

    /// Block until the latch fires or `deadline` passes.
    ///
    /// Returns `true` if the latch fired.
    pub fn wait_deadline(&self, deadline: Instant) -> bool {
        let mut fired = self.fired.lock();
        while !*fired {
            if self.cond.wait_until(&mut fired, deadline).timed_out() {
                return *fired;
            }
        }
        true
    }
}

impl OneShot for Latch {
    fn fire(&self) -> bool {
        let mut fired = self.fired.lock();
        if *fired {
            return false;
        }
        *fired = true;
        self.cond.notify_all();
        true
    }

    fn is_fired(&self) -> bool {
        *self.fired.lock()
    }
}

/// Async one-shot latch
#[derive(Debug, Default)]
pub struct AsyncLatch {
    fired: AtomicBool,
    notify: Notify,
}

impl AsyncLatch {
    /// Create an unset latch
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until the latch fires
    pub async fn wait(&self) {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flag so a concurrent fire is not missed.
            notified.as_mut().enable();

            if self.fired.load(Ordering::Acquire) {
                return;
            }
            notified.await;
        }
    }
}

impl OneShot for AsyncLatch {
    fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.notify.notify_waiters();
        true
    }

    fn is_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_latch_fires_once() {
        let latch = Latch::new();
        assert!(!latch.is_fired());
        assert!(latch.fire());
        assert!(!latch.fire());
        assert!(latch.is_fired());

        // Already fired, returns immediately
        latch.wait();
        assert!(latch.wait_timeout(Duration::from_millis(1)));
    }

    #[test]
    fn test_latch_wait_timeout_expires() {
        let latch = Latch::new();
        let start = Instant::now();
        assert!(!latch.wait_timeout(Duration::from_millis(20)));
        assert!(start.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_latch_releases_all_waiters() {
        let latch = Arc::new(Latch::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let latch = latch.clone();
                thread::spawn(move || latch.wait())
            })
            .collect();

        thread::sleep(Duration::from_millis(10));
        latch.fire();

        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[tokio::test]
    async fn test_async_latch_fires_once() {
        let latch = AsyncLatch::new();
        assert!(latch.fire());
        assert!(!latch.fire());
        latch.wait().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_async_latch_releases_all_waiters() {
        let latch = Arc::new(AsyncLatch::new());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let latch = latch.clone();
                tokio::spawn(async move { latch.wait().await })
            })
            .collect();

        tokio::time::sleep(Duration::from_millis(10)).await;
        latch.fire();

        for handle in handles {
            tokio::time::timeout(Duration::from_secs(1), handle)
                .await
                .expect("waiter was not released")
                .unwrap();
        }
    }
}
