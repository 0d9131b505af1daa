//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

/// Install a test-writer subscriber honoring `RUST_LOG`; repeated calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Start timestamps recorded by task bodies, keyed by task position
pub type StartLog = Arc<Mutex<Vec<(usize, Instant)>>>;

pub fn start_log(capacity: usize) -> StartLog {
    Arc::new(Mutex::new(Vec::with_capacity(capacity)))
}

/// Largest gap between any two recorded starts
pub fn start_spread(log: &StartLog) -> Duration {
    let log = log.lock().unwrap();
    let first = log.iter().map(|(_, t)| *t).min().expect("empty start log");
    let last = log.iter().map(|(_, t)| *t).max().expect("empty start log");
    last - first
}

/// Largest start spread accepted for tasks released together
pub const SAME_TIME_TOLERANCE: Duration = Duration::from_millis(5);

/// Check that position `i` started at least `i * delay` after position 0.
///
/// Position 0 never sleeps, so its start stands in for the release instant.
pub fn assert_staggered_from_release(log: &StartLog, tasks: usize, delay: Duration) {
    let log = log.lock().unwrap();
    assert_eq!(log.len(), tasks);

    let release = log
        .iter()
        .find(|(position, _)| *position == 0)
        .map(|(_, stamp)| *stamp)
        .expect("position 0 never ran");

    for (position, stamp) in log.iter() {
        let expected = (delay * *position as u32).saturating_sub(SAME_TIME_TOLERANCE);
        let actual = stamp.saturating_duration_since(release);
        assert!(
            actual >= expected,
            "task {} started {:?} after release, expected at least {:?}",
            position,
            actual,
            expected
        );
    }
}
