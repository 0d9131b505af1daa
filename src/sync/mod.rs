//! One-shot signals and counting rendezvous
//!
//! Every invocation of a runner builds fresh instances of these primitives.
//! None of them can be re-armed once fired.

pub mod countdown;
pub mod latch;

pub use countdown::Countdown;
pub use latch::{AsyncLatch, Latch, OneShot};
