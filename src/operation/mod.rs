//! Synchronized batch runners
//!
//! [`Operation`] drives blocking closures on OS threads and [`AsyncOperation`]
//! drives futures on tokio. Both hold every task at a gate until all of them
//! have arrived, release them together, and race completion against a timeout.

pub mod asynchronous;
pub mod blocking;
pub mod config;
mod state;
pub mod task;

pub use asynchronous::AsyncOperation;
pub use blocking::Operation;
pub use config::RunConfig;
pub use task::{AsyncTask, Task};
