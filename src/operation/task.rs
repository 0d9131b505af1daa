//! Task handles and construction-time validation

use std::sync::Arc;

use futures::future::BoxFuture;

use crate::{InvalidInput, Result, SimultaneousError};

/// A blocking task: zero arguments, no return value
pub type Task = Arc<dyn Fn() + Send + Sync>;

/// An async task: each call produces a fresh future to drive
pub type AsyncTask = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Collect task slots, rejecting an empty list or an absent task.
///
/// Emptiness is checked first, then slots in order; the first `None` is reported.
pub(crate) fn collect_slots<T, I>(slots: I) -> Result<Vec<T>>
where
    I: IntoIterator<Item = Option<T>>,
{
    let slots: Vec<Option<T>> = slots.into_iter().collect();
    if slots.is_empty() {
        return Err(InvalidInput::Empty.into());
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| SimultaneousError::from(InvalidInput::MissingTask { index }))
        })
        .collect()
}
