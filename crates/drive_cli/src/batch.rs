//! Bounded fan-out for operations over many drive items.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::thread;

use crate::error::ActionError;

pub const MOVE_LIMIT: usize = 10;
pub const DELETE_LIMIT: usize = 4;
pub const TRASH_LIMIT: usize = 4;
/// Recovering or deleting from the trash.
pub const TRASH_RESTORE_LIMIT: usize = 8;
pub const UPLOAD_LIMIT: usize = 8;

/// Run `task` on every item with at most `limit` calls in flight.
///
/// Every item is attempted even when some fail; the first failure is reported together with
/// the failure count.
pub fn for_each_limited<T, F>(
    label: &str,
    items: &[T],
    limit: usize,
    task: F,
) -> Result<(), ActionError>
where
    T: Sync,
    F: Fn(&T) -> Result<(), ActionError> + Sync,
{
    if items.is_empty() {
        return Ok(());
    }
    let workers = limit.clamp(1, items.len());
    let next = AtomicUsize::new(0);
    let done = AtomicUsize::new(0);
    let failures: Mutex<Vec<(usize, ActionError)>> = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..workers {
            scope.spawn(|| loop {
                let index = next.fetch_add(1, Ordering::SeqCst);
                let Some(item) = items.get(index) else {
                    break;
                };
                if let Err(err) = task(item) {
                    tracing::warn!(label, index, error = %err, "batch item failed");
                    lock_unpoisoned(&failures).push((index, err));
                }
                let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                tracing::debug!(label, finished, total = items.len(), "batch progress");
            });
        }
    });

    let mut failures = failures.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner());
    tracing::info!(label, total = items.len(), failed = failures.len(), workers, "batch finished");
    if failures.is_empty() {
        return Ok(());
    }
    failures.sort_by_key(|(index, _)| *index);
    let failed = failures.len();
    let (_, first) = failures.remove(0);
    if items.len() == 1 {
        return Err(first);
    }
    Err(ActionError::Batch {
        failed,
        total: items.len(),
        first: Box::new(first),
    })
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
