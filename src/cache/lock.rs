use std::sync::{Mutex, MutexGuard};

use tracing::warn;

/// Lock a cache mutex, recovering the guard if a previous holder panicked.
pub(crate) fn mutex_lock<'a, T>(
    lock: &'a Mutex<T>,
    target: &'static str,
    op: &'static str,
) -> MutexGuard<'a, T> {
    match lock.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(
                op,
                target_module = target,
                lock_kind = "mutex.lock",
                result = "poisoned_recovered",
                hint = "cached listings may be stale after a panic in another task",
                "Recovered from poisoned listing cache lock"
            );
            lock.clear_poison();
            poisoned.into_inner()
        }
    }
}
