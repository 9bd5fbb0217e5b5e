//! Lock helpers.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock a mutex, recovering the guard if a previous holder panicked.
///
/// Every lock in atrium guards plain bookkeeping (tables, counters, flags)
/// that stays consistent even if user code panicked elsewhere, so poisoning
/// carries no information worth failing on.
pub fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
