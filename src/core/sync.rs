//! Lock helpers that turn poisoning into domain errors
//!
//! A panic while a lock is held poisons it. Queue and sink code never panics
//! on a poisoned lock; instead the poison is mapped into the caller's own
//! error type through these helpers.

use std::sync::{LockResult, MutexGuard, RwLockReadGuard, RwLockWriteGuard};

/// Map a poisoned `Mutex::lock()` result into an application error
///
/// # Examples
/// ```
/// use std::sync::Mutex;
/// use eventqueue::core::sync::handle_mutex_poison;
/// use eventqueue::queue::api::QueueError;
///
/// let depth = Mutex::new(0usize);
/// let guard = handle_mutex_poison(depth.lock(), |message| QueueError::Internal { message })
///     .unwrap();
/// assert_eq!(*guard, 0);
/// ```
pub fn handle_mutex_poison<'a, T, E>(
    result: LockResult<MutexGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<MutexGuard<'a, T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (mutex poisoned while held by a panicking thread): {}",
            poison_err
        ))
    })
}

/// Map a poisoned `RwLock::read()` result into an application error
pub fn handle_rwlock_read<'a, T, E>(
    result: LockResult<RwLockReadGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockReadGuard<'a, T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (RwLock read poisoned): {}",
            poison_err
        ))
    })
}

/// Map a poisoned `RwLock::write()` result into an application error
pub fn handle_rwlock_write<'a, T, E>(
    result: LockResult<RwLockWriteGuard<'a, T>>,
    error_constructor: impl FnOnce(String) -> E,
) -> Result<RwLockWriteGuard<'a, T>, E> {
    result.map_err(|poison_err| {
        error_constructor(format!(
            "Internal synchronisation error (RwLock write poisoned): {}",
            poison_err
        ))
    })
}
