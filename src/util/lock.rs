use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::warn;

// A panic while a content-cache guard is held poisons the lock; the cached
// values themselves are plain clones, so recovering the guard is safe and the
// worst case is serving an entry written before the panic.

pub(crate) fn rw_read<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockReadGuard<'a, T> {
    match lock.read() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(source, op, access = "read", "content cache lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

pub(crate) fn rw_write<'a, T>(
    lock: &'a RwLock<T>,
    source: &'static str,
    op: &'static str,
) -> RwLockWriteGuard<'a, T> {
    match lock.write() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!(source, op, access = "write", "content cache lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
