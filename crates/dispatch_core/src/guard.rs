//! Concurrency guard around the entity store.
//!
//! Every operation runs inside exactly one [`StoreGuard::with_store`] call, so
//! no caller ever observes a half-applied mutation. [`LockedStore`] serialises
//! callers behind a mutex. [`UnlockedStore`] has no lock at all and is `!Sync`,
//! which keeps it on the thread that built it.

use std::cell::RefCell;

use parking_lot::Mutex;

use crate::store::EntityStore;

pub trait StoreGuard: Sized {
    /// Matches `DispatchConfig::concurrency_guard` for configs this guard accepts.
    const LOCKED: bool;

    fn from_store(store: EntityStore) -> Self;

    /// Runs `op` with exclusive access to the store for its whole duration.
    fn with_store<R>(&self, op: impl FnOnce(&mut EntityStore) -> R) -> R;
}

/// Single global lock; the default guard.
pub struct LockedStore {
    inner: Mutex<EntityStore>,
}

impl StoreGuard for LockedStore {
    const LOCKED: bool = true;

    fn from_store(store: EntityStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    fn with_store<R>(&self, op: impl FnOnce(&mut EntityStore) -> R) -> R {
        let mut store = self.inner.lock();
        op(&mut store)
    }
}

/// No locking. Single-threaded benchmarking only.
pub struct UnlockedStore {
    inner: RefCell<EntityStore>,
}

impl StoreGuard for UnlockedStore {
    const LOCKED: bool = false;

    fn from_store(store: EntityStore) -> Self {
        Self {
            inner: RefCell::new(store),
        }
    }

    fn with_store<R>(&self, op: impl FnOnce(&mut EntityStore) -> R) -> R {
        // Operations never call back into the guard, so the borrow is never contended.
        let mut store = self.inner.borrow_mut();
        op(&mut store)
    }
}
