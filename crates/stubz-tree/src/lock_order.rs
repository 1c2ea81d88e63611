//! Lock-order bookkeeping for node expansion locks.
//!
//! Two lock roles exist: the private per-node expansion lock, and broader
//! locks such as the declaration cache. A node lock is a leaf: while one is
//! held the thread must not take another node lock or any broader lock.
//! Every node lock goes through `NodeLockGuard`, which keeps a per-thread
//! count so broader locks can assert the rule in debug builds.

use std::cell::Cell;
use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError};

thread_local! {
    static NODE_LOCKS_HELD: Cell<u32> = const { Cell::new(0) };
    static BROADER_LOCKS_HELD: Cell<u32> = const { Cell::new(0) };
}

/// Number of node expansion locks held by the current thread.
pub fn node_locks_held() -> u32 {
    NODE_LOCKS_HELD.with(Cell::get)
}

/// Debug-build check called before acquiring a broader lock.
#[inline]
pub fn assert_no_node_lock(role: &str) {
    debug_assert!(
        node_locks_held() == 0,
        "lock order violation: {role} lock requested while holding a node expansion lock"
    );
}

/// Number of broader locks the current thread has entered through
/// `BroaderLockScope`.
pub fn broader_locks_held() -> u32 {
    BROADER_LOCKS_HELD.with(Cell::get)
}

/// Marks the current thread as holding a broader lock for as long as the
/// scope lives. Taking a node lock inside the scope is a lock order violation.
#[must_use = "the scope ends when the value is dropped"]
pub struct BroaderLockScope {
    _not_send: std::marker::PhantomData<*const ()>,
}

impl BroaderLockScope {
    pub fn enter(role: &str) -> BroaderLockScope {
        assert_no_node_lock(role);
        BROADER_LOCKS_HELD.with(|held| held.set(held.get() + 1));
        BroaderLockScope {
            _not_send: std::marker::PhantomData,
        }
    }
}

impl Drop for BroaderLockScope {
    fn drop(&mut self) {
        BROADER_LOCKS_HELD.with(|held| held.set(held.get().saturating_sub(1)));
    }
}

pub(crate) struct NodeLockGuard<'a, T> {
    guard: MutexGuard<'a, T>,
}

impl<'a, T> NodeLockGuard<'a, T> {
    pub(crate) fn lock(mutex: &'a Mutex<T>) -> Self {
        debug_assert!(
            node_locks_held() == 0,
            "lock order violation: node expansion locks must not nest"
        );
        debug_assert!(
            broader_locks_held() == 0,
            "lock order violation: node expansion lock requested while holding a broader lock"
        );
        // State is only replaced after every fallible step has succeeded, so a
        // panic under the lock leaves consistent data behind.
        let guard = mutex.lock().unwrap_or_else(PoisonError::into_inner);
        NODE_LOCKS_HELD.with(|held| held.set(held.get() + 1));
        NodeLockGuard { guard }
    }
}

impl<T> Drop for NodeLockGuard<'_, T> {
    fn drop(&mut self) {
        NODE_LOCKS_HELD.with(|held| held.set(held.get().saturating_sub(1)));
    }
}

impl<T> Deref for NodeLockGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<T> DerefMut for NodeLockGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
