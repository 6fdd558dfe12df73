//! Per-user lock registry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rewards_core::UserId;

/// Hands out one mutex per user id.
///
/// Holding a user's lock serializes the read-check-write sequence for that
/// user; locks for different users are independent, so cross-user
/// operations proceed in parallel. Callers must never hold two user locks
/// at once.
#[derive(Default)]
pub struct UserLocks {
    inner: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    /// Get (or create) the lock for a user.
    pub fn for_user(&self, user_id: UserId) -> Arc<Mutex<()>> {
        let mut map = lock_recovering(&self.inner);
        Arc::clone(map.entry(user_id).or_default())
    }
}

/// Lock a mutex, recovering from poisoning.
///
/// The guarded state here is only the critical section itself; a panicked
/// holder leaves nothing inconsistent behind, so the poison flag is safe to
/// clear.
pub fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
