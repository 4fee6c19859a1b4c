//! Per-user session storage.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use dashmap::DashMap;
use questline_domain::{Session, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Slot holding a user's session; `None` means the user is idle.
pub type SessionSlot = Option<Session>;

/// Concurrent map of live sessions.
///
/// Each user owns one async mutex. Callers hold the guard for the whole
/// read-modify-write of a single operation, so operations for one user are
/// serialized while different users never contend. Idle users are dropped
/// from the map when their last guard goes away.
#[derive(Default)]
pub struct SessionStore {
    slots: DashMap<UserId, Arc<Mutex<SessionSlot>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock a user's slot, creating an idle slot on first use.
    ///
    /// The shard lock of the map is released before awaiting the user mutex.
    pub async fn lock(&self, user: &UserId) -> SessionGuard<'_> {
        let slot = self.slots.entry(user.clone()).or_default().value().clone();
        SessionGuard {
            guard: slot.lock_owned().await,
            store: self,
            user: user.clone(),
        }
    }

    /// Number of users with a slot in the store.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Exclusive access to one user's slot.
pub struct SessionGuard<'a> {
    guard: OwnedMutexGuard<SessionSlot>,
    store: &'a SessionStore,
    user: UserId,
}

impl Deref for SessionGuard<'_> {
    type Target = SessionSlot;

    fn deref(&self) -> &SessionSlot {
        &self.guard
    }
}

impl DerefMut for SessionGuard<'_> {
    fn deref_mut(&mut self) -> &mut SessionSlot {
        &mut self.guard
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            return;
        }
        let mutex = OwnedMutexGuard::mutex(&self.guard);
        // Waiters hold a clone and new clones need the shard lock taken here,
        // so a count of two (map and this guard) means nobody else has it.
        self.store.slots.remove_if(&self.user, |_, slot| {
            Arc::ptr_eq(slot, mutex) && Arc::strong_count(slot) == 2
        });
    }
}
