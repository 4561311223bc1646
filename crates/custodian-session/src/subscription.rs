//! Subscriber bookkeeping for [`AuthContext`](crate::AuthContext).
//!
//! Subscribers are plain callbacks kept in registration order. The
//! context owns the list; a [`Subscription`] handle only holds a weak
//! reference to it, so a handle can remove its own callback but can
//! neither keep the context alive nor touch the session state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::SessionState;

pub(crate) type Callback = Arc<dyn Fn(&SessionState) + Send + Sync>;

/// Registered callbacks, oldest first.
#[derive(Default)]
pub(crate) struct SubscriberList {
    next_id: u64,
    entries: Vec<(u64, Callback)>,
}

impl SubscriberList {
    fn insert(&mut self, callback: Callback) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    /// Copies out the callbacks so they can run without the lock held.
    /// Callbacks may then subscribe or unsubscribe freely.
    pub(crate) fn snapshot(&self) -> Vec<Callback> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

pub(crate) type SharedSubscribers = Arc<Mutex<SubscriberList>>;

// The list is only ever mutated by push/retain, which leave it valid
// even if a panic unwinds through them.
pub(crate) fn lock(list: &Mutex<SubscriberList>) -> MutexGuard<'_, SubscriberList> {
    list.lock().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn register(list: &SharedSubscribers, callback: Callback) -> Subscription {
    let id = lock(list).insert(callback);
    tracing::trace!(subscriber = id, "subscriber registered");
    Subscription {
        id,
        list: Arc::downgrade(list),
        active: AtomicBool::new(true),
    }
}

/// Handle returned by [`AuthContext::subscribe`](crate::AuthContext::subscribe).
///
/// Dropping the handle does NOT unsubscribe; call
/// [`unsubscribe`](Self::unsubscribe). That mirrors the fire-and-forget
/// way UI code usually registers listeners.
pub struct Subscription {
    id: u64,
    list: Weak<Mutex<SubscriberList>>,
    active: AtomicBool,
}

impl Subscription {
    /// Permanently removes the callback. Calling it again is a no-op.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(list) = self.list.upgrade() {
            if lock(&list).remove(self.id) {
                tracing::trace!(subscriber = self.id, "subscriber removed");
            }
        }
    }

    /// `true` until [`unsubscribe`](Self::unsubscribe) is called or the
    /// context is gone.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) && self.list.strong_count() > 0
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}
