//! Observer registration with synchronous notification.
//!
//! Both the OS signal and the reconciler fan changes out through an
//! [`ObserverList`]. Notification snapshots the registered callbacks and
//! releases the lock before calling them, so a callback may register or
//! remove observers (or call back into its owner) without deadlocking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Identifies one registered observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A list of callbacks notified in registration order.
pub struct ObserverList<T> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ObserverId, Callback<T>)>>,
}

impl<T> ObserverList<T> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Register `callback` and return its id.
    pub fn add<F>(&self, callback: F) -> ObserverId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Remove the observer with `id`. Returns `false` if it was not registered.
    pub fn remove(&self, id: ObserverId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Call every registered observer with `value`.
    pub fn notify(&self, value: &T) {
        let snapshot: Vec<Callback<T>> = self
            .lock()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();

        for callback in snapshot {
            callback(value);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(ObserverId, Callback<T>)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for ObserverList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ObserverList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverList")
            .field("observers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifies_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let list = ObserverList::<u32>::new();

        let first = Arc::clone(&seen);
        list.add(move |v| first.lock().unwrap().push(("first", *v)));
        let second = Arc::clone(&seen);
        list.add(move |v| second.lock().unwrap().push(("second", *v)));

        list.notify(&7);
        assert_eq!(*seen.lock().unwrap(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn removed_observer_is_not_called() {
        let calls = Arc::new(AtomicU64::new(0));
        let list = ObserverList::<()>::new();

        let counter = Arc::clone(&calls);
        let id = list.add(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(list.remove(id));
        assert!(!list.remove(id));
        list.notify(&());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(list.is_empty());
    }

    #[test]
    fn callback_may_register_during_notify() {
        let list = Arc::new(ObserverList::<()>::new());
        let inner = Arc::clone(&list);
        list.add(move |_| {
            inner.add(|_| {});
        });

        list.notify(&());
        assert_eq!(list.len(), 2);
    }
}
