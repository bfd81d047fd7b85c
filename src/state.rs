//! Explicit state holder: immutable snapshots plus listener registration.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

/// Handle returned by [`StateHolder::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Holds a value of `T`, hands out clones and notifies listeners on update.
pub struct StateHolder<T> {
    value: RwLock<T>,
    listeners: Mutex<Vec<(ListenerId, Listener<T>)>>,
    next_id: Mutex<u64>,
}

impl<T: Clone + PartialEq> StateHolder<T> {
    pub fn new(initial: T) -> Self {
        Self {
            value: RwLock::new(initial),
            listeners: Mutex::new(Vec::new()),
            next_id: Mutex::new(0),
        }
    }

    /// Current snapshot.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Replaces the value; listeners only fire when it actually changed.
    pub fn set(&self, value: T) {
        self.update(|v| *v = value);
    }

    /// Mutates a copy of the value and publishes it.
    pub fn update<F: FnOnce(&mut T)>(&self, f: F) {
        let snapshot = {
            let mut guard = self.value.write();
            let mut next = guard.clone();
            f(&mut next);
            if next == *guard {
                return;
            }
            *guard = next.clone();
            next
        };

        // Clone listeners out so callbacks may subscribe/unsubscribe.
        let listeners: Vec<Listener<T>> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let id = {
            let mut next = self.next_id.lock();
            *next += 1;
            ListenerId(*next)
        };
        self.listeners.lock().push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(lid, _)| *lid != id);
        listeners.len() != before
    }
}

impl<T: Clone + PartialEq + Default> Default for StateHolder<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_listeners_fire_on_change_only() {
        let holder = StateHolder::new(1u32);
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        holder.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        holder.set(1);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        holder.set(2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(holder.get(), 2);
    }

    #[test]
    fn test_unsubscribe() {
        let holder = StateHolder::new(String::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = Arc::clone(&hits);
        let id = holder.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });
        assert!(holder.unsubscribe(id));
        assert!(!holder.unsubscribe(id));
        holder.set("changed".to_string());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
