//! In-memory live result set.
//!
//! `LiveCollection` is a reference implementation of [`LiveResults`]: an
//! ordered list that notifies its listeners with an index-based
//! [`ChangeSet`] after every write.

use crate::change_set::ChangeSet;
use crate::results::LiveResults;
use crate::subscription::{Listener, ListenerSet};
use std::cell::RefCell;

/// An ordered, observable result set.
///
/// Writes are grouped with [`write`](LiveCollection::write): all mutations
/// made inside the closure are delivered to listeners as one change set once
/// the closure returns. The single-operation helpers (`push`, `insert`, ...)
/// are one-operation writes.
///
/// # Example
///
/// ```
/// use livebind_reactive::{ChangeSet, LiveCollection, LiveResults};
/// use std::rc::Rc;
///
/// let scores = Rc::new(LiveCollection::new());
/// scores.add_listener(Rc::new(|live: &LiveCollection<u32>, changes: &ChangeSet| {
///     assert_eq!(changes.insertions, vec![0, 1]);
///     assert_eq!(live.len(), 2);
/// }));
///
/// scores.write(|tx| {
///     tx.push(10);
///     tx.push(20);
/// });
/// ```
pub struct LiveCollection<T> {
    /// Current contents
    items: RefCell<Vec<T>>,
    /// Registered change listeners
    listeners: RefCell<ListenerSet<Self>>,
}

impl<T: Clone> Default for LiveCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> LiveCollection<T> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::from_vec(Vec::new())
    }

    /// Creates a collection with initial contents. No notification is sent.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: RefCell::new(items),
            listeners: RefCell::new(ListenerSet::new()),
        }
    }

    /// Returns the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Returns true if the listener is registered on this collection.
    pub fn has_listener(&self, listener: &Listener<Self>) -> bool {
        self.listeners.borrow().contains(listener)
    }

    /// Applies a batch of mutations and notifies listeners once.
    ///
    /// Listeners are not called if the batch recorded no change. The
    /// collection is not borrowed while listeners run, so they may read it
    /// or register and remove listeners.
    pub fn write<F, O>(&self, f: F) -> O
    where
        F: FnOnce(&mut Writer<'_, T>) -> O,
    {
        let (output, changes) = {
            let mut items = self.items.borrow_mut();
            let mut writer = Writer {
                items: &mut *items,
                changes: ChangeSet::new(),
            };
            let output = f(&mut writer);
            (output, writer.changes)
        };

        if !changes.is_empty() {
            self.notify(&changes);
        }
        output
    }

    /// Appends an element.
    pub fn push(&self, item: T) {
        self.write(|tx| tx.push(item));
    }

    /// Inserts an element at `index`, clamped to the current length.
    pub fn insert(&self, index: usize, item: T) {
        self.write(|tx| tx.insert(index, item));
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&self, index: usize) -> Option<T> {
        self.write(|tx| tx.remove(index))
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&self, index: usize, item: T) -> Option<T> {
        self.write(|tx| tx.set(index, item))
    }

    /// Removes every element.
    pub fn clear(&self) {
        self.write(|tx| tx.clear());
    }

    /// Delivers a change set to every listener, even an empty one.
    ///
    /// A listener removed by an earlier listener during the same dispatch is
    /// skipped.
    pub fn notify(&self, changes: &ChangeSet) {
        let listeners = self.listeners.borrow().snapshot();
        tracing::trace!(
            listeners = listeners.len(),
            changes = changes.len(),
            "dispatching change set"
        );
        for listener in listeners {
            if self.has_listener(&listener) {
                listener(self, changes);
            }
        }
    }
}

impl<T: Clone> LiveResults for LiveCollection<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.items.borrow().len()
    }

    fn get(&self, index: usize) -> Option<T> {
        self.items.borrow().get(index).cloned()
    }

    fn snapshot(&self) -> Vec<T> {
        self.items.borrow().clone()
    }

    fn add_listener(&self, listener: Listener<Self>) {
        self.listeners.borrow_mut().add(listener);
    }

    fn remove_listener(&self, listener: &Listener<Self>) -> bool {
        self.listeners.borrow_mut().remove(listener)
    }
}

/// Mutable access to a collection during a [`LiveCollection::write`] batch.
///
/// Indices are recorded in operation order.
pub struct Writer<'a, T> {
    items: &'a mut Vec<T>,
    changes: ChangeSet,
}

impl<T> Writer<'_, T> {
    /// Appends an element.
    pub fn push(&mut self, item: T) {
        self.changes.insert(self.items.len());
        self.items.push(item);
    }

    /// Inserts an element at `index`, clamped to the current length.
    pub fn insert(&mut self, index: usize, item: T) {
        let index = index.min(self.items.len());
        self.changes.insert(index);
        self.items.insert(index, item);
    }

    /// Removes and returns the element at `index`.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        self.changes.delete(index);
        Some(self.items.remove(index))
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, item: T) -> Option<T> {
        let slot = self.items.get_mut(index)?;
        self.changes.modify(index);
        Some(std::mem::replace(slot, item))
    }

    /// Updates the element at `index` in place.
    ///
    /// Returns false if there is no element at `index`.
    pub fn update<F>(&mut self, index: usize, f: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        match self.items.get_mut(index) {
            Some(item) => {
                f(item);
                self.changes.modify(index);
                true
            }
            None => false,
        }
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        for index in (0..self.items.len()).rev() {
            self.changes.delete(index);
        }
        self.items.clear();
    }

    /// Returns the current number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<ChangeSet>>>;

    fn recording(log: &Log) -> Listener<LiveCollection<i64>> {
        let log = log.clone();
        Rc::new(move |_: &LiveCollection<i64>, changes: &ChangeSet| {
            log.borrow_mut().push(changes.clone());
        })
    }

    #[test]
    fn test_live_collection_new() {
        let live: LiveCollection<i64> = LiveCollection::new();
        assert!(live.is_empty());
        assert_eq!(live.listener_count(), 0);
    }

    #[test]
    fn test_live_collection_from_vec() {
        let live = LiveCollection::from_vec(vec![1i64, 2, 3]);
        assert_eq!(live.len(), 3);
        assert_eq!(live.get(0), Some(1));
        assert_eq!(live.get(3), None);
        assert_eq!(live.snapshot(), vec![1, 2, 3]);
    }

    #[test]
    fn test_live_collection_push_notifies() {
        let live = LiveCollection::new();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        live.add_listener(recording(&log));

        live.push(10);
        live.push(20);

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].insertions, vec![0]);
        assert_eq!(log[1].insertions, vec![1]);
    }

    #[test]
    fn test_live_collection_remove_and_set() {
        let live = LiveCollection::from_vec(vec![1i64, 2, 3]);
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        live.add_listener(recording(&log));

        assert_eq!(live.remove(1), Some(2));
        assert_eq!(live.set(0, 7), Some(1));
        assert_eq!(live.remove(9), None);
        assert_eq!(live.set(9, 0), None);

        assert_eq!(live.snapshot(), vec![7, 3]);
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].deletions, vec![1]);
        assert_eq!(log[1].modifications, vec![0]);
    }

    #[test]
    fn test_live_collection_write_batches() {
        let live = LiveCollection::new();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        live.add_listener(recording(&log));

        live.write(|tx| {
            tx.push(1);
            tx.push(2);
            tx.insert(0, 0);
            tx.update(1, |v| *v += 10);
        });

        assert_eq!(live.snapshot(), vec![0, 11, 2]);
        let log = log.borrow();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].insertions, vec![0, 1, 0]);
        assert_eq!(log[0].modifications, vec![1]);
    }

    #[test]
    fn test_live_collection_empty_write_is_silent() {
        let live = LiveCollection::from_vec(vec![1i64]);
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        live.add_listener(recording(&log));

        let removed = live.write(|tx| tx.remove(5));
        assert_eq!(removed, None);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_live_collection_notify_empty() {
        let live: LiveCollection<i64> = LiveCollection::new();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        live.add_listener(recording(&log));

        live.notify(&ChangeSet::new());

        assert_eq!(log.borrow().len(), 1);
        assert!(log.borrow()[0].is_empty());
    }

    #[test]
    fn test_live_collection_clear() {
        let live = LiveCollection::from_vec(vec![1i64, 2]);
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        live.add_listener(recording(&log));

        live.clear();

        assert!(live.is_empty());
        assert_eq!(log.borrow()[0].deletions, vec![1, 0]);
    }

    #[test]
    fn test_live_collection_remove_listener() {
        let live: LiveCollection<i64> = LiveCollection::new();
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let listener = recording(&log);

        live.add_listener(listener.clone());
        assert!(live.has_listener(&listener));
        assert!(live.remove_listener(&listener));
        assert!(!live.remove_listener(&listener));

        live.push(1);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_live_collection_listener_reads_contents() {
        let live = Rc::new(LiveCollection::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();

        live.add_listener(Rc::new(move |live: &LiveCollection<i64>, _: &ChangeSet| {
            *seen_clone.borrow_mut() = live.snapshot();
        }));

        live.push(5);
        live.push(6);

        assert_eq!(*seen.borrow(), vec![5, 6]);
    }

    #[test]
    fn test_live_collection_listener_removed_during_dispatch() {
        let live = Rc::new(LiveCollection::new());
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let second = recording(&log);

        let second_clone = second.clone();
        live.add_listener(Rc::new(move |live: &LiveCollection<i64>, _: &ChangeSet| {
            live.remove_listener(&second_clone);
        }));
        live.add_listener(second.clone());

        live.push(1);

        assert!(log.borrow().is_empty());
        assert_eq!(live.listener_count(), 1);
    }
}
