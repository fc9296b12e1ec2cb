//! The interface the binding layer consumes from a live-query engine.

use crate::subscription::Listener;

/// A live, mutable query result set.
///
/// Implementations update in place and notify registered listeners with a
/// [`ChangeSet`](crate::ChangeSet) after each mutation. Handles are shared as
/// `Rc<Self>` and compared by pointer identity, never by content.
pub trait LiveResults: Sized {
    /// Element type of the result set.
    type Item: Clone;

    /// Returns the current number of elements.
    fn len(&self) -> usize;

    /// Returns true if the result set is currently empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the element at `index`.
    fn get(&self, index: usize) -> Option<Self::Item>;

    /// Materializes the current contents into a fixed sequence.
    fn snapshot(&self) -> Vec<Self::Item> {
        (0..self.len()).filter_map(|i| self.get(i)).collect()
    }

    /// Registers a change listener.
    fn add_listener(&self, listener: Listener<Self>);

    /// Deregisters a change listener.
    ///
    /// Returns false if the listener was not registered. Callers treat that
    /// as a no-op.
    fn remove_listener(&self, listener: &Listener<Self>) -> bool;
}
