//! Change listeners and their registration.
//!
//! Listeners are identified by the allocation they live in, so removing a
//! listener means passing the same `Rc` that was registered.

use crate::change_set::ChangeSet;
use std::rc::Rc;

/// Callback invoked with the live results and the change that occurred.
pub type Listener<R> = Rc<dyn Fn(&R, &ChangeSet)>;

/// Returns true if both listeners are the same registration.
#[inline]
pub fn same_listener<R>(a: &Listener<R>, b: &Listener<R>) -> bool {
    // Compare data pointers only: vtable addresses are not unique per type.
    Rc::as_ptr(a) as *const () == Rc::as_ptr(b) as *const ()
}

/// Ordered set of listeners registered on one live result set.
pub struct ListenerSet<R> {
    listeners: Vec<Listener<R>>,
}

impl<R> Default for ListenerSet<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> ListenerSet<R> {
    /// Creates an empty listener set.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Registers a listener. Listeners are notified in registration order.
    pub fn add(&mut self, listener: Listener<R>) {
        self.listeners.push(listener);
    }

    /// Removes a listener.
    ///
    /// Returns true if the listener was registered.
    pub fn remove(&mut self, listener: &Listener<R>) -> bool {
        match self.listeners.iter().position(|l| same_listener(l, listener)) {
            Some(pos) => {
                self.listeners.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Returns true if the listener is currently registered.
    pub fn contains(&self, listener: &Listener<R>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Returns a copy of the registered listeners.
    ///
    /// Dispatch iterates a copy so callbacks may add or remove listeners.
    pub fn snapshot(&self) -> Vec<Listener<R>> {
        self.listeners.clone()
    }

    /// Returns the number of registered listeners.
    #[inline]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Returns true if there are no listeners.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Removes every listener.
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
