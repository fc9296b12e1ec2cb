//! Handle cache for live query results.
//!
//! The binding layer diffs result handles by identity, so a query evaluated
//! twice with equal parameters must hand back the same `Rc`. `ResultCache`
//! memoizes handles per parameter to provide exactly that.

use hashbrown::HashMap;
use std::cell::RefCell;
use std::hash::Hash;
use std::rc::Rc;

/// Memoizes live result handles by query parameter.
///
/// # Example
///
/// ```
/// use livebind_reactive::{LiveCollection, ResultCache};
/// use std::rc::Rc;
///
/// let cache: ResultCache<u32, LiveCollection<String>> = ResultCache::new();
///
/// let a = cache.get_or_insert_with(7, LiveCollection::new);
/// let b = cache.get_or_insert_with(7, LiveCollection::new);
/// assert!(Rc::ptr_eq(&a, &b));
/// ```
pub struct ResultCache<K, R> {
    entries: RefCell<HashMap<K, Rc<R>>>,
}

impl<K: Eq + Hash, R> Default for ResultCache<K, R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, R> ResultCache<K, R> {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the handle cached for `key`, creating it with `f` if absent.
    pub fn get_or_insert_with<F>(&self, key: K, f: F) -> Rc<R>
    where
        F: FnOnce() -> R,
    {
        self.entries
            .borrow_mut()
            .entry(key)
            .or_insert_with(|| Rc::new(f()))
            .clone()
    }

    /// Returns the handle cached for `key`.
    pub fn get(&self, key: &K) -> Option<Rc<R>> {
        self.entries.borrow().get(key).cloned()
    }

    /// Inserts a handle, returning the one it replaced.
    pub fn insert(&self, key: K, handle: Rc<R>) -> Option<Rc<R>> {
        self.entries.borrow_mut().insert(key, handle)
    }

    /// Removes the handle cached for `key`.
    ///
    /// Holders of the handle keep it alive; the next lookup creates a new one.
    pub fn remove(&self, key: &K) -> Option<Rc<R>> {
        self.entries.borrow_mut().remove(key)
    }

    /// Drops handles that nobody outside the cache references any more.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|_, handle| Rc::strong_count(handle) > 1);
        let removed = before - entries.len();
        if removed > 0 {
            tracing::trace!(removed, remaining = entries.len(), "pruned result cache");
        }
        removed
    }

    /// Returns the number of cached handles.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Returns true if nothing is cached.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Drops every cached handle.
    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}
