//! Per-component subscription registry.
//!
//! One slot per query key, indexed by the key's position in the query map.
//! A slot holds the current result handle and the key's listener. Whenever a
//! slot holds a handle, that slot's listener is registered on it exactly once.

use livebind_reactive::{Listener, LiveResults};
use std::rc::Rc;

/// Outcome of reconciling a slot with a freshly resolved handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Reconciled {
    /// The same handle is already held; nothing was touched.
    Unchanged,
    /// The listener moved to the new handle.
    Attached,
    /// The query produced no handle; the slot is now empty.
    Unresolved,
}

struct Slot<R> {
    handle: Option<Rc<R>>,
    listener: Listener<R>,
}

pub(crate) struct SubscriptionRegistry<R> {
    slots: Vec<Slot<R>>,
}

impl<R: LiveResults> SubscriptionRegistry<R> {
    /// Creates a registry with one empty slot per listener.
    pub(crate) fn new(listeners: Vec<Listener<R>>) -> Self {
        Self {
            slots: listeners
                .into_iter()
                .map(|listener| Slot {
                    handle: None,
                    listener,
                })
                .collect(),
        }
    }

    /// Moves slot `index` onto `candidate`, comparing handles by identity.
    pub(crate) fn reconcile(&mut self, index: usize, candidate: Option<Rc<R>>) -> Reconciled {
        let slot = &mut self.slots[index];

        if let (Some(held), Some(next)) = (&slot.handle, &candidate) {
            if Rc::ptr_eq(held, next) {
                return Reconciled::Unchanged;
            }
        }

        if let Some(previous) = slot.handle.take() {
            detach(index, &previous, &slot.listener);
        }

        match candidate {
            Some(next) => {
                next.add_listener(slot.listener.clone());
                tracing::trace!(slot = index, "attached listener");
                slot.handle = Some(next);
                Reconciled::Attached
            }
            None => Reconciled::Unresolved,
        }
    }

    /// Returns the handle held by slot `index`.
    #[inline]
    pub(crate) fn held(&self, index: usize) -> Option<&Rc<R>> {
        self.slots.get(index).and_then(|slot| slot.handle.as_ref())
    }

    /// Returns true if slot `index` holds exactly `results`.
    pub(crate) fn holds(&self, index: usize, results: &R) -> bool {
        self.held(index)
            .is_some_and(|held| std::ptr::eq(Rc::as_ptr(held), results))
    }

    /// Returns the listener of slot `index`.
    #[cfg(test)]
    pub(crate) fn listener(&self, index: usize) -> &Listener<R> {
        &self.slots[index].listener
    }

    /// Detaches every listener and empties every slot.
    ///
    /// Returns the number of handles released.
    pub(crate) fn detach_all(&mut self) -> usize {
        let mut released = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if let Some(handle) = slot.handle.take() {
                detach(index, &handle, &slot.listener);
                released += 1;
            }
        }
        released
    }

    /// Returns the number of slots currently holding a handle.
    pub(crate) fn held_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.handle.is_some()).count()
    }
}

/// Removes a listener, tolerating handles that no longer know it.
fn detach<R: LiveResults>(index: usize, handle: &Rc<R>, listener: &Listener<R>) {
    if handle.remove_listener(listener) {
        tracing::trace!(slot = index, "detached listener");
    } else {
        tracing::trace!(slot = index, "listener already gone from stale handle");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livebind_reactive::{ChangeSet, LiveCollection};

    type Live = LiveCollection<i64>;

    fn registry(slots: usize) -> SubscriptionRegistry<Live> {
        let listeners = (0..slots)
            .map(|_| Rc::new(|_: &Live, _: &ChangeSet| {}) as Listener<Live>)
            .collect();
        SubscriptionRegistry::new(listeners)
    }

    #[test]
    fn test_reconcile_attaches_once() {
        let mut reg = registry(1);
        let live = Rc::new(Live::new());

        assert_eq!(reg.reconcile(0, Some(live.clone())), Reconciled::Attached);
        assert_eq!(live.listener_count(), 1);
        assert!(live.has_listener(reg.listener(0)));

        assert_eq!(reg.reconcile(0, Some(live.clone())), Reconciled::Unchanged);
        assert_eq!(live.listener_count(), 1);
        assert!(reg.holds(0, &live));
    }

    #[test]
    fn test_reconcile_moves_listener() {
        let mut reg = registry(1);
        let a = Rc::new(Live::new());
        let b = Rc::new(Live::new());

        reg.reconcile(0, Some(a.clone()));
        assert_eq!(reg.reconcile(0, Some(b.clone())), Reconciled::Attached);

        assert_eq!(a.listener_count(), 0);
        assert_eq!(b.listener_count(), 1);
        assert!(!reg.holds(0, &a));
        assert!(reg.holds(0, &b));
    }

    #[test]
    fn test_reconcile_unresolved_clears_slot() {
        let mut reg = registry(1);
        let a = Rc::new(Live::new());

        reg.reconcile(0, Some(a.clone()));
        assert_eq!(reg.reconcile(0, None), Reconciled::Unresolved);

        assert_eq!(a.listener_count(), 0);
        assert!(reg.held(0).is_none());
        assert_eq!(reg.reconcile(0, None), Reconciled::Unresolved);
    }

    #[test]
    fn test_same_handle_in_two_slots() {
        let mut reg = registry(2);
        let shared = Rc::new(Live::new());

        reg.reconcile(0, Some(shared.clone()));
        reg.reconcile(1, Some(shared.clone()));
        assert_eq!(shared.listener_count(), 2);

        reg.reconcile(0, Some(Rc::new(Live::new())));
        assert_eq!(shared.listener_count(), 1);
        assert!(shared.has_listener(reg.listener(1)));
    }

    #[test]
    fn test_detach_all() {
        let mut reg = registry(3);
        let a = Rc::new(Live::new());
        let b = Rc::new(Live::new());

        reg.reconcile(0, Some(a.clone()));
        reg.reconcile(2, Some(b.clone()));
        assert_eq!(reg.held_count(), 2);

        assert_eq!(reg.detach_all(), 2);
        assert_eq!(reg.held_count(), 0);
        assert_eq!(a.listener_count(), 0);
        assert_eq!(b.listener_count(), 0);
        assert_eq!(reg.detach_all(), 0);
    }

    #[test]
    fn test_detach_tolerates_stale_handle() {
        let mut reg = registry(1);
        let a = Rc::new(Live::new());

        reg.reconcile(0, Some(a.clone()));
        // The store dropped the listener on its own.
        assert!(a.remove_listener(reg.listener(0)));

        assert_eq!(reg.detach_all(), 1);
        assert_eq!(a.listener_count(), 0);
    }
}
