//! Bound components: the query lifecycle around a presentation component.
//!
//! A [`BoundComponent`] moves through `Uninitialized → Mounted → Unmounted`.
//! Mounting resolves every query, subscribes to each handle and publishes the
//! complete view state at once. Each props update re-resolves the queries,
//! moves listeners only for keys whose handle changed, and merges only those
//! keys. Change notifications re-shape and merge the single key they concern.
//! Unmounting releases every listener.

use crate::binder::{QuerySet, ShouldUpdate};
use crate::registry::{Reconciled, SubscriptionRegistry};
use crate::shape::shape;
use crate::view::{BoundProps, ViewState, ViewValue};
use livebind_core::{Error, Result};
use livebind_reactive::{ChangeSet, Listener, LiveResults};
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// A presentation component: renders props and view state.
///
/// Implemented for every `Fn(BoundProps<'_, P, T>) -> O`.
pub trait Presenter<P, T> {
    /// Rendered output.
    type Output;

    /// Renders the merged input.
    fn present(&self, input: BoundProps<'_, P, T>) -> Self::Output;
}

impl<P, T, O, F> Presenter<P, T> for F
where
    F: Fn(BoundProps<'_, P, T>) -> O,
{
    type Output = O;

    fn present(&self, input: BoundProps<'_, P, T>) -> O {
        self(input)
    }
}

/// Hook into the host framework's render scheduling.
///
/// Called after a committed state merge that the update gate permits. No
/// borrow of the component is held during the call, so the host may render
/// synchronously from inside it.
pub trait RenderTrigger {
    /// Requests a re-render of the component.
    fn request_render(&self);
}

impl<F: Fn()> RenderTrigger for F {
    fn request_render(&self) {
        self()
    }
}

/// Lifecycle state of a bound component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, no query resolved yet.
    Uninitialized,
    /// Subscribed and publishing view state.
    Mounted,
    /// Every listener released; terminal.
    Unmounted,
}

impl Lifecycle {
    /// Returns a lowercase name for messages.
    pub fn name(self) -> &'static str {
        match self {
            Lifecycle::Uninitialized => "uninitialized",
            Lifecycle::Mounted => "mounted",
            Lifecycle::Unmounted => "unmounted",
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

macro_rules! notify_event {
    ($($arg:tt)*) => {{
        #[cfg(feature = "debug-log")]
        tracing::debug!($($arg)*);
        #[cfg(not(feature = "debug-log"))]
        tracing::trace!($($arg)*);
    }};
}

/// Mutable per-instance state shared with the listeners.
struct Instance<P, R: LiveResults> {
    queries: Rc<QuerySet<P, R>>,
    registry: SubscriptionRegistry<R>,
    view: Option<ViewState<R::Item>>,
    props: Option<P>,
    lifecycle: Lifecycle,
}

impl<P, R: LiveResults> Instance<P, R> {
    /// Initial resolution. On failure every listener attached so far is
    /// released and the instance stays uninitialized.
    fn mount(&mut self, props: P) -> Result<()> {
        if self.lifecycle != Lifecycle::Uninitialized {
            return Err(Error::lifecycle("mount", self.lifecycle.name()));
        }

        let keys = self.queries.keys().clone();
        let mut values = Vec::with_capacity(self.queries.len());
        for index in 0..self.queries.len() {
            let def = self.queries.def(index);
            let handle = match self.registry.reconcile(index, def.resolve(&props)) {
                Reconciled::Unresolved => None,
                _ => self.registry.held(index).cloned(),
            };
            let Some(handle) = handle else {
                let key = keys.name(index);
                tracing::warn!(key = %key, "query did not resolve on mount");
                self.registry.detach_all();
                return Err(Error::unresolved_query(key));
            };
            values.push(shape(def.mode(), handle.as_ref()));
        }

        self.view = Some(ViewState::new(keys, values));
        self.props = Some(props);
        self.lifecycle = Lifecycle::Mounted;
        tracing::debug!(queries = self.queries.len(), "mounted");
        Ok(())
    }

    /// Re-resolution. Returns the number of keys merged.
    ///
    /// Keys re-resolved before a failing key are still merged. The failing
    /// key keeps its last value but no handle, so the instance is not ready
    /// until a later update resolves it again.
    fn update(&mut self, props: P) -> Result<usize> {
        if self.lifecycle != Lifecycle::Mounted {
            return Err(Error::lifecycle("update", self.lifecycle.name()));
        }

        let props = &*self.props.insert(props);
        let mut patch = Vec::new();
        let mut failure = None;

        for index in 0..self.queries.len() {
            let def = self.queries.def(index);
            match self.registry.reconcile(index, def.resolve(props)) {
                Reconciled::Unchanged => {}
                Reconciled::Attached => {
                    if let Some(handle) = self.registry.held(index) {
                        patch.push((index, shape(def.mode(), handle.as_ref())));
                    }
                }
                Reconciled::Unresolved => {
                    let key = self.queries.keys().name(index);
                    tracing::warn!(key = %key, "query did not resolve on update");
                    failure = Some(Error::unresolved_query(key));
                    break;
                }
            }
        }

        let merged = patch.len();
        if merged > 0 {
            if let Some(view) = self.view.as_mut() {
                view.merge(patch);
            }
        }
        tracing::debug!(merged, "updated props");

        match failure {
            Some(err) => Err(err),
            None => Ok(merged),
        }
    }

    /// Handles a change notification for slot `index`.
    ///
    /// Returns true if the view state was merged.
    fn on_change(&mut self, index: usize, results: &R, changes: &ChangeSet) -> bool {
        if self.lifecycle != Lifecycle::Mounted {
            notify_event!(slot = index, state = %self.lifecycle, "ignored notification");
            return false;
        }
        if !self.registry.holds(index, results) {
            notify_event!(slot = index, "ignored notification from released handle");
            return false;
        }
        if changes.is_empty() {
            notify_event!(slot = index, "ignored empty change set");
            return false;
        }

        let value = shape(self.queries.def(index).mode(), results);
        match self.view.as_mut() {
            Some(view) => {
                view.merge(vec![(index, value)]);
                notify_event!(
                    key = %self.queries.keys().name(index),
                    insertions = changes.insertions.len(),
                    deletions = changes.deletions.len(),
                    modifications = changes.modifications.len(),
                    "merged change"
                );
                true
            }
            None => false,
        }
    }

    /// Re-shapes slots whose notifications were deferred.
    ///
    /// Entries whose handle is no longer held are dropped. Returns true if the
    /// view state was merged.
    fn refresh(&mut self, pending: &[(usize, *const ())]) -> bool {
        if self.lifecycle != Lifecycle::Mounted {
            return false;
        }

        let mut patch: Vec<(usize, ViewValue<R::Item>)> = Vec::new();
        for &(index, address) in pending {
            if patch.iter().any(|(slot, _)| *slot == index) {
                continue;
            }
            let Some(handle) = self.registry.held(index) else {
                continue;
            };
            if !std::ptr::eq(Rc::as_ptr(handle).cast::<()>(), address) {
                continue;
            }
            patch.push((index, shape(self.queries.def(index).mode(), handle.as_ref())));
        }

        if patch.is_empty() {
            return false;
        }
        notify_event!(slots = patch.len(), "merged deferred changes");
        match self.view.as_mut() {
            Some(view) => {
                view.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Mounted, with view state and a handle for every key.
    fn is_ready(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
            && self.view.is_some()
            && self.registry.held_count() == self.queries.len()
    }

    fn unmount(&mut self) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        let released = self.registry.detach_all();
        self.lifecycle = Lifecycle::Unmounted;
        tracing::debug!(released, "unmounted");
    }
}

/// Update gate and render hook shared by the component and its listeners.
struct RenderGate<P> {
    should_update: Option<ShouldUpdate<P>>,
    trigger: Rc<dyn RenderTrigger>,
}

impl<P> RenderGate<P> {
    /// Requests a re-render unless the gate rejects the current props.
    fn request<R: LiveResults>(&self, instance: &RefCell<Instance<P, R>>) {
        let permitted = match &self.should_update {
            Some(predicate) => match instance.try_borrow() {
                Ok(inner) => inner.props.as_ref().is_some_and(|props| predicate(props)),
                Err(_) => false,
            },
            None => true,
        };

        if permitted {
            self.trigger.request_render();
        } else {
            tracing::trace!("render skipped by update gate");
        }
    }
}

/// Notifications that arrived while the instance was borrowed.
///
/// Entries are a slot index and the notifying handle's address, compared for
/// identity only.
#[derive(Default)]
struct Deferred {
    slots: RefCell<Vec<(usize, *const ())>>,
}

impl Deferred {
    fn mark(&self, index: usize, address: *const ()) {
        let mut slots = self.slots.borrow_mut();
        if !slots.contains(&(index, address)) {
            slots.push((index, address));
        }
    }

    fn take(&self) -> Vec<(usize, *const ())> {
        std::mem::take(&mut *self.slots.borrow_mut())
    }

    fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }
}

/// Rounds of deferred re-shaping per settle; shaping may itself write.
const SETTLE_ROUNDS: usize = 8;

/// Merges deferred notifications once the instance can be borrowed.
///
/// Returns true if the view state was merged. Does nothing while an outer
/// frame still holds the instance; that frame settles on release.
fn settle<P, R: LiveResults>(instance: &RefCell<Instance<P, R>>, deferred: &Deferred) -> bool {
    let mut merged = false;
    for _ in 0..SETTLE_ROUNDS {
        if deferred.is_empty() {
            return merged;
        }
        let Ok(mut inner) = instance.try_borrow_mut() else {
            return merged;
        };
        let pending = deferred.take();
        merged |= inner.refresh(&pending);
    }
    if !deferred.is_empty() {
        tracing::warn!("deferred notifications still pending after settling");
    }
    merged
}

/// A presentation component wrapped with its query lifecycle.
///
/// Created by [`Connected::create`](crate::Connected::create). Dropping a
/// bound component unmounts it.
pub struct BoundComponent<P, R: LiveResults, C> {
    instance: Rc<RefCell<Instance<P, R>>>,
    gate: Rc<RenderGate<P>>,
    deferred: Rc<Deferred>,
    presenter: Rc<C>,
}

impl<P, R, C> BoundComponent<P, R, C>
where
    P: 'static,
    R: LiveResults + 'static,
    C: Presenter<P, R::Item>,
{
    pub(crate) fn new(
        queries: Rc<QuerySet<P, R>>,
        should_update: Option<ShouldUpdate<P>>,
        presenter: Rc<C>,
        trigger: Rc<dyn RenderTrigger>,
    ) -> Self {
        let gate = Rc::new(RenderGate {
            should_update,
            trigger,
        });
        let deferred = Rc::new(Deferred::default());

        let instance = Rc::new_cyclic(|weak: &Weak<RefCell<Instance<P, R>>>| {
            let listeners = (0..queries.len())
                .map(|index| listener(weak.clone(), gate.clone(), deferred.clone(), index))
                .collect();
            RefCell::new(Instance {
                registry: SubscriptionRegistry::new(listeners),
                queries,
                view: None,
                props: None,
                lifecycle: Lifecycle::Uninitialized,
            })
        });

        Self {
            instance,
            gate,
            deferred,
            presenter,
        }
    }

    /// Mount hook: resolves every query and publishes the full view state.
    pub fn mount(&self, props: P) -> Result<()> {
        let mounted = self.instance.borrow_mut().mount(props);
        settle(&self.instance, &self.deferred);
        mounted?;
        self.gate.request(&self.instance);
        Ok(())
    }

    /// Props-change hook: re-resolves queries and merges the keys that changed.
    ///
    /// Returns the number of keys whose handle changed. A re-render is
    /// requested even when none did, since the props themselves changed.
    ///
    /// On `UnresolvedQuery` the failing key keeps its last value but holds no
    /// handle; [`render`](Self::render) returns `None` until a later update
    /// resolves it.
    pub fn update(&self, props: P) -> Result<usize> {
        let updated = self.instance.borrow_mut().update(props);
        settle(&self.instance, &self.deferred);
        let merged = updated?;
        self.gate.request(&self.instance);
        Ok(merged)
    }

    /// Unmount hook: releases every listener. Safe to call repeatedly.
    pub fn unmount(&self) {
        self.instance.borrow_mut().unmount();
        self.deferred.take();
    }

    /// Renders the presenter with props and view state.
    ///
    /// Returns `None` until the component is ready, and after unmount. Writes
    /// the presenter makes to subscribed handles are merged after it returns.
    pub fn render(&self) -> Option<C::Output> {
        let output = self.present();
        if settle(&self.instance, &self.deferred) {
            self.gate.request(&self.instance);
        }
        output
    }

    fn present(&self) -> Option<C::Output> {
        let inner = self.instance.borrow();
        if !inner.is_ready() {
            return None;
        }
        let view = inner.view.as_ref()?;
        let props = inner.props.as_ref()?;
        Some(self.presenter.present(BoundProps::new(props, view)))
    }

    /// Reads the view state, `None` before the first successful mount.
    pub fn with_view<F, O>(&self, f: F) -> Option<O>
    where
        F: FnOnce(&ViewState<R::Item>) -> O,
    {
        self.instance.borrow().view.as_ref().map(f)
    }

    /// Reads the current props, `None` before mount.
    pub fn with_props<F, O>(&self, f: F) -> Option<O>
    where
        F: FnOnce(&P) -> O,
    {
        self.instance.borrow().props.as_ref().map(f)
    }

    /// Returns true while mounted with every query resolved.
    pub fn is_ready(&self) -> bool {
        self.instance.borrow().is_ready()
    }

    /// Returns the lifecycle state.
    pub fn state(&self) -> Lifecycle {
        self.instance.borrow().lifecycle
    }

    /// Returns the view state revision, `None` before the first mount.
    pub fn revision(&self) -> Option<u64> {
        self.with_view(ViewState::revision)
    }

    /// Returns the handle currently held for `key`.
    pub fn held_handle(&self, key: &str) -> Option<Rc<R>> {
        let inner = self.instance.borrow();
        let index = inner.queries.keys().position(key)?;
        inner.registry.held(index).cloned()
    }

    /// Returns the number of handles this instance is subscribed to.
    pub fn subscription_count(&self) -> usize {
        self.instance.borrow().registry.held_count()
    }

    /// Returns the query keys in declaration order.
    pub fn keys(&self) -> Vec<String> {
        self.instance.borrow().queries.keys().names().to_vec()
    }
}

impl<P, R: LiveResults, C> Drop for BoundComponent<P, R, C> {
    fn drop(&mut self) {
        if let Ok(mut inner) = self.instance.try_borrow_mut() {
            inner.unmount();
        }
    }
}

/// Builds the listener for slot `index`.
///
/// Holds the instance weakly so a store outliving the component never keeps
/// it alive.
fn listener<P, R>(
    instance: Weak<RefCell<Instance<P, R>>>,
    gate: Rc<RenderGate<P>>,
    deferred: Rc<Deferred>,
    index: usize,
) -> Listener<R>
where
    P: 'static,
    R: LiveResults + 'static,
{
    Rc::new(move |results: &R, changes: &ChangeSet| {
        let Some(instance) = instance.upgrade() else {
            return;
        };
        let merged = match instance.try_borrow_mut() {
            Ok(mut inner) => inner.on_change(index, results, changes),
            Err(_) => {
                if !changes.is_empty() {
                    notify_event!(slot = index, "deferred notification, instance busy");
                    deferred.mark(index, (results as *const R).cast::<()>());
                }
                false
            }
        };
        let settled = settle(&instance, &deferred);
        if merged || settled {
            gate.request(&instance);
        }
    })
}
