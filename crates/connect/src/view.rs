//! View state and the input handed to presentation components.

use hashbrown::HashMap;
use livebind_core::Value;
use std::collections::BTreeMap;
use std::rc::Rc;

/// A shaped, presentation-ready query result.
#[derive(Clone, Debug, PartialEq)]
pub enum ViewValue<T> {
    /// Snapshot of every element (default mode).
    List(Vec<T>),
    /// First element, or `None` for empty results.
    Unique(Option<T>),
    /// Number of elements.
    Count(usize),
    /// Extractor output.
    Extracted(Value),
}

impl<T> ViewValue<T> {
    /// Returns the elements of a list value.
    pub fn as_list(&self) -> Option<&[T]> {
        match self {
            ViewValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Returns the element of a unique value.
    ///
    /// `Some(None)` means the query is unique but matched nothing.
    pub fn as_unique(&self) -> Option<Option<&T>> {
        match self {
            ViewValue::Unique(item) => Some(item.as_ref()),
            _ => None,
        }
    }

    /// Returns the cardinality of a count value.
    pub fn as_count(&self) -> Option<usize> {
        match self {
            ViewValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the output of an extracted value.
    pub fn as_extracted(&self) -> Option<&Value> {
        match self {
            ViewValue::Extracted(v) => Some(v),
            _ => None,
        }
    }
}

/// Query keys in declaration order, with a name → position index.
#[derive(Debug)]
pub(crate) struct KeyIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl KeyIndex {
    pub(crate) fn new(names: Vec<String>, positions: HashMap<String, usize>) -> Self {
        Self { names, positions }
    }

    #[inline]
    pub(crate) fn position(&self, key: &str) -> Option<usize> {
        self.positions.get(key).copied()
    }

    #[inline]
    pub(crate) fn name(&self, index: usize) -> &str {
        &self.names[index]
    }

    #[inline]
    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.names.len()
    }
}

/// Shaped results for every query key of a mounted component.
///
/// Only exists once initial resolution has completed; a component without
/// view state renders nothing.
#[derive(Debug)]
pub struct ViewState<T> {
    keys: Rc<KeyIndex>,
    values: Vec<ViewValue<T>>,
    revision: u64,
}

impl<T> ViewState<T> {
    /// Creates the initial state; `values` holds one entry per key, in key order.
    pub(crate) fn new(keys: Rc<KeyIndex>, values: Vec<ViewValue<T>>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self {
            keys,
            values,
            revision: 1,
        }
    }

    /// Merges a partial update. Each entry is `(key position, value)`.
    pub(crate) fn merge(&mut self, patch: Vec<(usize, ViewValue<T>)>) {
        for (index, value) in patch {
            self.values[index] = value;
        }
        self.revision += 1;
    }

    /// Returns the value for a query key.
    pub fn get(&self, key: &str) -> Option<&ViewValue<T>> {
        self.keys.position(key).map(|i| &self.values[i])
    }

    /// Returns true if `key` is one of the query keys.
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.position(key).is_some()
    }

    /// Iterates `(key, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ViewValue<T>)> {
        self.keys
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    /// Returns the query keys in declaration order.
    pub fn keys(&self) -> &[String] {
        self.keys.names()
    }

    /// Returns the number of query keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if there are no query keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of state merges so far, starting at 1 for the initial one.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

/// Named access to a component's own props.
///
/// Needed only for [`BoundProps::lookup`], which merges props and view state
/// under one namespace.
pub trait PropSource {
    /// Returns the prop called `name`.
    fn prop(&self, name: &str) -> Option<Value>;
}

impl PropSource for () {
    fn prop(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl PropSource for BTreeMap<String, Value> {
    fn prop(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl PropSource for HashMap<String, Value> {
    fn prop(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// Result of a merged lookup through [`BoundProps::lookup`].
#[derive(Clone, Debug, PartialEq)]
pub enum Merged<'a, T> {
    /// The name is a query key.
    View(&'a ViewValue<T>),
    /// The name is only a prop.
    Prop(Value),
}

/// Input delivered to a presentation component: its props plus view state.
pub struct BoundProps<'a, P, T> {
    props: &'a P,
    view: &'a ViewState<T>,
}

impl<P, T> Clone for BoundProps<'_, P, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, T> Copy for BoundProps<'_, P, T> {}

impl<'a, P, T> BoundProps<'a, P, T> {
    pub(crate) fn new(props: &'a P, view: &'a ViewState<T>) -> Self {
        Self { props, view }
    }

    /// Returns the component's own props.
    #[inline]
    pub fn props(&self) -> &'a P {
        self.props
    }

    /// Returns the view state.
    #[inline]
    pub fn view(&self) -> &'a ViewState<T> {
        self.view
    }

    /// Returns the view value for a query key.
    pub fn get(&self, key: &str) -> Option<&'a ViewValue<T>> {
        self.view.get(key)
    }

    /// Returns the elements of a list query.
    pub fn list(&self, key: &str) -> Option<&'a [T]> {
        self.view.get(key).and_then(ViewValue::as_list)
    }

    /// Returns the element of a unique query, `None` if it matched nothing.
    pub fn unique(&self, key: &str) -> Option<&'a T> {
        self.view
            .get(key)
            .and_then(ViewValue::as_unique)
            .flatten()
    }

    /// Returns the cardinality of a count query.
    pub fn count(&self, key: &str) -> Option<usize> {
        self.view.get(key).and_then(ViewValue::as_count)
    }

    /// Returns the output of an extract query.
    pub fn extracted(&self, key: &str) -> Option<&'a Value> {
        self.view.get(key).and_then(ViewValue::as_extracted)
    }
}

impl<'a, P: PropSource, T> BoundProps<'a, P, T> {
    /// Looks a name up in the merged namespace.
    ///
    /// Query keys shadow props of the same name.
    pub fn lookup(&self, name: &str) -> Option<Merged<'a, T>> {
        match self.view.get(name) {
            Some(value) => Some(Merged::View(value)),
            None => self.props.prop(name).map(Merged::Prop),
        }
    }
}
