//! Binder factory: query maps in, component wrappers out.

use crate::component::{BoundComponent, Presenter, RenderTrigger};
use crate::modifier::{IntoQuery, QueryDef};
use crate::view::KeyIndex;
use hashbrown::HashMap;
use livebind_core::{Error, Result};
use livebind_reactive::LiveResults;
use std::rc::Rc;

/// Predicate consulted with the next props before every re-render.
pub type ShouldUpdate<P> = Rc<dyn Fn(&P) -> bool>;

/// Ordered mapping from query key to query definition.
///
/// # Example
///
/// ```
/// use livebind_connect::{count, QueryMap};
/// use livebind_reactive::LiveCollection;
/// use std::rc::Rc;
///
/// let todos = Rc::new(LiveCollection::from_vec(vec!["a", "b"]));
/// let all = todos.clone();
///
/// let queries = QueryMap::new()
///     .with("todos", move |_: &()| Some(all.clone()))
///     .with("total", count(move |_: &()| Some(todos.clone())));
/// assert_eq!(queries.len(), 2);
/// ```
pub struct QueryMap<P, R> {
    entries: Vec<(String, QueryDef<P, R>)>,
}

impl<P, R> Default for QueryMap<P, R> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<P, R: LiveResults> QueryMap<P, R> {
    /// Creates an empty query map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a query, builder style.
    pub fn with(mut self, key: impl Into<String>, def: impl IntoQuery<P, R>) -> Self {
        self.insert(key, def);
        self
    }

    /// Adds a query.
    pub fn insert(&mut self, key: impl Into<String>, def: impl IntoQuery<P, R>) {
        self.entries.push((key.into(), def.into_query()));
    }

    /// Returns the number of queries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no query was added.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl<P, R, K> FromIterator<(K, QueryDef<P, R>)> for QueryMap<P, R>
where
    K: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, QueryDef<P, R>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, def)| (k.into(), def)).collect(),
        }
    }
}

/// A validated query map: definitions indexed by key position.
pub(crate) struct QuerySet<P, R> {
    keys: Rc<KeyIndex>,
    defs: Vec<QueryDef<P, R>>,
}

impl<P, R: LiveResults> QuerySet<P, R> {
    fn validate(map: QueryMap<P, R>) -> Result<Self> {
        if map.is_empty() {
            return Err(Error::EmptyQueryMap);
        }

        let mut names = Vec::with_capacity(map.len());
        let mut positions = HashMap::with_capacity(map.len());
        let mut defs = Vec::with_capacity(map.len());

        for (key, def) in map.entries {
            if let Some((first, second)) = def.conflict() {
                return Err(Error::conflicting_modifiers(key, first, second));
            }
            if positions.contains_key(&key) {
                return Err(Error::duplicate_key(key));
            }
            positions.insert(key.clone(), names.len());
            names.push(key);
            defs.push(def);
        }

        Ok(Self {
            keys: Rc::new(KeyIndex::new(names, positions)),
            defs,
        })
    }

    #[inline]
    pub(crate) fn keys(&self) -> &Rc<KeyIndex> {
        &self.keys
    }

    #[inline]
    pub(crate) fn def(&self, index: usize) -> &QueryDef<P, R> {
        &self.defs[index]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.defs.len()
    }
}

/// Wrapper generator produced by [`bind`].
///
/// Holds the validated queries and the optional update gate; wrapping a
/// presenter performs no subscription.
pub struct Binder<P, R> {
    queries: Rc<QuerySet<P, R>>,
    should_update: Option<ShouldUpdate<P>>,
}

impl<P, R> Clone for Binder<P, R> {
    fn clone(&self) -> Self {
        Self {
            queries: self.queries.clone(),
            should_update: self.should_update.clone(),
        }
    }
}

impl<P: 'static, R: LiveResults + 'static> Binder<P, R> {
    /// Starts building a binder for `queries`.
    pub fn builder(queries: QueryMap<P, R>) -> BinderBuilder<P, R> {
        BinderBuilder {
            queries,
            should_update: None,
        }
    }

    /// Wraps a presentation component.
    pub fn wrap<C>(&self, presenter: C) -> Connected<P, R, C>
    where
        C: Presenter<P, R::Item>,
    {
        Connected {
            queries: self.queries.clone(),
            should_update: self.should_update.clone(),
            presenter: Rc::new(presenter),
        }
    }

    /// Returns the query keys in declaration order.
    pub fn keys(&self) -> &[String] {
        self.queries.keys().names()
    }
}

/// Builder for [`Binder`].
pub struct BinderBuilder<P, R> {
    queries: QueryMap<P, R>,
    should_update: Option<ShouldUpdate<P>>,
}

impl<P: 'static, R: LiveResults + 'static> BinderBuilder<P, R> {
    /// Sets the predicate consulted with the next props before re-rendering.
    pub fn should_update<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&P) -> bool + 'static,
    {
        self.should_update = Some(Rc::new(predicate));
        self
    }

    /// Validates the query map and creates the binder.
    pub fn build(self) -> Result<Binder<P, R>> {
        bind(self.queries, self.should_update)
    }
}

/// Creates a wrapper generator for `queries`.
///
/// Fails if the map is empty, declares a key twice, or tags a query with
/// conflicting modifiers.
pub fn bind<P, R>(queries: QueryMap<P, R>, should_update: Option<ShouldUpdate<P>>) -> Result<Binder<P, R>>
where
    P: 'static,
    R: LiveResults + 'static,
{
    let queries = QuerySet::validate(queries)?;
    tracing::debug!(
        queries = queries.len(),
        gated = should_update.is_some(),
        "bound query map"
    );
    Ok(Binder {
        queries: Rc::new(queries),
        should_update,
    })
}

/// Alias of [`bind`].
pub fn connect_to_query<P, R>(
    queries: QueryMap<P, R>,
    should_update: Option<ShouldUpdate<P>>,
) -> Result<Binder<P, R>>
where
    P: 'static,
    R: LiveResults + 'static,
{
    bind(queries, should_update)
}

/// A presenter wrapped with its queries; creates component instances.
pub struct Connected<P, R, C> {
    queries: Rc<QuerySet<P, R>>,
    should_update: Option<ShouldUpdate<P>>,
    presenter: Rc<C>,
}

impl<P, R, C> Clone for Connected<P, R, C> {
    fn clone(&self) -> Self {
        Self {
            queries: self.queries.clone(),
            should_update: self.should_update.clone(),
            presenter: self.presenter.clone(),
        }
    }
}

impl<P, R, C> Connected<P, R, C>
where
    P: 'static,
    R: LiveResults + 'static,
    C: Presenter<P, R::Item>,
{
    /// Creates an unmounted instance that requests re-renders via `trigger`.
    pub fn create<H>(&self, trigger: H) -> BoundComponent<P, R, C>
    where
        H: RenderTrigger + 'static,
    {
        BoundComponent::new(
            self.queries.clone(),
            self.should_update.clone(),
            self.presenter.clone(),
            Rc::new(trigger),
        )
    }
}
