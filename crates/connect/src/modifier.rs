//! Query definitions and result modifiers.
//!
//! A query definition turns component props into a live result handle. The
//! modifiers [`unique`], [`count`] and [`extract`] choose how that handle is
//! shaped into a view value. An untagged definition yields a list.

use livebind_core::Value;
use livebind_reactive::LiveResults;
use std::fmt;
use std::rc::Rc;

/// Function that derives a custom view value from live results.
pub type Extractor<R> = Rc<dyn Fn(&R) -> Value>;

/// How live results are shaped into a view value.
pub enum ShapingMode<R> {
    /// A fixed snapshot of every element (the default).
    List,
    /// The first element, or nothing when the results are empty.
    Unique,
    /// The number of elements.
    Count,
    /// Whatever the extractor returns.
    Extract(Extractor<R>),
}

impl<R> ShapingMode<R> {
    /// Returns the modifier name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            ShapingMode::List => "list",
            ShapingMode::Unique => "unique",
            ShapingMode::Count => "count",
            ShapingMode::Extract(_) => "extract",
        }
    }

    /// Returns true for the untagged default.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, ShapingMode::List)
    }
}

impl<R> Clone for ShapingMode<R> {
    fn clone(&self) -> Self {
        match self {
            ShapingMode::List => ShapingMode::List,
            ShapingMode::Unique => ShapingMode::Unique,
            ShapingMode::Count => ShapingMode::Count,
            ShapingMode::Extract(f) => ShapingMode::Extract(f.clone()),
        }
    }
}

impl<R> fmt::Debug for ShapingMode<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named query's definition: how to obtain a handle, and how to shape it.
pub struct QueryDef<P, R> {
    resolve: Rc<dyn Fn(&P) -> Option<Rc<R>>>,
    mode: ShapingMode<R>,
    /// First conflicting pair of modifiers applied, if any.
    conflict: Option<(&'static str, &'static str)>,
}

impl<P, R> Clone for QueryDef<P, R> {
    fn clone(&self) -> Self {
        Self {
            resolve: self.resolve.clone(),
            mode: self.mode.clone(),
            conflict: self.conflict,
        }
    }
}

impl<P, R> fmt::Debug for QueryDef<P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryDef")
            .field("mode", &self.mode)
            .field("conflict", &self.conflict)
            .finish_non_exhaustive()
    }
}

impl<P, R: LiveResults> QueryDef<P, R> {
    /// Creates an untagged definition.
    ///
    /// Returning `None` means the query could not be resolved for the given
    /// props, which the binding layer treats as a configuration error.
    pub fn new<F>(resolve: F) -> Self
    where
        F: Fn(&P) -> Option<Rc<R>> + 'static,
    {
        Self {
            resolve: Rc::new(resolve),
            mode: ShapingMode::List,
            conflict: None,
        }
    }

    /// Evaluates the definition against props.
    pub fn resolve(&self, props: &P) -> Option<Rc<R>> {
        (self.resolve)(props)
    }

    /// Returns the shaping mode.
    #[inline]
    pub fn mode(&self) -> &ShapingMode<R> {
        &self.mode
    }

    /// Returns the conflicting modifier pair, if more than one was applied.
    #[inline]
    pub fn conflict(&self) -> Option<(&'static str, &'static str)> {
        self.conflict
    }

    /// Tags the definition with a shaping mode.
    ///
    /// Re-applying `unique` or `count` is a no-op. Any other combination keeps
    /// the first mode and records the conflict so binding can reject it.
    fn tag(mut self, mode: ShapingMode<R>) -> Self {
        let repeat = matches!(
            (&self.mode, &mode),
            (ShapingMode::Unique, ShapingMode::Unique) | (ShapingMode::Count, ShapingMode::Count)
        );
        if self.mode.is_list() {
            self.mode = mode;
        } else if !repeat && self.conflict.is_none() {
            self.conflict = Some((self.mode.name(), mode.name()));
        }
        self
    }
}

/// Conversion into a [`QueryDef`].
///
/// Implemented for definitions themselves and for plain resolver functions,
/// so modifiers accept either.
pub trait IntoQuery<P, R> {
    /// Converts into a query definition.
    fn into_query(self) -> QueryDef<P, R>;
}

impl<P, R> IntoQuery<P, R> for QueryDef<P, R> {
    fn into_query(self) -> QueryDef<P, R> {
        self
    }
}

impl<P, R, F> IntoQuery<P, R> for F
where
    R: LiveResults,
    F: Fn(&P) -> Option<Rc<R>> + 'static,
{
    fn into_query(self) -> QueryDef<P, R> {
        QueryDef::new(self)
    }
}

/// Creates an untagged (list) query definition.
pub fn query<P, R, F>(resolve: F) -> QueryDef<P, R>
where
    R: LiveResults,
    F: Fn(&P) -> Option<Rc<R>> + 'static,
{
    QueryDef::new(resolve)
}

/// Marks a query as unique: the view value is the first result or nothing.
pub fn unique<P, R: LiveResults>(def: impl IntoQuery<P, R>) -> QueryDef<P, R> {
    def.into_query().tag(ShapingMode::Unique)
}

/// Marks a query as count: the view value is the number of results.
pub fn count<P, R: LiveResults>(def: impl IntoQuery<P, R>) -> QueryDef<P, R> {
    def.into_query().tag(ShapingMode::Count)
}

/// Attaches an extractor: the view value is whatever `extractor` returns.
pub fn extract<P, R, F, V>(def: impl IntoQuery<P, R>, extractor: F) -> QueryDef<P, R>
where
    R: LiveResults,
    F: Fn(&R) -> V + 'static,
    V: Into<Value>,
{
    let extractor: Extractor<R> = Rc::new(move |results: &R| extractor(results).into());
    def.into_query().tag(ShapingMode::Extract(extractor))
}
