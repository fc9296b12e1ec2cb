//! Binds presentation components to live query results.
//!
//! A component declares a [`QueryMap`]: one query per key, each resolving the
//! component's props to a live result handle. [`bind`] validates the map and
//! returns a [`Binder`], which wraps presentation components. Every created
//! [`BoundComponent`] resolves its queries when mounted, subscribes to the
//! handles, re-renders when they change, and unsubscribes when unmounted.
//!
//! Queries may be tagged to shape what the component receives:
//!
//! - untagged: every element, as a list
//! - [`unique`]: the first element, or nothing
//! - [`count`]: the number of elements
//! - [`extract`]: whatever a caller-supplied function returns
//!
//! # Example
//!
//! ```
//! use livebind_connect::{bind, count, unique, BoundProps, QueryMap};
//! use livebind_reactive::LiveCollection;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let todos = Rc::new(LiveCollection::from_vec(vec!["write docs"]));
//! let (a, b, c) = (todos.clone(), todos.clone(), todos.clone());
//!
//! let queries = QueryMap::new()
//!     .with("items", move |_: &()| Some(a.clone()))
//!     .with("first", unique(move |_: &()| Some(b.clone())))
//!     .with("total", count(move |_: &()| Some(c.clone())));
//!
//! fn summary(input: BoundProps<'_, (), &'static str>) -> String {
//!     format!(
//!         "{} of {}",
//!         input.unique("first").copied().unwrap_or("nothing"),
//!         input.count("total").unwrap_or(0)
//!     )
//! }
//!
//! let renders = Rc::new(Cell::new(0));
//! let counter = renders.clone();
//! let component = bind(queries, None)
//!     .unwrap()
//!     .wrap(summary)
//!     .create(move || counter.set(counter.get() + 1));
//!
//! assert_eq!(component.render(), None);
//! component.mount(()).unwrap();
//! assert_eq!(component.render().as_deref(), Some("write docs of 1"));
//!
//! // One request per key subscribed to `todos`.
//! todos.push("ship");
//! assert_eq!(renders.get(), 4);
//! assert_eq!(component.render().as_deref(), Some("write docs of 2"));
//!
//! component.unmount();
//! assert_eq!(todos.listener_count(), 0);
//! ```

mod binder;
mod component;
mod modifier;
mod registry;
mod shape;
mod view;

pub use binder::{bind, connect_to_query, Binder, BinderBuilder, Connected, QueryMap, ShouldUpdate};
pub use component::{BoundComponent, Lifecycle, Presenter, RenderTrigger};
pub use modifier::{count, extract, query, unique, Extractor, IntoQuery, QueryDef, ShapingMode};
pub use shape::shape;
pub use view::{BoundProps, Merged, PropSource, ViewState, ViewValue};

pub use livebind_core::{Error, Result, Value};
