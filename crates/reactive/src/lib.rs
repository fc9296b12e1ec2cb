//! livebind reactive - live query results and change notification.
//!
//! This crate defines the interface the binding layer consumes from a
//! live-query engine, plus an in-memory engine implementing it. When a live
//! result set mutates, its listeners are called with the result set and an
//! index-based description of what changed.
//!
//! # Core Concepts
//!
//! - `ChangeSet`: insertion, deletion and modification indices of one write
//! - `LiveResults`: read access plus listener registration on a result set
//! - `Listener` / `ListenerSet`: identity-compared change callbacks
//! - `LiveCollection`: an ordered in-memory result set with batched writes
//! - `ResultCache`: memoized handles so equal parameters share one result set
//!
//! # Example
//!
//! ```rust
//! use livebind_reactive::{ChangeSet, LiveCollection, LiveResults, ResultCache};
//! use std::rc::Rc;
//!
//! let cache: ResultCache<&str, LiveCollection<u32>> = ResultCache::new();
//! let open = cache.get_or_insert_with("open", LiveCollection::new);
//!
//! open.add_listener(Rc::new(|live: &LiveCollection<u32>, changes: &ChangeSet| {
//!     assert!(!changes.is_empty());
//!     assert_eq!(live.get(0), Some(42));
//! }));
//!
//! open.push(42);
//! ```

pub mod cache;
pub mod change_set;
pub mod observable;
pub mod results;
pub mod subscription;

pub use cache::ResultCache;
pub use change_set::ChangeSet;
pub use observable::{LiveCollection, Writer};
pub use results::LiveResults;
pub use subscription::{same_listener, Listener, ListenerSet};
