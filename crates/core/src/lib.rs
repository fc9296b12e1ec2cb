//! livebind core - shared value and error types.
//!
//! This crate provides the foundational types used across the livebind
//! workspace:
//!
//! - `Value`: dynamic output of query extractors (scalars, lists, records)
//! - `Error`: configuration and lifecycle errors raised by the binding layer
//!
//! # Example
//!
//! ```rust
//! use livebind_core::{Error, Value};
//!
//! let summary = Value::record([("open", 3i64), ("done", 5i64)]);
//! assert_eq!(summary.field("open").and_then(Value::as_i64), Some(3));
//!
//! let err = Error::unresolved_query("items");
//! assert_eq!(err.key(), Some("items"));
//! ```

mod error;
mod value;

pub use error::{Error, Result};
pub use value::Value;
