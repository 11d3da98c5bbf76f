//! Index structures.
//!
//! The storage engine keeps one [`OrderedIndex`] per indexed column and
//! consults it for `=`, `<`, `>`, `BETWEEN` predicates instead of scanning the
//! table:
//!
//! ```text
//! Storage Engine ──insert/delete on row mutation──▶ OrderedIndex
//! Query Executor ──equality / range lookup──▶ OrderedIndex ──▶ record refs
//! ```
//!
//! Values stored in an index are opaque record references; the index returns
//! them verbatim and never reads the table itself.

pub mod btree;
mod shared;

pub use btree::{IndexKey, IndexStats, OrderedIndex, ValueBucket};
pub use shared::SharedIndex;
