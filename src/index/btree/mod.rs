//! B+Tree secondary index.
//!
//! # Components
//! - [`OrderedIndex`] - The tree: insert, search, range, delete, stats
//! - [`ValueBucket`] - Record references sharing one key
//! - [`IndexKey`] - Dynamically typed key with a cross-type order
//! - [`IndexStats`] - Diagnostic snapshot of the tree's shape

mod key;
mod node;
mod scan;
mod stats;
mod tree;

pub use key::IndexKey;
pub use node::ValueBucket;
pub use scan::Iter;
pub use stats::IndexStats;
pub use tree::OrderedIndex;
