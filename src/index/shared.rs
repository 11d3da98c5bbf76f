//! Thread-safe handle to an ordered index.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{IndexConfig, Result};
use crate::index::btree::{IndexStats, OrderedIndex};

/// A cloneable, lock-protected [`OrderedIndex`].
///
/// A split rewrites several nodes in one step, so readers must never run
/// alongside a writer. `SharedIndex` wraps the tree in a reader–writer lock:
///
/// | Operation | Lock |
/// |---|---|
/// | `search`, `range`, `all`, `stats`, `validate` | shared |
/// | `insert`, `delete`, `delete_value`, `clear` | exclusive |
///
/// Every method takes the lock for exactly one call. For several reads that
/// must see the same tree, hold [`SharedIndex::read`] instead.
///
/// # Example
/// ```
/// use sawitdb::index::SharedIndex;
/// use std::thread;
///
/// let index = SharedIndex::new(8).unwrap();
/// index.insert(1, "row-1");
///
/// let reader = index.clone();
/// let handle = thread::spawn(move || reader.search(&1));
/// assert_eq!(handle.join().unwrap(), vec!["row-1"]);
/// ```
pub struct SharedIndex<K, V> {
    inner: Arc<RwLock<OrderedIndex<K, V>>>,
}

impl<K, V> Clone for SharedIndex<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K: Ord + Clone, V> SharedIndex<K, V> {
    /// Create a shared, unnamed index.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `order < 2`.
    pub fn new(order: usize) -> Result<Self> {
        Ok(Self::from_index(OrderedIndex::new(order)?))
    }

    /// Create a shared index from a configuration.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `config.order < 2`.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        Ok(Self::from_index(OrderedIndex::with_config(config)?))
    }

    /// Wrap an existing index.
    pub fn from_index(index: OrderedIndex<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }

    // ========================================================================
    // Exclusive operations
    // ========================================================================

    /// Insert `value` under `key` (exclusive lock).
    pub fn insert(&self, key: K, value: V) {
        self.inner.write().insert(key, value);
    }

    /// Remove `key` and its whole bucket (exclusive lock).
    pub fn delete(&self, key: &K) -> bool {
        self.inner.write().delete(key)
    }

    /// Remove one reference from `key`'s bucket (exclusive lock).
    pub fn delete_value(&self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.inner.write().delete_value(key, value)
    }

    /// Drop every entry (exclusive lock).
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    // ========================================================================
    // Shared operations
    // ========================================================================

    /// References stored under `key` (shared lock).
    pub fn search(&self, key: &K) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().search(key)
    }

    /// References for keys in `[min, max]` (shared lock).
    pub fn range(&self, min: &K, max: &K) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().range(min, max)
    }

    /// Every reference in key order (shared lock).
    pub fn all(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.inner.read().all()
    }

    /// Statistics snapshot (shared lock).
    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    /// Check the tree's structural invariants (shared lock).
    ///
    /// # Errors
    /// Returns `Error::Corrupted` if an invariant does not hold.
    pub fn validate(&self) -> Result<()> {
        self.inner.read().validate()
    }

    // ========================================================================
    // Guards
    // ========================================================================

    /// Hold the shared lock across several reads.
    pub fn read(&self) -> RwLockReadGuard<'_, OrderedIndex<K, V>> {
        self.inner.read()
    }

    /// Hold the exclusive lock across several writes (e.g. a bulk load).
    pub fn write(&self) -> RwLockWriteGuard<'_, OrderedIndex<K, V>> {
        self.inner.write()
    }
}
