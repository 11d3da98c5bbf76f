//! The ordered index: construction, insertion, deletion and reset.
//!
//! Lookups live in `scan.rs`, statistics and validation in `stats.rs`.

use std::mem;

use tracing::{debug, trace};

use crate::common::config::{IndexConfig, DEFAULT_ORDER};
use crate::common::Result;
use crate::index::btree::node::{InternalNode, LeafNode, Node};

/// An in-memory B+Tree mapping column values to record references.
///
/// # Architecture
/// ```text
///                    ┌──────────────┐
///                    │   [ 15 ]     │   internal: routing keys only
///                    └──┬────────┬──┘
///               ┌───────┘        └───────┐
///        ┌──────▼──────┐          ┌──────▼──────┐
///        │ 1 | 5 | 10  │          │ 15 | 20 | 25│   leaves: keys + buckets
///        └─────────────┘          └─────────────┘
/// ```
///
/// - Every key is stored in exactly one leaf; internal keys are copies used
///   for routing.
/// - Full nodes are split on the way down, so an insert never has to walk
///   back up the tree.
/// - Deletion removes keys from leaves and never merges. Sparse leaves are a
///   known cost of that simplification.
///
/// # Thread Safety
/// Mutation takes `&mut self`, so a single `OrderedIndex` can't be modified
/// while it is being read. Use [`crate::index::SharedIndex`] to share one
/// between threads.
///
/// # Example
/// ```
/// use sawitdb::index::OrderedIndex;
///
/// let mut index = OrderedIndex::new(4).unwrap();
/// for key in [10, 20, 5, 15, 25, 1] {
///     index.insert(key, key);
/// }
///
/// assert_eq!(index.search(&15), vec![15]);
/// assert_eq!(index.range(&5, &20), vec![5, 10, 15, 20]);
/// assert!(index.delete(&15));
/// assert!(index.search(&15).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct OrderedIndex<K, V> {
    /// Root node, initially an empty leaf.
    pub(crate) root: Node<K, V>,

    /// Maximum keys per node before a split is forced.
    pub(crate) order: usize,

    /// Index name (opaque label).
    pub(crate) name: Option<String>,

    /// Indexed column (opaque label).
    pub(crate) key_field: Option<String>,
}

impl<K: Ord + Clone, V> OrderedIndex<K, V> {
    /// Create an unnamed index with the given order.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `order < 2`.
    pub fn new(order: usize) -> Result<Self> {
        Self::with_config(IndexConfig::new().with_order(order))
    }

    /// Create an index from a full configuration.
    ///
    /// # Errors
    /// Returns `Error::InvalidOrder` if `config.order < 2`.
    pub fn with_config(config: IndexConfig) -> Result<Self> {
        config.validate()?;

        debug!(
            target: "sawitdb::btree",
            name = ?config.name,
            key_field = ?config.key_field,
            order = config.order,
            "created ordered index"
        );

        Ok(Self {
            root: Node::empty_leaf(),
            order: config.order,
            name: config.name,
            key_field: config.key_field,
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Configured maximum keys per node.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Index name, if one was configured.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Indexed column, if one was configured.
    pub fn key_field(&self) -> Option<&str> {
        self.key_field.as_deref()
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert `value` under `key`.
    ///
    /// Inserting an existing key appends `value` to that key's bucket, so a
    /// non-unique column can index every row that shares a value.
    pub fn insert(&mut self, key: K, value: V) {
        if self.root.is_full(self.order) {
            let old_root = mem::replace(&mut self.root, Node::empty_leaf());
            let mut new_root = InternalNode::new_root(old_root);
            new_root.split_child(0, self.order);
            self.root = Node::Internal(new_root);

            trace!(target: "sawitdb::btree", "root split, tree grew one level");
        }

        Self::insert_non_full(&mut self.root, key, value, self.order);
    }

    /// Insert into a subtree whose root is known not to be full.
    fn insert_non_full(node: &mut Node<K, V>, key: K, value: V, order: usize) {
        match node {
            Node::Leaf(leaf) => leaf.insert(key, value),
            Node::Internal(internal) => {
                let mut i = internal.covering_child(&key);

                if internal.children[i].is_full(order) {
                    internal.split_child(i, order);
                    // The promoted separator may now route `key` to the new sibling.
                    if internal.keys[i] <= key {
                        i += 1;
                    }
                }

                Self::insert_non_full(&mut internal.children[i], key, value, order);
            }
        }
    }

    // ========================================================================
    // Deletion
    // ========================================================================

    /// Remove `key` and every reference stored under it.
    ///
    /// Returns `false` if the key was absent. Separator copies of the key in
    /// internal nodes are left in place; they stay valid routing bounds.
    pub fn delete(&mut self, key: &K) -> bool {
        let removed = self.leaf_mut(key).remove(key).is_some();
        self.collapse_root();
        removed
    }

    /// Remove a single reference from `key`'s bucket.
    ///
    /// The key itself disappears once its last reference is removed. Returns
    /// `false` if the key or the reference was absent.
    pub fn delete_value(&mut self, key: &K, value: &V) -> bool
    where
        V: PartialEq,
    {
        let removed = self.leaf_mut(key).remove_value(key, value);
        self.collapse_root();
        removed
    }

    /// Promote the sole child of a keyless internal root.
    fn collapse_root(&mut self) {
        while matches!(&self.root, Node::Internal(internal) if internal.keys.is_empty()) {
            let old_root = mem::replace(&mut self.root, Node::empty_leaf());
            if let Node::Internal(mut internal) = old_root {
                if let Some(child) = internal.children.pop() {
                    self.root = child;
                }
            }
            trace!(target: "sawitdb::btree", "root collapsed, tree shrank one level");
        }
    }

    /// Descend to the leaf whose interval covers `key`.
    fn leaf_mut(&mut self, key: &K) -> &mut LeafNode<K, V> {
        let mut node = &mut self.root;
        loop {
            match node {
                Node::Leaf(leaf) => return leaf,
                Node::Internal(internal) => {
                    let i = internal.covering_child(key);
                    node = &mut internal.children[i];
                }
            }
        }
    }

    // ========================================================================
    // Reset
    // ========================================================================

    /// Drop every entry, leaving a single empty leaf root.
    pub fn clear(&mut self) {
        self.root = Node::empty_leaf();
        debug!(target: "sawitdb::btree", name = ?self.name, "cleared ordered index");
    }
}

impl<K: Ord + Clone, V> Default for OrderedIndex<K, V> {
    fn default() -> Self {
        Self {
            root: Node::empty_leaf(),
            order: DEFAULT_ORDER,
            name: None,
            key_field: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Error;

    fn depth<K, V>(node: &Node<K, V>) -> usize {
        match node {
            Node::Leaf(_) => 0,
            Node::Internal(internal) => 1 + depth(&internal.children[0]),
        }
    }

    #[test]
    fn test_new_rejects_small_order() {
        match OrderedIndex::<i32, i32>::new(1) {
            Err(Error::InvalidOrder { order: 1, min: 2 }) => {}
            other => panic!("expected InvalidOrder, got {:?}", other.map(|_| ())),
        }
        assert!(OrderedIndex::<i32, i32>::new(0).is_err());
        assert!(OrderedIndex::<i32, i32>::new(2).is_ok());
    }

    #[test]
    fn test_with_config_keeps_labels() {
        let config = IndexConfig::new()
            .with_name("idx_users_umur")
            .with_key_field("umur")
            .with_order(8);
        let index = OrderedIndex::<i64, u64>::with_config(config).unwrap();

        assert_eq!(index.name(), Some("idx_users_umur"));
        assert_eq!(index.key_field(), Some("umur"));
        assert_eq!(index.order(), 8);
    }

    #[test]
    fn test_default_index() {
        let index = OrderedIndex::<i32, i32>::default();
        assert_eq!(index.order(), DEFAULT_ORDER);
        assert!(index.root.is_leaf());
        assert!(index.name().is_none());
    }

    #[test]
    fn test_root_split_on_full_root() {
        let mut index = OrderedIndex::new(4).unwrap();
        for key in [10, 20, 5, 15] {
            index.insert(key, key);
        }
        // Four keys fit in the root leaf; the next insert splits it first.
        assert!(index.root.is_leaf());

        index.insert(25, 25);
        match &index.root {
            Node::Internal(root) => {
                assert_eq!(root.keys, vec![15]);
                assert_eq!(root.children[0].keys(), &[5, 10]);
                assert_eq!(root.children[1].keys(), &[15, 20, 25]);
            }
            Node::Leaf(_) => panic!("root should have split"),
        }
    }

    #[test]
    fn test_insert_after_split_goes_right_of_equal_separator() {
        let mut index = OrderedIndex::new(2).unwrap();
        index.insert(1, "a");
        index.insert(2, "b");
        index.insert(2, "b2");

        // Root split on the third insert with separator 2; the duplicate
        // must land in the same leaf as the first insert.
        assert_eq!(index.search(&2), vec!["b", "b2"]);
        index.validate().unwrap();
    }

    #[test]
    fn test_tree_stays_balanced() {
        let mut index = OrderedIndex::new(3).unwrap();
        for key in 0..500 {
            index.insert(key, key);
        }
        assert!(depth(&index.root) >= 3);
        index.validate().unwrap();
    }

    #[test]
    fn test_delete_absent_key() {
        let mut index = OrderedIndex::new(4).unwrap();
        assert!(!index.delete(&1));

        index.insert(1, 1);
        assert!(!index.delete(&2));
        assert!(index.delete(&1));
        assert!(!index.delete(&1));
    }

    #[test]
    fn test_delete_separator_key() {
        let mut index = OrderedIndex::new(4).unwrap();
        for key in [10, 20, 5, 15, 25] {
            index.insert(key, key);
        }

        // 15 is both the root separator and the first key of the right leaf.
        assert!(index.delete(&15));
        assert!(index.search(&15).is_empty());
        assert_eq!(index.search(&20), vec![20]);
        index.validate().unwrap();
    }

    #[test]
    fn test_delete_value_keeps_siblings() {
        let mut index = OrderedIndex::new(4).unwrap();
        index.insert("ayu", 1u64);
        index.insert("ayu", 2u64);
        index.insert("budi", 3u64);

        assert!(index.delete_value(&"ayu", &1));
        assert_eq!(index.search(&"ayu"), vec![2]);

        assert!(!index.delete_value(&"ayu", &1));
        assert!(index.delete_value(&"ayu", &2));
        assert!(index.search(&"ayu").is_empty());
        assert_eq!(index.search(&"budi"), vec![3]);
    }

    #[test]
    fn test_collapse_keyless_root() {
        let mut index: OrderedIndex<i32, i32> = OrderedIndex::new(4).unwrap();
        let mut only_child = LeafNode::new();
        only_child.insert(7, 7);
        index.root = Node::Internal(InternalNode::new_root(Node::Leaf(only_child)));

        assert!(!index.delete(&99));
        assert!(index.root.is_leaf());
        assert_eq!(index.search(&7), vec![7]);
    }

    #[test]
    fn test_clear_resets_root() {
        let mut index = OrderedIndex::new(2).unwrap();
        for key in 0..20 {
            index.insert(key, key);
        }
        assert!(!index.root.is_leaf());

        index.clear();
        assert!(index.root.is_leaf());
        assert!(index.all().is_empty());

        index.insert(1, 1);
        assert_eq!(index.search(&1), vec![1]);
    }
}
