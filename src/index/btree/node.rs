//! B+Tree node types.
//!
//! A node is either a [`LeafNode`] holding keys and their value buckets, or an
//! [`InternalNode`] holding separator keys and owned children. Children are
//! plain owned values: no parent pointers, no sibling links, no sharing.
//!
//! # Routing Convention
//! ```text
//!              keys:   [ 10 | 20 ]
//!                     /     |     \
//!   children:  (-inf,10)  [10,20)  [20,+inf)
//! ```
//! A key equal to a separator lives in the child to the separator's right,
//! because leaf splits copy the right half's first key up into the parent.

use std::slice;

use tracing::{trace, warn};

/// Record references that share one key.
///
/// Non-unique index columns map many rows to one key; unique columns simply
/// end up with single-element buckets. A bucket stored in a leaf is never
/// empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueBucket<V> {
    values: Vec<V>,
}

impl<V> ValueBucket<V> {
    /// Create a bucket holding one reference.
    pub fn single(value: V) -> Self {
        Self {
            values: vec![value],
        }
    }

    /// Append a reference.
    #[inline]
    pub fn push(&mut self, value: V) {
        self.values.push(value);
    }

    /// Number of references in the bucket.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bucket holds no references.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View the references in insertion order.
    #[inline]
    pub fn as_slice(&self) -> &[V] {
        &self.values
    }

    /// Iterate the references in insertion order.
    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, V> {
        self.values.iter()
    }
}

impl<V: PartialEq> ValueBucket<V> {
    /// Remove the first reference equal to `value`.
    ///
    /// Returns `true` if one was removed.
    pub fn remove(&mut self, value: &V) -> bool {
        match self.values.iter().position(|v| v == value) {
            Some(pos) => {
                self.values.remove(pos);
                true
            }
            None => false,
        }
    }
}

/// Leaf node: sorted keys, each aligned with its bucket.
#[derive(Debug, Clone)]
pub(crate) struct LeafNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) values: Vec<ValueBucket<V>>,
}

/// Internal node: `keys.len() + 1` children routed by separator keys.
#[derive(Debug, Clone)]
pub(crate) struct InternalNode<K, V> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<Node<K, V>>,
}

#[derive(Debug, Clone)]
pub(crate) enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K, V>),
}

/// Index of the child whose interval covers `key`.
///
/// An exact match on a separator routes right.
#[inline]
pub(crate) fn child_index<K: Ord>(keys: &[K], key: &K) -> usize {
    match keys.binary_search(key) {
        Ok(i) => i + 1,
        Err(i) => i,
    }
}

impl<K, V> Node<K, V> {
    /// A fresh empty leaf (initial root, and the root after `clear`).
    pub(crate) fn empty_leaf() -> Self {
        Node::Leaf(LeafNode::new())
    }

    /// Separator keys for internal nodes, stored keys for leaves.
    #[inline]
    pub(crate) fn keys(&self) -> &[K] {
        match self {
            Node::Leaf(leaf) => &leaf.keys,
            Node::Internal(internal) => &internal.keys,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys().len()
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Whether the node must be split before anything is inserted below it.
    #[inline]
    pub(crate) fn is_full(&self, order: usize) -> bool {
        self.len() >= order
    }
}

impl<K, V> LeafNode<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            keys: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<K: Ord, V> LeafNode<K, V> {
    /// Insert `value` under `key`, appending to the bucket if the key exists.
    pub(crate) fn insert(&mut self, key: K, value: V) {
        match self.keys.binary_search(&key) {
            Ok(i) => self.values[i].push(value),
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, ValueBucket::single(value));
            }
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<&ValueBucket<V>> {
        self.keys
            .binary_search(key)
            .ok()
            .map(|i| &self.values[i])
    }

    /// Remove `key` and its whole bucket.
    pub(crate) fn remove(&mut self, key: &K) -> Option<ValueBucket<V>> {
        let i = self.keys.binary_search(key).ok()?;
        self.keys.remove(i);
        Some(self.values.remove(i))
    }
}

impl<K: Ord, V: PartialEq> LeafNode<K, V> {
    /// Remove one reference from `key`'s bucket, dropping the key once the
    /// bucket is empty.
    pub(crate) fn remove_value(&mut self, key: &K, value: &V) -> bool {
        let Ok(i) = self.keys.binary_search(key) else {
            return false;
        };

        if !self.values[i].remove(value) {
            return false;
        }

        if self.values[i].is_empty() {
            self.keys.remove(i);
            self.values.remove(i);
        }
        true
    }
}

impl<K: Ord + Clone, V> InternalNode<K, V> {
    /// Wrap a full root so it can be split from above.
    pub(crate) fn new_root(old_root: Node<K, V>) -> Self {
        Self {
            keys: Vec::new(),
            children: vec![old_root],
        }
    }

    /// Child index covering `key`, clamped to the last child.
    ///
    /// The clamp is unreachable while `children.len() == keys.len() + 1`;
    /// debug builds assert instead of recovering.
    pub(crate) fn covering_child(&self, key: &K) -> usize {
        let i = child_index(&self.keys, key);
        let last = self.children.len().saturating_sub(1);

        debug_assert!(
            i <= last,
            "child index {} out of range for {} children",
            i,
            self.children.len()
        );

        if i > last {
            warn!(
                target: "sawitdb::btree",
                index = i,
                children = self.children.len(),
                "child index out of range, clamping to last child"
            );
            return last;
        }
        i
    }

    /// Split the full child at `index` around `order / 2`.
    ///
    /// - Leaf: the right half moves to a new sibling and its first key is
    ///   *copied* up as the separator.
    /// - Internal: the middle key is *moved* up; keys after it and children
    ///   from `mid + 1` go to the sibling.
    ///
    /// The sibling is placed at `index + 1`, the separator at `keys[index]`.
    pub(crate) fn split_child(&mut self, index: usize, order: usize) {
        let mid = order / 2;

        let (separator, sibling) = match &mut self.children[index] {
            Node::Leaf(leaf) => {
                debug_assert!(leaf.keys.len() > mid, "splitting a leaf that is not full");

                let keys = leaf.keys.split_off(mid);
                let values = leaf.values.split_off(mid);
                let separator = keys[0].clone();

                (separator, Node::Leaf(LeafNode { keys, values }))
            }
            Node::Internal(internal) => {
                debug_assert!(
                    internal.keys.len() > mid,
                    "splitting an internal node that is not full"
                );

                let mut keys = internal.keys.split_off(mid);
                let pivot = keys.remove(0);
                let children = internal.children.split_off(mid + 1);

                (pivot, Node::Internal(InternalNode { keys, children }))
            }
        };

        trace!(
            target: "sawitdb::btree",
            index,
            leaf = sibling.is_leaf(),
            right_keys = sibling.len(),
            "split child"
        );

        self.keys.insert(index, separator);
        self.children.insert(index + 1, sibling);
    }
}
