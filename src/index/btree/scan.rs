//! Read paths: point lookup, range lookup and full scans.

use std::iter::Zip;
use std::slice;

use crate::index::btree::node::{child_index, LeafNode, Node, ValueBucket};
use crate::index::btree::tree::OrderedIndex;

impl<K: Ord + Clone, V> OrderedIndex<K, V> {
    /// All references stored under `key`, in insertion order.
    ///
    /// An absent key yields an empty vector, never an error.
    pub fn search(&self, key: &K) -> Vec<V>
    where
        V: Clone,
    {
        self.leaf(key)
            .get(key)
            .map(|bucket| bucket.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Whether any reference is stored under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.leaf(key).get(key).is_some()
    }

    /// References for every key in `[min, max]`, ascending by key.
    ///
    /// Only subtrees whose interval intersects the range are visited, so the
    /// cost is `O(log n + k)` for `k` results. An inverted range is empty.
    pub fn range(&self, min: &K, max: &K) -> Vec<V>
    where
        V: Clone,
    {
        let mut results = Vec::new();
        if min <= max {
            collect_range(&self.root, min, max, &mut results);
        }
        results
    }

    /// Every stored reference, ascending by key.
    ///
    /// This is a full scan: the fallback when no predicate narrows the walk.
    pub fn all(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter()
            .flat_map(|(_, values)| values.iter().cloned())
            .collect()
    }

    /// Borrowing in-order iterator over `(key, references)` pairs.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            stack: vec![slice::from_ref(&self.root).iter()],
            leaf: None,
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Descend to the leaf whose interval covers `key`.
    fn leaf(&self, key: &K) -> &LeafNode<K, V> {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf(leaf) => return leaf,
                Node::Internal(internal) => node = &internal.children[internal.covering_child(key)],
            }
        }
    }
}

fn collect_range<K: Ord, V: Clone>(node: &Node<K, V>, min: &K, max: &K, results: &mut Vec<V>) {
    match node {
        Node::Leaf(leaf) => {
            let start = leaf.keys.partition_point(|k| k < min);
            for (key, bucket) in leaf.keys[start..].iter().zip(&leaf.values[start..]) {
                if key > max {
                    break;
                }
                results.extend(bucket.iter().cloned());
            }
        }
        Node::Internal(internal) => {
            // Children strictly between these two cover only in-range keys;
            // everything outside them is pruned.
            let last_child = internal.children.len().saturating_sub(1);
            let first = child_index(&internal.keys, min).min(last_child);
            let last = child_index(&internal.keys, max).min(last_child);

            for child in &internal.children[first..=last] {
                collect_range(child, min, max, results);
            }
        }
    }
}

/// In-order iterator over an [`OrderedIndex`].
///
/// Leaves have no sibling links, so the iterator keeps one child cursor per
/// level of the current root-to-leaf path.
pub struct Iter<'a, K, V> {
    stack: Vec<slice::Iter<'a, Node<K, V>>>,
    leaf: Option<Zip<slice::Iter<'a, K>, slice::Iter<'a, ValueBucket<V>>>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entries) = self.leaf.as_mut() {
                if let Some((key, bucket)) = entries.next() {
                    return Some((key, bucket.as_slice()));
                }
                self.leaf = None;
            }

            let level = self.stack.last_mut()?;
            match level.next() {
                Some(Node::Leaf(leaf)) => self.leaf = Some(leaf.keys.iter().zip(leaf.values.iter())),
                Some(Node::Internal(internal)) => self.stack.push(internal.children.iter()),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl<'a, K: Ord + Clone, V> IntoIterator for &'a OrderedIndex<K, V> {
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(order: usize, keys: &[i32]) -> OrderedIndex<i32, i32> {
        let mut index = OrderedIndex::new(order).unwrap();
        for &key in keys {
            index.insert(key, key);
        }
        index
    }

    #[test]
    fn test_search_absent_is_empty() {
        let index = build(4, &[1, 2, 3]);
        assert!(index.search(&4).is_empty());
        assert!(!index.contains_key(&4));
        assert!(index.contains_key(&2));

        let empty: OrderedIndex<i32, i32> = OrderedIndex::new(4).unwrap();
        assert!(empty.search(&1).is_empty());
    }

    #[test]
    fn test_search_every_key_across_levels() {
        let keys: Vec<i32> = (0..200).rev().collect();
        let index = build(3, &keys);
        for key in 0..200 {
            assert_eq!(index.search(&key), vec![key], "key {}", key);
        }
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let index = build(4, &[10, 20, 5, 15, 25, 1]);
        assert_eq!(index.range(&5, &20), vec![5, 10, 15, 20]);
        assert_eq!(index.range(&6, &19), vec![10, 15]);
        assert_eq!(index.range(&15, &15), vec![15]);
        assert_eq!(index.range(&0, &100), vec![1, 5, 10, 15, 20, 25]);
        assert!(index.range(&26, &100).is_empty());
        assert!(index.range(&11, &14).is_empty());
    }

    #[test]
    fn test_range_inverted_is_empty() {
        let index = build(4, &[1, 2, 3]);
        assert!(index.range(&3, &1).is_empty());
    }

    #[test]
    fn test_range_includes_whole_buckets() {
        let mut index = OrderedIndex::new(4).unwrap();
        index.insert(17, "ayu");
        index.insert(20, "budi");
        index.insert(17, "citra");

        assert_eq!(index.range(&17, &20), vec!["ayu", "citra", "budi"]);
    }

    #[test]
    fn test_iter_in_key_order() {
        let index = build(3, &[9, 3, 7, 1, 5, 8, 2, 6, 4]);
        let keys: Vec<i32> = index.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, (1..=9).collect::<Vec<_>>());
        assert_eq!(index.len(), 9);

        let mut seen = 0;
        for (key, values) in &index {
            assert_eq!(values, &[*key]);
            seen += 1;
        }
        assert_eq!(seen, 9);
    }

    #[test]
    fn test_all_and_empty() {
        let index: OrderedIndex<i32, i32> = OrderedIndex::new(4).unwrap();
        assert!(index.all().is_empty());
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);

        let index = build(2, &[3, 1, 2]);
        assert_eq!(index.all(), vec![1, 2, 3]);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_iter_skips_emptied_leaves() {
        let mut index = build(2, &(0..16).collect::<Vec<_>>());
        for key in 0..8 {
            assert!(index.delete(&key));
        }
        assert_eq!(index.all(), (8..16).collect::<Vec<_>>());
        assert_eq!(index.range(&0, &9), vec![8, 9]);
    }
}
