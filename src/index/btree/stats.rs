//! Index statistics and structural validation.

use std::fmt;

use crate::common::{Error, Result};
use crate::index::btree::node::Node;
use crate::index::btree::tree::OrderedIndex;

/// A point-in-time description of an index's shape.
///
/// Computed by a full traversal, so it is meant for diagnostics (`EXPLAIN`,
/// admin commands), not for the query path.
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
/// let stats = index.stats();
/// assert_eq!(stats.key_count, 6);
/// println!("{}", stats);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStats {
    pub name: Option<String>,
    pub key_field: Option<String>,

    /// Leaves plus internal nodes.
    pub node_count: usize,
    pub leaf_count: usize,

    /// Distinct keys stored at leaf level.
    pub key_count: usize,

    /// Routing keys held by internal nodes.
    pub separator_count: usize,

    /// Record references across all buckets.
    pub value_count: usize,

    /// Edges from the root to the deepest leaf (0 for a lone leaf root).
    pub max_depth: usize,

    pub order: usize,
}

impl IndexStats {
    /// Average number of keys per leaf (0.0 for an empty index).
    pub fn leaf_fill(&self) -> f64 {
        if self.leaf_count == 0 {
            0.0
        } else {
            self.key_count as f64 / self.leaf_count as f64
        }
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Index {} on {} {{ order: {}, keys: {}, values: {}, nodes: {}, leaves: {}, depth: {} }}",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.key_field.as_deref().unwrap_or("<unknown>"),
            self.order,
            self.key_count,
            self.value_count,
            self.node_count,
            self.leaf_count,
            self.max_depth
        )
    }
}

impl<K: Ord + Clone, V> OrderedIndex<K, V> {
    /// Snapshot of node, leaf and key counts.
    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            name: self.name.clone(),
            key_field: self.key_field.clone(),
            node_count: 0,
            leaf_count: 0,
            key_count: 0,
            separator_count: 0,
            value_count: 0,
            max_depth: 0,
            order: self.order,
        };

        fn traverse<K, V>(node: &Node<K, V>, depth: usize, stats: &mut IndexStats) {
            stats.node_count += 1;
            stats.max_depth = stats.max_depth.max(depth);

            match node {
                Node::Leaf(leaf) => {
                    stats.leaf_count += 1;
                    stats.key_count += leaf.keys.len();
                    stats.value_count += leaf.values.iter().map(|b| b.len()).sum::<usize>();
                }
                Node::Internal(internal) => {
                    stats.separator_count += internal.keys.len();
                    for child in &internal.children {
                        traverse(child, depth + 1, stats);
                    }
                }
            }
        }

        traverse(&self.root, 0, &mut stats);
        stats
    }

    /// Check every structural invariant of the tree.
    ///
    /// # Checks
    /// - Keys strictly ascending in every node
    /// - Leaves: one non-empty bucket per key
    /// - Internal nodes: `keys.len() + 1` children
    /// - No node holds more than `order` keys
    /// - Every key lies within the interval its parent routes to it
    /// - All leaves at the same depth
    ///
    /// # Errors
    /// Returns `Error::Corrupted` describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        let mut leaf_depth = None;
        self.validate_node(&self.root, None, None, 0, &mut leaf_depth)
    }

    fn validate_node(
        &self,
        node: &Node<K, V>,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<()> {
        let keys = node.keys();

        if keys.len() > self.order {
            return Err(Error::Corrupted(format!(
                "node at depth {} holds {} keys, order is {}",
                depth,
                keys.len(),
                self.order
            )));
        }

        if keys.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(Error::Corrupted(format!(
                "keys not strictly ascending at depth {}",
                depth
            )));
        }

        // Child intervals are [lower, upper): equal-to-separator keys go right.
        let in_bounds = |key: &K| lower.map_or(true, |lo| key >= lo) && upper.map_or(true, |hi| key < hi);
        if !keys.iter().all(in_bounds) {
            return Err(Error::Corrupted(format!(
                "key outside its parent's interval at depth {}",
                depth
            )));
        }

        match node {
            Node::Leaf(leaf) => {
                if leaf.values.len() != leaf.keys.len() {
                    return Err(Error::Corrupted(format!(
                        "leaf at depth {} has {} keys but {} buckets",
                        depth,
                        leaf.keys.len(),
                        leaf.values.len()
                    )));
                }
                if leaf.values.iter().any(|bucket| bucket.is_empty()) {
                    return Err(Error::Corrupted(format!("empty bucket in leaf at depth {}", depth)));
                }
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        return Err(Error::Corrupted(format!(
                            "leaf at depth {}, expected all leaves at depth {}",
                            depth, expected
                        )));
                    }
                    Some(_) => {}
                }
                Ok(())
            }
            Node::Internal(internal) => {
                if internal.children.len() != internal.keys.len() + 1 {
                    return Err(Error::Corrupted(format!(
                        "internal node at depth {} has {} keys but {} children",
                        depth,
                        internal.keys.len(),
                        internal.children.len()
                    )));
                }

                for (i, child) in internal.children.iter().enumerate() {
                    let child_lower = if i == 0 { lower } else { Some(&internal.keys[i - 1]) };
                    let child_upper = internal.keys.get(i).or(upper);
                    self.validate_node(child, child_lower, child_upper, depth + 1, leaf_depth)?;
                }
                Ok(())
            }
        }
    }
}
