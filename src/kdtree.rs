//! k-d tree spatial index for geographic points.
//!
//! A binary space-partitioning tree over latitude/longitude, supporting
//! balanced bulk construction, point insertion, exact lookup and
//! k-nearest-neighbor search under great-circle distance. Used to answer
//! "which recorded point is closest to here?" against a filtered waypoint
//! set.
//!
//! The tree is balanced once at construction time; points inserted
//! afterwards do not trigger rebalancing and can degrade query performance
//! on adversarial insertion orders. That trade-off is accepted: the
//! surrounding application bulk-loads a filtered point set and then only
//! queries it.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::{debug, warn};

use crate::geo_utils::{distance_to_meridian, distance_to_parallel, haversine_distance};
use crate::{GeoPoint, GeoRecord};

/// Number of splitting axes. Elevation is carried by [`GeoPoint`] but never
/// split on.
const DIMENSIONS: usize = 2;

const LAT_AXIS: usize = 0;

/// Compare two points on the splitting axis for `axis`, falling through to
/// the other axis and then the full coordinate order on ties.
fn cyclic_cmp(axis: usize, a: &GeoPoint, b: &GeoPoint) -> Ordering {
    a.axis_value(axis)
        .total_cmp(&b.axis_value(axis))
        .then_with(|| {
            a.axis_value((axis + 1) % DIMENSIONS)
                .total_cmp(&b.axis_value((axis + 1) % DIMENSIONS))
        })
        .then_with(|| a.cmp_coords(b))
}

#[derive(Debug, Clone)]
struct Node<T> {
    value: T,
    depth: usize,
    /// Non-owning back-reference for the upward walk in neighbor search.
    parent: Option<usize>,
    lesser: Option<usize>,
    greater: Option<usize>,
}

/// A k-d tree over geographic records.
///
/// Nodes live in an arena (`Vec`); parent and child links are indices, so
/// ownership runs strictly root-to-leaf while the search can still walk
/// upward.
///
/// All points in a node's `lesser` subtree compare `<=` the node's point on
/// the node's splitting axis (`depth % 2`), all points in `greater` compare
/// `>`; ties fall through to the other axis and then to the full coordinate
/// order. Duplicate points are stored as distinct nodes.
///
/// Read operations never fail: queries against an empty tree, or with an
/// out-of-range target, return empty results. The tree is not safe for
/// concurrent mutation; concurrent `&self` queries against an unchanging
/// tree are fine.
///
/// # Example
///
/// ```rust
/// use waymark::{GeoPoint, KdTree};
///
/// let index = KdTree::from_points(vec![
///     GeoPoint::new(40.0, -75.0),
///     GeoPoint::new(40.1, -75.1),
///     GeoPoint::new(41.0, -76.0),
/// ]);
///
/// let nearest = index.nearest_neighbors(1, &GeoPoint::new(40.0, -75.0));
/// assert_eq!(*nearest[0], GeoPoint::new(40.0, -75.0));
/// ```
#[derive(Debug, Clone)]
pub struct KdTree<T> {
    nodes: Vec<Node<T>>,
    root: Option<usize>,
}

impl<T: GeoRecord> Default for KdTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: GeoRecord> KdTree<T> {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Build a balanced index from a list of records.
    ///
    /// Each subtree is rooted at the median of its points on the current
    /// splitting axis, giving O(n log n) construction and logarithmic depth
    /// regardless of input distribution. Records with invalid coordinates
    /// are skipped with a warning.
    pub fn from_points(points: Vec<T>) -> Self {
        let total = points.len();
        let valid: Vec<T> = points
            .into_iter()
            .filter(|p| {
                let ok = p.position().is_valid();
                if !ok {
                    warn!(
                        "skipping record with unusable coordinates ({}, {})",
                        p.position().latitude,
                        p.position().longitude
                    );
                }
                ok
            })
            .collect();

        let mut tree = Self {
            nodes: Vec::with_capacity(valid.len()),
            root: None,
        };
        tree.root = tree.build_balanced(valid, 0, None);
        debug!(
            "built spatial index over {} of {} points",
            tree.len(),
            total
        );
        tree
    }

    fn build_balanced(&mut self, mut points: Vec<T>, depth: usize, parent: Option<usize>) -> Option<usize> {
        if points.is_empty() {
            return None;
        }

        let axis = depth % DIMENSIONS;
        points.sort_by(|a, b| cyclic_cmp(axis, a.position(), b.position()));

        let mid = points.len() / 2;
        let greater = points.split_off(mid + 1);
        let value = points.pop().unwrap(); // points is non-empty and mid < len
        let idx = self.push_node(value, depth, parent);

        let lesser_child = self.build_balanced(points, depth + 1, Some(idx));
        let greater_child = self.build_balanced(greater, depth + 1, Some(idx));
        self.nodes[idx].lesser = lesser_child;
        self.nodes[idx].greater = greater_child;

        Some(idx)
    }

    fn push_node(&mut self, value: T, depth: usize, parent: Option<usize>) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(Node {
            value,
            depth,
            parent,
            lesser: None,
            greater: None,
        });
        idx
    }

    /// Insert a single record as a new leaf.
    ///
    /// Returns `false` (and leaves the tree unchanged) if the record's
    /// coordinates are invalid; otherwise always succeeds. Duplicates are
    /// permitted. Insertion does not rebalance, so heavy post-construction
    /// insertion can degrade query performance.
    pub fn insert(&mut self, value: T) -> bool {
        if !value.position().is_valid() {
            return false;
        }

        let Some(mut node) = self.root else {
            self.root = Some(self.push_node(value, 0, None));
            return true;
        };

        loop {
            let axis = self.nodes[node].depth % DIMENSIONS;
            let ord = cyclic_cmp(axis, value.position(), self.nodes[node].value.position());
            if ord != Ordering::Greater {
                match self.nodes[node].lesser {
                    Some(next) => node = next,
                    None => {
                        let depth = self.nodes[node].depth + 1;
                        let child = self.push_node(value, depth, Some(node));
                        self.nodes[node].lesser = Some(child);
                        return true;
                    }
                }
            } else {
                match self.nodes[node].greater {
                    Some(next) => node = next,
                    None => {
                        let depth = self.nodes[node].depth + 1;
                        let child = self.push_node(value, depth, Some(node));
                        self.nodes[node].greater = Some(child);
                        return true;
                    }
                }
            }
        }
    }

    /// Check whether a point is stored in the index.
    ///
    /// Matches on full exact coordinate equality, not proximity.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            let node = &self.nodes[idx];
            let pos = node.value.position();
            if pos == point {
                return true;
            }
            let axis = node.depth % DIMENSIONS;
            cursor = if cyclic_cmp(axis, point, pos) != Ordering::Greater {
                node.lesser
            } else {
                node.greater
            };
        }
        false
    }

    /// Find the `k` records nearest to `target`, ordered by ascending
    /// great-circle distance.
    ///
    /// Returns at least `k` records when the tree holds that many: entries
    /// beyond `k` are kept when they tie the k-th smallest distance exactly,
    /// so callers must not assume `len() == k`. Distinct tree nodes holding
    /// bit-identical points collapse to one result entry. Returns fewer than
    /// `k` only when the tree itself holds fewer, and an empty vector for an
    /// empty tree, `k == 0`, or an out-of-range target.
    pub fn nearest_neighbors(&self, k: usize, target: &GeoPoint) -> Vec<&T> {
        if k == 0 || self.root.is_none() || !target.is_valid() {
            return Vec::new();
        }

        // Descend to the leaf whose cell would hold the target.
        let mut cursor = self.root;
        let mut leaf = None;
        while let Some(idx) = cursor {
            leaf = Some(idx);
            let node = &self.nodes[idx];
            let axis = node.depth % DIMENSIONS;
            cursor = if cyclic_cmp(axis, target, node.value.position()) != Ordering::Greater {
                node.lesser
            } else {
                node.greater
            };
        }

        // Walk back up, examining the far side of each splitting plane only
        // when it could still hold a closer (or exactly tying) point.
        let mut results = ResultSet::new(k);
        let mut examined = HashSet::new();
        let mut cursor = leaf;
        while let Some(idx) = cursor {
            self.search_node(idx, target, &mut results, &mut examined);
            cursor = self.nodes[idx].parent;
        }

        results
            .entries
            .iter()
            .map(|e| &self.nodes[e.node].value)
            .collect()
    }

    /// The single nearest record, if any.
    pub fn nearest(&self, target: &GeoPoint) -> Option<&T> {
        self.nearest_neighbors(1, target).into_iter().next()
    }

    fn search_node(
        &self,
        idx: usize,
        target: &GeoPoint,
        results: &mut ResultSet,
        examined: &mut HashSet<usize>,
    ) {
        if !examined.insert(idx) {
            return;
        }

        let node = &self.nodes[idx];
        let pos = *node.value.position();
        results.offer(haversine_distance(target, &pos), pos, idx);

        let axis = node.depth % DIMENSIONS;
        // Separation between the target and this node's splitting plane; a
        // subtree on the far side of the plane cannot hold anything closer
        // than this.
        let plane_dist = match axis {
            LAT_AXIS => distance_to_parallel(target, pos.latitude),
            _ => distance_to_meridian(target, pos.longitude),
        };
        let target_on_lesser_side = target.axis_value(axis) <= pos.axis_value(axis);

        if let Some(lesser) = node.lesser {
            let separation = if target_on_lesser_side { 0.0 } else { plane_dist };
            if separation <= results.prune_bound() {
                self.search_node(lesser, target, results, examined);
            }
        }
        if let Some(greater) = node.greater {
            let separation = if target_on_lesser_side { plane_dist } else { 0.0 };
            if separation <= results.prune_bound() {
                self.search_node(greater, target, results, examined);
            }
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Longest root-to-leaf path, in nodes. Diagnostic; 0 for an empty tree.
    pub fn height(&self) -> usize {
        self.nodes.iter().map(|n| n.depth + 1).max().unwrap_or(0)
    }

    /// Lazy depth-first traversal of all stored records (node, then greater
    /// subtree, then lesser). Restartable; does not mutate the tree.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            stack: self.root.into_iter().collect(),
        }
    }

    /// The same traversal as [`iter`](KdTree::iter), in exact reverse order.
    pub fn iter_rev(&self) -> RevIter<'_, T> {
        RevIter {
            tree: self,
            stack: self.root.map(Visit::Enter).into_iter().collect(),
        }
    }
}

impl<'a, T: GeoRecord> IntoIterator for &'a KdTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Bounded nearest-neighbor result set, ordered by (distance, coordinate
/// order). Capped at `k` entries except that entries tying the k-th smallest
/// distance are retained.
struct ResultSet {
    k: usize,
    entries: Vec<ResultEntry>,
}

struct ResultEntry {
    distance: f64,
    point: GeoPoint,
    node: usize,
}

impl ResultSet {
    fn new(k: usize) -> Self {
        Self {
            k,
            entries: Vec::with_capacity(k + 1),
        }
    }

    /// Distance a candidate subtree must beat to be worth searching:
    /// infinite until `k` entries are held, then the k-th smallest distance.
    fn prune_bound(&self) -> f64 {
        if self.entries.len() < self.k {
            f64::INFINITY
        } else {
            self.entries[self.k - 1].distance
        }
    }

    fn offer(&mut self, distance: f64, point: GeoPoint, node: usize) {
        let pos = self.entries.partition_point(|e| {
            match e.distance.total_cmp(&distance) {
                Ordering::Less => true,
                Ordering::Greater => false,
                Ordering::Equal => e.point.cmp_coords(&point) == Ordering::Less,
            }
        });

        // Set semantics: one entry per (distance, point).
        if let Some(existing) = self.entries.get(pos) {
            if existing.distance.total_cmp(&distance) == Ordering::Equal
                && existing.point.cmp_coords(&point) == Ordering::Equal
            {
                return;
            }
        }

        self.entries.insert(
            pos,
            ResultEntry {
                distance,
                point,
                node,
            },
        );

        // Trim past k, keeping exact ties of the k-th distance.
        if self.entries.len() > self.k {
            let kth = self.entries[self.k - 1].distance;
            while self.entries.len() > self.k
                && self
                    .entries
                    .last()
                    .map_or(false, |e| e.distance > kth)
            {
                self.entries.pop();
            }
        }
    }
}

/// Forward traversal iterator, see [`KdTree::iter`].
#[derive(Debug)]
pub struct Iter<'a, T> {
    tree: &'a KdTree<T>,
    stack: Vec<usize>,
}

impl<'a, T: GeoRecord> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let idx = self.stack.pop()?;
        let node = &self.tree.nodes[idx];
        // Pushed lesser-first so the greater subtree is visited first.
        if let Some(lesser) = node.lesser {
            self.stack.push(lesser);
        }
        if let Some(greater) = node.greater {
            self.stack.push(greater);
        }
        Some(&node.value)
    }
}

#[derive(Debug)]
enum Visit {
    Enter(usize),
    Yield(usize),
}

/// Reverse traversal iterator, see [`KdTree::iter_rev`].
#[derive(Debug)]
pub struct RevIter<'a, T> {
    tree: &'a KdTree<T>,
    stack: Vec<Visit>,
}

impl<'a, T: GeoRecord> Iterator for RevIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        loop {
            match self.stack.pop()? {
                Visit::Yield(idx) => return Some(&self.tree.nodes[idx].value),
                Visit::Enter(idx) => {
                    // Reverse of (node, greater, lesser) is
                    // (rev lesser, rev greater, node).
                    let node = &self.tree.nodes[idx];
                    self.stack.push(Visit::Yield(idx));
                    if let Some(greater) = node.greater {
                        self.stack.push(Visit::Enter(greater));
                    }
                    if let Some(lesser) = node.lesser {
                        self.stack.push(Visit::Enter(lesser));
                    }
                }
            }
        }
    }
}
