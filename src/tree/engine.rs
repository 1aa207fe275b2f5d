//! The tree core shared by maps, sets, views and cursors.
//!
//! [`RawTree`] owns the node arena, the root handle, the entry counter and
//! the comparator. This module holds everything that reads the structure:
//! exact search, neighbour search, the position walks used by iteration,
//! and the structural self-check. Mutation lives in `rebalance`.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::Bound;

use super::comparator::Comparator;
use super::config::{TreeConfig, Thresholds};
use super::error::InvariantViolation;
use super::node::{Arena, Entry, Node, NodeId, Position, count_less, count_not_greater, locate};

/// Outcome of an exact search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// The key is stored at this position (a leaf entry or a separator).
    Found(Position),
    /// The key is absent; inserting it belongs at this leaf position.
    Vacant(Position),
}

/// Strict neighbour on one side of a key plus the closest entry on the other.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Neighbors {
    /// Strict predecessor (for a lower search) or successor (for a higher one).
    pub(crate) strict: Option<Position>,
    /// Closest entry on the other side, possibly equal to the key.
    pub(crate) other: Option<Position>,
}

pub(crate) struct RawTree<K, V, C> {
    pub(crate) arena: Arena<K, V>,
    pub(crate) root: Option<NodeId>,
    pub(crate) len: usize,
    pub(crate) config: TreeConfig,
    pub(crate) thresholds: Thresholds,
    pub(crate) comparator: C,
    pub(crate) modification: u64,
}

impl<K: Clone, V: Clone, C: Clone> Clone for RawTree<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            root: self.root,
            len: self.len,
            config: self.config,
            thresholds: self.thresholds,
            comparator: self.comparator.clone(),
            modification: 0,
        }
    }
}

impl<K, V, C> RawTree<K, V, C> {
    pub(crate) const fn new(config: TreeConfig, comparator: C) -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            len: 0,
            config,
            thresholds: config.thresholds(),
            comparator,
            modification: 0,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub(crate) fn entry(&self, position: Position) -> &Entry<K, V> {
        self.arena.get(position.node).entry(position.index)
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, position: Position) -> &mut Entry<K, V> {
        self.arena.get_mut(position.node).entry_mut(position.index)
    }

    #[inline]
    pub(crate) fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node).parent()
    }

    /// Number of levels from the root down to the leaves.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while let Some(node) = current {
            height += 1;
            current = match self.arena.get(node) {
                Node::Leaf(_) => None,
                Node::Branch(branch) => Some(branch.children[0]),
            };
        }
        height
    }

    /// Slot of `child` among the children of `parent`.
    pub(crate) fn instance_index(&self, parent: NodeId, child: NodeId) -> usize {
        let branch = self.arena.branch(parent);
        if self.config.slotted() {
            let slot = self.arena.get(child).slot();
            debug_assert_eq!(
                branch.children.get(slot),
                Some(&child),
                "cached slot does not match the parent's child list"
            );
            slot
        } else {
            branch
                .children
                .iter()
                .position(|&candidate| candidate == child)
                .unwrap_or_else(|| unreachable!("child {child:?} not found in parent {parent:?}"))
        }
    }

    // =========================================================================
    // Boundary descent
    // =========================================================================

    pub(crate) fn first_leaf(&self, mut node: NodeId) -> NodeId {
        while let Node::Branch(branch) = self.arena.get(node) {
            node = branch.children[0];
        }
        node
    }

    pub(crate) fn last_leaf(&self, mut node: NodeId) -> NodeId {
        while let Node::Branch(branch) = self.arena.get(node) {
            node = branch.children[branch.last_index()];
        }
        node
    }

    pub(crate) fn first_position(&self) -> Option<Position> {
        let leaf = self.first_leaf(self.root?);
        Some(Position::new(leaf, 0))
    }

    pub(crate) fn last_position(&self) -> Option<Position> {
        let leaf = self.last_leaf(self.root?);
        let last = self.arena.leaf(leaf).entries.len().checked_sub(1)?;
        Some(Position::new(leaf, last))
    }

    // =========================================================================
    // Position walks
    // =========================================================================

    /// Position of the entry immediately after `position`.
    pub(crate) fn next_position(&self, position: Position) -> Option<Position> {
        match self.arena.get(position.node) {
            Node::Leaf(leaf) => {
                if position.index + 1 < leaf.entries.len() {
                    Some(Position::new(position.node, position.index + 1))
                } else {
                    self.climb_forward(position.node)
                }
            }
            Node::Branch(branch) => {
                let leaf = self.first_leaf(branch.children[position.index]);
                Some(Position::new(leaf, 0))
            }
        }
    }

    /// Position of the entry immediately before `position`.
    pub(crate) fn previous_position(&self, position: Position) -> Option<Position> {
        match self.arena.get(position.node) {
            Node::Leaf(_) => {
                if position.index > 0 {
                    Some(Position::new(position.node, position.index - 1))
                } else {
                    self.climb_backward(position.node)
                }
            }
            Node::Branch(branch) => {
                let leaf = self.last_leaf(branch.children[position.index - 1]);
                let last = self.arena.leaf(leaf).entries.len() - 1;
                Some(Position::new(leaf, last))
            }
        }
    }

    fn climb_forward(&self, mut child: NodeId) -> Option<Position> {
        while let Some(parent) = self.parent(child) {
            let slot = self.instance_index(parent, child);
            if slot < self.arena.branch(parent).last_index() {
                return Some(Position::new(parent, slot + 1));
            }
            child = parent;
        }
        None
    }

    fn climb_backward(&self, mut child: NodeId) -> Option<Position> {
        while let Some(parent) = self.parent(child) {
            let slot = self.instance_index(parent, child);
            if slot > 0 {
                return Some(Position::new(parent, slot));
            }
            child = parent;
        }
        None
    }

    /// Every position in ascending key order.
    pub(crate) fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.len);
        let mut current = self.first_position();
        while let Some(position) = current {
            positions.push(position);
            current = self.next_position(position);
        }
        positions
    }
}

impl<K, V, C: Comparator<K>> RawTree<K, V, C> {
    // =========================================================================
    // Searches
    // =========================================================================

    /// Exact search from the root. `None` when the tree is empty.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Lookup>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let strategy = self.config.search();
        let mut node = self.root?;
        loop {
            match self.arena.get(node) {
                Node::Leaf(leaf) => {
                    return Some(
                        match locate(strategy, &leaf.entries, key, &self.comparator) {
                            Ok(index) => Lookup::Found(Position::new(node, index)),
                            Err(index) => Lookup::Vacant(Position::new(node, index)),
                        },
                    );
                }
                Node::Branch(branch) => {
                    match locate(strategy, &branch.separators, key, &self.comparator) {
                        Ok(index) => return Some(Lookup::Found(Position::new(node, index + 1))),
                        Err(index) => node = branch.children[index],
                    }
                }
            }
        }
    }

    pub(crate) fn find_position<Q>(&self, key: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        match self.find(key)? {
            Lookup::Found(position) => Some(position),
            Lookup::Vacant(_) => None,
        }
    }

    /// Strict predecessor of `key`, together with the first entry `>= key`.
    pub(crate) fn lower_search<Q>(&self, key: &Q) -> Neighbors
    where
        K: Borrow<Q>,
        C: Comparator<Q>,
        Q: ?Sized,
    {
        let strategy = self.config.search();
        let mut neighbors = Neighbors::default();
        let Some(mut node) = self.root else {
            return neighbors;
        };
        loop {
            match self.arena.get(node) {
                Node::Leaf(leaf) => {
                    let less = count_less(strategy, &leaf.entries, key, &self.comparator);
                    if less > 0 {
                        neighbors.strict = Some(Position::new(node, less - 1));
                    }
                    if less < leaf.entries.len() {
                        neighbors.other = Some(Position::new(node, less));
                    }
                    return neighbors;
                }
                Node::Branch(branch) => {
                    let less = count_less(strategy, &branch.separators, key, &self.comparator);
                    if less > 0 {
                        neighbors.strict = Some(Position::new(node, less));
                    }
                    if less < branch.last_index() {
                        neighbors.other = Some(Position::new(node, less + 1));
                    }
                    node = branch.children[less];
                }
            }
        }
    }

    /// Strict successor of `key`, together with the last entry `<= key`.
    pub(crate) fn higher_search(&self, key: &K) -> Neighbors {
        let strategy = self.config.search();
        let mut neighbors = Neighbors::default();
        let Some(mut node) = self.root else {
            return neighbors;
        };
        loop {
            match self.arena.get(node) {
                Node::Leaf(leaf) => {
                    let upto = count_not_greater(strategy, &leaf.entries, key, &self.comparator);
                    if upto < leaf.entries.len() {
                        neighbors.strict = Some(Position::new(node, upto));
                    }
                    if upto > 0 {
                        neighbors.other = Some(Position::new(node, upto - 1));
                    }
                    return neighbors;
                }
                Node::Branch(branch) => {
                    let upto =
                        count_not_greater(strategy, &branch.separators, key, &self.comparator);
                    if upto < branch.last_index() {
                        neighbors.strict = Some(Position::new(node, upto + 1));
                    }
                    if upto > 0 {
                        neighbors.other = Some(Position::new(node, upto));
                    }
                    node = branch.children[upto];
                }
            }
        }
    }

    pub(crate) fn lower_position(&self, key: &K) -> Option<Position> {
        self.lower_search(key).strict
    }

    pub(crate) fn higher_position(&self, key: &K) -> Option<Position> {
        self.higher_search(key).strict
    }

    pub(crate) fn floor_position(&self, key: &K) -> Option<Position> {
        let neighbors = self.lower_search(key);
        match neighbors.other {
            Some(next) if self.comparator.equal(&self.entry(next).key, key) => Some(next),
            _ => neighbors.strict,
        }
    }

    pub(crate) fn ceiling_position(&self, key: &K) -> Option<Position> {
        let neighbors = self.higher_search(key);
        match neighbors.other {
            Some(previous) if self.comparator.equal(&self.entry(previous).key, key) => {
                Some(previous)
            }
            _ => neighbors.strict,
        }
    }

    // =========================================================================
    // Inclusive bounds
    // =========================================================================

    /// First position whose key is not below `from`.
    pub(crate) fn start_position(&self, from: Bound<&K>) -> Option<Position> {
        match from {
            Bound::Unbounded => self.first_position(),
            Bound::Included(key) => self.ceiling_position(key),
            Bound::Excluded(key) => self.higher_position(key),
        }
    }

    /// Last position whose key is not above `to`.
    pub(crate) fn end_position(&self, to: Bound<&K>) -> Option<Position> {
        match to {
            Bound::Unbounded => self.last_position(),
            Bound::Included(key) => self.floor_position(key),
            Bound::Excluded(key) => self.lower_position(key),
        }
    }

    pub(crate) fn below_upper(&self, key: &K, to: Bound<&K>) -> bool {
        match to {
            Bound::Unbounded => true,
            Bound::Included(limit) => self.comparator.compare(key, limit) != Ordering::Greater,
            Bound::Excluded(limit) => self.comparator.less(key, limit),
        }
    }

    pub(crate) fn above_lower(&self, key: &K, from: Bound<&K>) -> bool {
        match from {
            Bound::Unbounded => true,
            Bound::Included(limit) => self.comparator.compare(key, limit) != Ordering::Less,
            Bound::Excluded(limit) => self.comparator.less(limit, key),
        }
    }

    pub(crate) fn in_bounds(&self, key: &K, from: Bound<&K>, to: Bound<&K>) -> bool {
        self.above_lower(key, from) && self.below_upper(key, to)
    }

    /// The `(first, last)` positions of a bounded range, or `None` if empty.
    pub(crate) fn span(&self, from: Bound<&K>, to: Bound<&K>) -> Option<(Position, Position)> {
        let first = self.start_position(from)?;
        let last = self.end_position(to)?;
        if self.comparator.less(&self.entry(last).key, &self.entry(first).key) {
            None
        } else {
            Some((first, last))
        }
    }

    // =========================================================================
    // Self-check
    // =========================================================================

    /// Verifies ordering, fill levels, parent links and the entry counter.
    pub(crate) fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(root) = self.root else {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(InvariantViolation::new(0, format!("empty tree reports {} entries", self.len)))
            };
        };
        if self.parent(root).is_some() {
            return Err(InvariantViolation::new(root.raw(), "root has a parent"));
        }

        let mut leaf_depth = None;
        let counted = self.check_node(root, None, None, 0, &mut leaf_depth)?;
        if counted != self.len {
            return Err(InvariantViolation::new(
                root.raw(),
                format!("counted {counted} entries but the tree reports {}", self.len),
            ));
        }
        if self.arena.live() != self.count_nodes(root) {
            return Err(InvariantViolation::new(
                root.raw(),
                "arena holds nodes that are not reachable from the root",
            ));
        }
        Ok(())
    }

    fn count_nodes(&self, node: NodeId) -> usize {
        match self.arena.get(node) {
            Node::Leaf(_) => 1,
            Node::Branch(branch) => {
                1 + branch
                    .children
                    .iter()
                    .map(|&child| self.count_nodes(child))
                    .sum::<usize>()
            }
        }
    }

    fn check_sorted(
        &self,
        node: NodeId,
        entries: &[Entry<K, V>],
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<(), InvariantViolation> {
        let keys = lower
            .into_iter()
            .chain(entries.iter().map(|entry| &entry.key))
            .chain(upper);
        let mut previous: Option<&K> = None;
        for key in keys {
            if let Some(before) = previous
                && !self.comparator.less(before, key)
            {
                return Err(InvariantViolation::new(
                    node.raw(),
                    "keys are not strictly increasing",
                ));
            }
            previous = Some(key);
        }
        Ok(())
    }

    fn check_node(
        &self,
        node: NodeId,
        lower: Option<&K>,
        upper: Option<&K>,
        depth: usize,
        leaf_depth: &mut Option<usize>,
    ) -> Result<usize, InvariantViolation> {
        let is_root = Some(node) == self.root;
        match self.arena.get(node) {
            Node::Leaf(leaf) => {
                match *leaf_depth {
                    Some(expected) if expected != depth => {
                        return Err(InvariantViolation::new(
                            node.raw(),
                            format!("leaf at depth {depth}, expected {expected}"),
                        ));
                    }
                    _ => *leaf_depth = Some(depth),
                }
                let length = leaf.entries.len();
                if length > self.thresholds.leaf_max_index {
                    return Err(InvariantViolation::new(
                        node.raw(),
                        format!("leaf holds {length} entries, over its limit"),
                    ));
                }
                if is_root && length == 0 {
                    return Err(InvariantViolation::new(node.raw(), "root leaf is empty"));
                }
                if !is_root && length <= self.thresholds.leaf_low_water {
                    return Err(InvariantViolation::new(
                        node.raw(),
                        format!("leaf holds {length} entries, under its low water"),
                    ));
                }
                self.check_sorted(node, &leaf.entries, lower, upper)?;
                Ok(length)
            }
            Node::Branch(branch) => {
                let separators = branch.separators.len();
                if branch.children.len() != separators + 1 {
                    return Err(InvariantViolation::new(
                        node.raw(),
                        "branch child count does not match its separators",
                    ));
                }
                if separators >= self.thresholds.branch_max_index {
                    return Err(InvariantViolation::new(
                        node.raw(),
                        format!("branch holds {separators} separators, at or over its limit"),
                    ));
                }
                if is_root && separators == 0 {
                    return Err(InvariantViolation::new(node.raw(), "root branch has one child"));
                }
                if !is_root && separators < self.thresholds.branch_low_water {
                    return Err(InvariantViolation::new(
                        node.raw(),
                        format!("branch holds {separators} separators, under its low water"),
                    ));
                }
                self.check_sorted(node, &branch.separators, lower, upper)?;

                let mut total = separators;
                for (slot, &child) in branch.children.iter().enumerate() {
                    let child_node = self.arena.get(child);
                    if child_node.parent() != Some(node) {
                        return Err(InvariantViolation::new(
                            child.raw(),
                            "parent link does not point at the owning branch",
                        ));
                    }
                    if self.config.slotted() && child_node.slot() != slot {
                        return Err(InvariantViolation::new(
                            child.raw(),
                            format!("cached slot {} but stored at {slot}", child_node.slot()),
                        ));
                    }
                    let child_lower = if slot == 0 {
                        lower
                    } else {
                        Some(&branch.separator(slot).key)
                    };
                    let child_upper = if slot == separators {
                        upper
                    } else {
                        Some(&branch.separator(slot + 1).key)
                    };
                    total += self.check_node(child, child_lower, child_upper, depth + 1, leaf_depth)?;
                }
                Ok(total)
            }
        }
    }
}
