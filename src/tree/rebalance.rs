//! Structural mutation: insertion, removal, and the rebalancing algebra.
//!
//! Leaves and branches share one algebra. A node that becomes full first
//! tries to shed entries into a sibling that has room (`balance`). When
//! both neighbours are nearly full, two nodes become three (`split_with`).
//! A node that runs low borrows from a sibling, or is merged with it when
//! the pair fits in one node. Every separator moved between levels passes
//! through the parent slot between the two nodes, so key order is kept at
//! each step. Entries move between nodes by value; nothing is cloned.

use std::mem;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::engine::RawTree;
use super::node::{Branch, Entry, Leaf, Node, NodeId, Position};

type EntryBuffer<K, V> = SmallVec<[Entry<K, V>; 8]>;
type ChildBuffer = SmallVec<[NodeId; 8]>;

impl<K, V, C> RawTree<K, V, C> {
    // =========================================================================
    // Fill levels
    // =========================================================================

    #[inline]
    fn physical(&self, node: NodeId) -> usize {
        self.arena.get(node).physical()
    }

    #[inline]
    fn virtual_entries(&self, node: NodeId) -> usize {
        self.arena.get(node).virtual_entries()
    }

    fn max_physical(&self, node: NodeId) -> usize {
        if self.arena.get(node).is_leaf() {
            self.thresholds.leaf_capacity()
        } else {
            self.thresholds.branch_capacity()
        }
    }

    fn is_full(&self, node: NodeId) -> bool {
        self.physical(node) >= self.max_physical(node)
    }

    fn is_almost_full(&self, node: NodeId) -> bool {
        self.physical(node) + 1 >= self.max_physical(node)
    }

    fn is_low(&self, node: NodeId) -> bool {
        match self.arena.get(node) {
            Node::Leaf(leaf) => leaf.entries.len() <= self.thresholds.leaf_low_water,
            Node::Branch(branch) => branch.separators.len() < self.thresholds.branch_low_water,
        }
    }

    fn parent_of(&self, node: NodeId) -> NodeId {
        self.parent(node)
            .unwrap_or_else(|| unreachable!("node {node:?} has no parent"))
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Points `children[from..]` of `branch` back at it, slots included.
    fn relink(&mut self, branch: NodeId, from: usize) {
        let count = self.arena.branch(branch).children.len();
        for slot in from..count {
            let child = self.arena.branch(branch).children[slot];
            self.arena.get_mut(child).set_link(Some(branch), slot);
        }
    }

    /// Refreshes cached slots after children shifted inside `branch`.
    fn renumber(&mut self, branch: NodeId, from: usize) {
        if self.config.slotted() {
            self.relink(branch, from);
        }
    }

    /// Links the child at `slot` to `branch` and renumbers the ones after it.
    fn adopt(&mut self, branch: NodeId, slot: usize) {
        let child = self.arena.branch(branch).children[slot];
        self.arena.get_mut(child).set_link(Some(branch), slot);
        self.renumber(branch, slot + 1);
    }

    fn allocate_leaf(&mut self, parent: Option<NodeId>) -> NodeId {
        let capacity = self.thresholds.leaf_capacity();
        self.arena.allocate(Node::Leaf(Leaf::new(parent, capacity)))
    }

    fn allocate_branch(&mut self, parent: Option<NodeId>, first_child: NodeId) -> NodeId {
        let capacity = self.thresholds.branch_capacity();
        let branch = self
            .arena
            .allocate(Node::Branch(Branch::new(parent, first_child, capacity)));
        self.arena.get_mut(first_child).set_link(Some(branch), 0);
        branch
    }

    /// Replaces the parent separator of `item` and returns the old one.
    fn swap_separator(&mut self, parent: NodeId, item: usize, entry: Entry<K, V>) -> Entry<K, V> {
        mem::replace(self.arena.branch_mut(parent).separator_mut(item), entry)
    }

    // =========================================================================
    // Insertion and removal
    // =========================================================================

    /// Inserts the first entry of an empty tree.
    pub(crate) fn insert_root(&mut self, entry: Entry<K, V>) {
        debug_assert!(self.root.is_none(), "insert_root on a non-empty tree");
        let leaf = self.allocate_leaf(None);
        self.arena.leaf_mut(leaf).entries.push(entry);
        self.root = Some(leaf);
        self.len += 1;
        self.modification += 1;
    }

    /// Inserts `entry` into `leaf` at `index` and restores fill limits.
    ///
    /// `sequential` marks an append at the right edge of the tree, where the
    /// leaf is known to be the last child of its parent.
    pub(crate) fn leaf_insert(
        &mut self,
        leaf: NodeId,
        index: usize,
        entry: Entry<K, V>,
        sequential: bool,
    ) {
        self.arena.leaf_mut(leaf).entries.insert(index, entry);
        self.len += 1;
        self.modification += 1;

        if self.is_full(leaf) {
            match self.parent(leaf) {
                Some(parent) => self.is_full_child(parent, leaf, sequential),
                None => self.notify_root_full(),
            }
        }
    }

    /// Removes and returns the entry at `position`.
    ///
    /// A separator is replaced by its in-order successor, which is always
    /// the first entry of the leftmost leaf of the next child.
    pub(crate) fn remove_at(&mut self, position: Position) -> Entry<K, V> {
        let removed = if self.arena.get(position.node).is_leaf() {
            let removed = self.arena.leaf_mut(position.node).entries.remove(position.index);
            self.settle_leaf(position.node);
            removed
        } else {
            let child = self.arena.branch(position.node).children[position.index];
            let leaf = self.first_leaf(child);
            let successor = self.arena.leaf_mut(leaf).entries.remove(0);
            let removed = self.swap_separator(position.node, position.index, successor);
            self.settle_leaf(leaf);
            removed
        };
        if self.len == 0 {
            self.clear_nodes();
        }
        removed
    }

    /// Accounts for one entry leaving `leaf` and resolves a low fill.
    fn settle_leaf(&mut self, leaf: NodeId) {
        self.len -= 1;
        self.modification += 1;

        if self.is_low(leaf) {
            match self.parent(leaf) {
                Some(parent) => self.is_low_child(parent, leaf),
                None => {
                    if self.physical(leaf) == 0 {
                        self.notify_root_empty();
                    }
                }
            }
        }
    }

    /// Drops every node and resets the entry count.
    pub(crate) fn clear_nodes(&mut self) {
        self.arena.clear();
        self.root = None;
        self.len = 0;
        self.modification += 1;
    }

    // =========================================================================
    // Root changes
    // =========================================================================

    fn notify_root_full(&mut self) {
        let old_root = self
            .root
            .unwrap_or_else(|| unreachable!("full notification on an empty tree"));
        let new_root = self.allocate_branch(None, old_root);
        self.root = Some(new_root);

        let sibling = if self.arena.get(old_root).is_leaf() {
            let last = self
                .arena
                .leaf_mut(old_root)
                .entries
                .pop()
                .unwrap_or_else(|| unreachable!("full root leaf has no entries"));
            let sibling = self.allocate_leaf(Some(new_root));
            let root = self.arena.branch_mut(new_root);
            root.children.push(sibling);
            root.separators.push(last);
            sibling
        } else {
            let branch = self.arena.branch_mut(old_root);
            let (child, separator) = branch
                .children
                .pop()
                .zip(branch.separators.pop())
                .unwrap_or_else(|| unreachable!("full root branch has no separators"));
            let sibling = self.allocate_branch(Some(new_root), child);
            let root = self.arena.branch_mut(new_root);
            root.children.push(sibling);
            root.separators.push(separator);
            sibling
        };
        self.adopt(new_root, 1);
        self.balance_with_right(old_root, sibling, 1);

        debug!(height = self.height(), entries = self.len, "tree grew a level");
    }

    fn notify_root_empty(&mut self) {
        let Some(old_root) = self.root else {
            return;
        };
        match self.arena.release(old_root) {
            Node::Leaf(_) => self.root = None,
            Node::Branch(branch) => {
                let child = branch.children[0];
                self.arena.get_mut(child).set_link(None, 0);
                self.root = Some(child);
            }
        }
        debug!(height = self.height(), entries = self.len, "tree lost a level");
    }

    fn notify_parent_full(&mut self, branch: NodeId) {
        match self.parent(branch) {
            Some(parent) => self.is_full_child(parent, branch, false),
            None => self.notify_root_full(),
        }
    }

    // =========================================================================
    // Child notifications
    // =========================================================================

    fn siblings(&self, parent: NodeId, index: usize) -> (Option<NodeId>, Option<NodeId>) {
        let branch = self.arena.branch(parent);
        let left = index.checked_sub(1).map(|slot| branch.children[slot]);
        let right = (index < branch.last_index()).then(|| branch.children[index + 1]);
        (left, right)
    }

    /// Resolves a full `child` of `parent` by balancing or splitting.
    fn is_full_child(&mut self, parent: NodeId, child: NodeId, sequential: bool) {
        let index = if sequential && self.arena.get(child).is_leaf() {
            self.arena.branch(parent).last_index()
        } else {
            self.instance_index(parent, child)
        };
        let (left, right) = self.siblings(parent, index);
        let left_full = left.is_some_and(|node| self.is_almost_full(node));
        let right_full = right.is_some_and(|node| self.is_almost_full(node));

        match (left, right) {
            (Some(left), Some(_)) if right_full && left_full => {
                self.split_with(left, child, index);
            }
            (Some(left), Some(_)) if right_full => self.balance_with_left(child, left, index),
            (None, Some(right)) if right_full => self.split_with(child, right, index + 1),
            (_, Some(right)) => self.balance_with_right(child, right, index + 1),
            (Some(left), None) if left_full => self.split_with(left, child, index),
            (Some(left), None) => self.balance_with_left(child, left, index),
            (None, None) => unreachable!("full child {child:?} has no siblings"),
        }
    }

    /// Resolves a low `child` of `parent` by borrowing or merging.
    fn is_low_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.instance_index(parent, child);
        let (left, right) = self.siblings(parent, index);
        let limit = self.max_physical(child);

        if let Some(right) = right
            && self.physical(child) + self.virtual_entries(right) >= limit
        {
            self.balance_with(child, right, index + 1);
        } else if let Some(left) = left
            && self.virtual_entries(child) + self.physical(left) >= limit
        {
            self.balance_with(left, child, index);
        } else if let Some(left) = left {
            self.merge_with_right(left, child, index);
        } else if let Some(right) = right {
            self.merge_with_right(child, right, index + 1);
        }
    }

    // =========================================================================
    // Balancing
    // =========================================================================

    fn balance_with(&mut self, node: NodeId, right: NodeId, item: usize) {
        if self.physical(node) < self.virtual_entries(right) {
            self.balance_with_left(right, node, item);
        } else {
            self.balance_with_right(node, right, item);
        }
    }

    fn balance_with_left(&mut self, node: NodeId, left: NodeId, item: usize) {
        let target = (self.virtual_entries(node) + self.physical(left)) / 2;
        let count = self.physical(node).saturating_sub(target);
        self.push_left(node, count, left, item);
    }

    fn balance_with_right(&mut self, node: NodeId, right: NodeId, item: usize) {
        let target = (self.physical(node) + self.virtual_entries(right)) / 2;
        let count = self.physical(node).saturating_sub(target);
        self.push_right(node, count, right, item);
    }

    /// Moves the first `count` entries of `node` into its left sibling,
    /// rotating through the parent separator of `item`.
    fn push_left(&mut self, node: NodeId, count: usize, left: NodeId, item: usize) {
        if count == 0 {
            return;
        }
        trace!(?node, ?left, count, "push left");
        let parent = self.parent_of(node);

        if self.arena.get(node).is_leaf() {
            let mut moved: EntryBuffer<K, V> =
                self.arena.leaf_mut(node).entries.drain(..count).collect();
            let promoted = moved
                .pop()
                .unwrap_or_else(|| unreachable!("push left moved no entries"));
            let demoted = self.swap_separator(parent, item, promoted);
            let target = self.arena.leaf_mut(left);
            target.entries.push(demoted);
            target.entries.extend(moved);
        } else {
            let branch = self.arena.branch_mut(node);
            let children: ChildBuffer = branch.children.drain(..count).collect();
            let mut moved: EntryBuffer<K, V> = branch.separators.drain(..count).collect();
            let promoted = moved
                .pop()
                .unwrap_or_else(|| unreachable!("push left moved no separators"));
            let demoted = self.swap_separator(parent, item, promoted);
            let target = self.arena.branch_mut(left);
            let start = target.children.len();
            target.separators.push(demoted);
            target.separators.extend(moved);
            target.children.extend(children);
            self.relink(left, start);
            self.renumber(node, 0);
        }
    }

    /// Moves the last `count` entries of `node` into its right sibling,
    /// rotating through the parent separator of `item`.
    fn push_right(&mut self, node: NodeId, count: usize, right: NodeId, item: usize) {
        if count == 0 {
            return;
        }
        trace!(?node, ?right, count, "push right");
        let parent = self.parent_of(node);

        if self.arena.get(node).is_leaf() {
            let leaf = self.arena.leaf_mut(node);
            let start = leaf.entries.len() - count;
            let mut moved: EntryBuffer<K, V> = leaf.entries.drain(start..).collect();
            let promoted = moved.remove(0);
            let demoted = self.swap_separator(parent, item, promoted);
            moved.push(demoted);
            self.arena.leaf_mut(right).entries.splice(0..0, moved);
        } else {
            let branch = self.arena.branch_mut(node);
            let child_start = branch.children.len() - count;
            let separator_start = branch.separators.len() - count;
            let children: ChildBuffer = branch.children.drain(child_start..).collect();
            let mut moved: EntryBuffer<K, V> =
                branch.separators.drain(separator_start..).collect();
            let promoted = moved.remove(0);
            let demoted = self.swap_separator(parent, item, promoted);
            moved.push(demoted);
            let target = self.arena.branch_mut(right);
            target.separators.splice(0..0, moved);
            target.children.splice(0..0, children);
            self.relink(right, 0);
        }
    }

    // =========================================================================
    // Split and merge
    // =========================================================================

    /// Turns two full neighbours (`node` and `right`, the latter at parent
    /// item `item`) into three nodes of roughly equal fill.
    fn split_with(&mut self, node: NodeId, right: NodeId, item: usize) {
        let parent = self.parent_of(node);
        let total = self.physical(node) + self.virtual_entries(right);
        let third = total / 3;
        let half = (total - third) / 2;
        let middle = total - third - half;
        let from_here = self.physical(node).saturating_sub(third);
        let from_right = self.virtual_entries(right).saturating_sub(middle);
        trace!(?node, ?right, item, total, "split with sibling");

        if self.arena.get(node).is_leaf() {
            let last = self
                .arena
                .leaf_mut(node)
                .entries
                .pop()
                .unwrap_or_else(|| unreachable!("splitting an empty leaf"));
            let created = self.allocate_leaf(Some(parent));
            let branch = self.arena.branch_mut(parent);
            branch.children.insert(item, created);
            branch.separators.insert(item - 1, last);
            self.adopt(parent, item);

            self.push_right(node, from_here.saturating_sub(1), created, item);
            self.push_left(right, from_right, created, item + 1);
        } else if from_here > 0 {
            let branch = self.arena.branch_mut(node);
            let (child, separator) = branch
                .children
                .pop()
                .zip(branch.separators.pop())
                .unwrap_or_else(|| unreachable!("splitting an empty branch"));
            let created = self.allocate_branch(Some(parent), child);
            let branch = self.arena.branch_mut(parent);
            branch.children.insert(item, created);
            branch.separators.insert(item - 1, separator);
            self.adopt(parent, item);

            self.push_right(node, from_here - 1, created, item);
            self.push_left(right, from_right, created, item + 1);
        } else {
            let branch = self.arena.branch_mut(right);
            let child = branch.children.remove(0);
            let separator = branch.separators.remove(0);
            self.renumber(right, 0);
            let created = self.allocate_branch(Some(parent), child);
            let branch = self.arena.branch_mut(parent);
            branch.children.insert(item, created);
            branch.separators.insert(item, separator);
            self.adopt(parent, item);

            self.push_left(right, from_right.saturating_sub(1), created, item + 1);
        }

        if self.is_full(parent) {
            self.notify_parent_full(parent);
        }
    }

    /// Folds `right` (parent item `item`) and the separator between the
    /// two into `left`, then releases `right`.
    fn merge_with_right(&mut self, left: NodeId, right: NodeId, item: usize) {
        let parent = self.parent_of(left);
        trace!(?left, ?right, item, "merge with right");

        let branch = self.arena.branch_mut(parent);
        branch.children.remove(item);
        let separator = branch.separators.remove(item - 1);
        self.renumber(parent, item);

        let source = self.arena.release(right);
        let relink_from = match (self.arena.get_mut(left), source) {
            (Node::Leaf(target), Node::Leaf(source)) => {
                target.entries.push(separator);
                target.entries.extend(source.entries);
                None
            }
            (Node::Branch(target), Node::Branch(source)) => {
                let start = target.children.len();
                target.separators.push(separator);
                target.separators.extend(source.separators);
                target.children.extend(source.children);
                Some(start)
            }
            _ => unreachable!("merging nodes of different kinds"),
        };
        if let Some(start) = relink_from {
            self.relink(left, start);
        }

        if self.is_low(parent) {
            match self.parent(parent) {
                Some(grandparent) => self.is_low_child(grandparent, parent),
                None => {
                    if self.physical(parent) == 0 {
                        self.notify_root_empty();
                    }
                }
            }
        }
    }
}
