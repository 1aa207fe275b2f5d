//! Node storage for the B-tree engine.
//!
//! Nodes live in an [`Arena`] and refer to each other through [`NodeId`]
//! handles: a branch owns its children by id, and every node records its
//! parent as a back index. A [`Node`] is either a [`Leaf`] holding a dense,
//! sorted run of entries, or a [`Branch`] holding child ids interleaved with
//! separator entries.
//!
//! # Item numbering
//!
//! A branch with `n` separators has `n + 1` children. Item `0` is the first
//! child alone; item `i` (for `1 <= i <= n`) pairs `children[i]` with
//! `separators[i - 1]`. The separator of item `i` sorts after every key in
//! `children[i - 1]` and before every key in `children[i]`.

use std::borrow::Borrow;
use std::cmp::Ordering;

use static_assertions::assert_eq_size;

use super::comparator::Comparator;
use super::config::SearchStrategy;

// =============================================================================
// NodeId
// =============================================================================

/// Stable handle of a node inside an [`Arena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeId(u32);

assert_eq_size!(NodeId, u32);

impl NodeId {
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) const fn raw(self) -> u32 {
        self.0
    }
}

// =============================================================================
// Entry and Position
// =============================================================================

/// A key and its value, owned by exactly one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
}

impl<K, V> Entry<K, V> {
    #[inline]
    pub(crate) const fn new(key: K, value: V) -> Self {
        Self { key, value }
    }

    #[inline]
    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }

    #[inline]
    pub(crate) const fn as_pair(&self) -> (&K, &V) {
        (&self.key, &self.value)
    }
}

/// Location of one entry: a leaf entry index, or a branch item index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Position {
    pub(crate) node: NodeId,
    pub(crate) index: usize,
}

impl Position {
    #[inline]
    pub(crate) const fn new(node: NodeId, index: usize) -> Self {
        Self { node, index }
    }
}

// =============================================================================
// Leaf and Branch
// =============================================================================

#[derive(Clone, Debug)]
pub(crate) struct Leaf<K, V> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) slot: usize,
    pub(crate) entries: Vec<Entry<K, V>>,
}

impl<K, V> Leaf<K, V> {
    pub(crate) fn new(parent: Option<NodeId>, capacity: usize) -> Self {
        Self {
            parent,
            slot: 0,
            entries: Vec::with_capacity(capacity),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Branch<K, V> {
    pub(crate) parent: Option<NodeId>,
    pub(crate) slot: usize,
    pub(crate) children: Vec<NodeId>,
    pub(crate) separators: Vec<Entry<K, V>>,
}

impl<K, V> Branch<K, V> {
    pub(crate) fn new(parent: Option<NodeId>, first_child: NodeId, capacity: usize) -> Self {
        let mut children = Vec::with_capacity(capacity + 2);
        children.push(first_child);
        Self {
            parent,
            slot: 0,
            children,
            separators: Vec::with_capacity(capacity + 1),
        }
    }

    /// Index of the last item; equal to the number of separators.
    #[inline]
    pub(crate) fn last_index(&self) -> usize {
        self.separators.len()
    }

    #[inline]
    pub(crate) fn separator(&self, item: usize) -> &Entry<K, V> {
        &self.separators[item - 1]
    }

    #[inline]
    pub(crate) fn separator_mut(&mut self, item: usize) -> &mut Entry<K, V> {
        &mut self.separators[item - 1]
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Node<K, V> {
    Leaf(Leaf<K, V>),
    Branch(Branch<K, V>),
}

impl<K, V> Node<K, V> {
    #[inline]
    pub(crate) const fn parent(&self) -> Option<NodeId> {
        match self {
            Self::Leaf(leaf) => leaf.parent,
            Self::Branch(branch) => branch.parent,
        }
    }

    #[inline]
    pub(crate) const fn slot(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.slot,
            Self::Branch(branch) => branch.slot,
        }
    }

    #[inline]
    pub(crate) fn set_link(&mut self, parent: Option<NodeId>, slot: usize) {
        match self {
            Self::Leaf(leaf) => {
                leaf.parent = parent;
                leaf.slot = slot;
            }
            Self::Branch(branch) => {
                branch.parent = parent;
                branch.slot = slot;
            }
        }
    }

    #[inline]
    pub(crate) const fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Entries physically stored in this node.
    #[inline]
    pub(crate) fn physical(&self) -> usize {
        match self {
            Self::Leaf(leaf) => leaf.entries.len(),
            Self::Branch(branch) => branch.separators.len(),
        }
    }

    /// Physical entries plus the separator borrowed from the parent.
    #[inline]
    pub(crate) fn virtual_entries(&self) -> usize {
        self.physical() + 1
    }

    /// The entry at `index`, using leaf or branch item numbering.
    #[inline]
    pub(crate) fn entry(&self, index: usize) -> &Entry<K, V> {
        match self {
            Self::Leaf(leaf) => &leaf.entries[index],
            Self::Branch(branch) => branch.separator(index),
        }
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut Entry<K, V> {
        match self {
            Self::Leaf(leaf) => &mut leaf.entries[index],
            Self::Branch(branch) => branch.separator_mut(index),
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

const MISSING_NODE: &str = "node id does not refer to a live node";
const NOT_A_LEAF: &str = "expected a leaf node";
const NOT_A_BRANCH: &str = "expected a branch node";

/// Slab of nodes with a free list for recycled ids.
#[derive(Clone, Debug)]
pub(crate) struct Arena<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<NodeId>,
}

impl<K, V> Arena<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn allocate(&mut self, node: Node<K, V>) -> NodeId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(node);
            id
        } else {
            let raw = u32::try_from(self.slots.len())
                .unwrap_or_else(|_| panic!("node arena exceeded {} nodes", u32::MAX));
            self.slots.push(Some(node));
            NodeId(raw)
        }
    }

    pub(crate) fn release(&mut self, id: NodeId) -> Node<K, V> {
        let node = self.slots[id.index()]
            .take()
            .unwrap_or_else(|| unreachable!("{MISSING_NODE}: {id:?}"));
        self.free.push(id);
        node
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Number of live nodes.
    pub(crate) fn live(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node<K, V> {
        self.slots[id.index()]
            .as_ref()
            .unwrap_or_else(|| unreachable!("{MISSING_NODE}: {id:?}"))
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.slots[id.index()]
            .as_mut()
            .unwrap_or_else(|| unreachable!("{MISSING_NODE}: {id:?}"))
    }

    #[inline]
    pub(crate) fn leaf(&self, id: NodeId) -> &Leaf<K, V> {
        match self.get(id) {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => unreachable!("{NOT_A_LEAF}: {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<K, V> {
        match self.get_mut(id) {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => unreachable!("{NOT_A_LEAF}: {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn branch(&self, id: NodeId) -> &Branch<K, V> {
        match self.get(id) {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => unreachable!("{NOT_A_BRANCH}: {id:?}"),
        }
    }

    #[inline]
    pub(crate) fn branch_mut(&mut self, id: NodeId) -> &mut Branch<K, V> {
        match self.get_mut(id) {
            Node::Branch(branch) => branch,
            Node::Leaf(_) => unreachable!("{NOT_A_BRANCH}: {id:?}"),
        }
    }

    /// Hands out a mutable borrow of every entry at once, indexed by node id
    /// and then by position index.
    pub(crate) fn entry_table_mut(&mut self) -> Vec<Vec<Option<&mut Entry<K, V>>>> {
        self.slots
            .iter_mut()
            .map(|slot| match slot {
                Some(Node::Leaf(leaf)) => leaf.entries.iter_mut().map(Some).collect(),
                Some(Node::Branch(branch)) => std::iter::once(None)
                    .chain(branch.separators.iter_mut().map(Some))
                    .collect(),
                None => Vec::new(),
            })
            .collect()
    }

    /// Consumes the arena into owned entries, indexed like
    /// [`Arena::entry_table_mut`].
    pub(crate) fn into_entry_table(self) -> Vec<Vec<Option<Entry<K, V>>>> {
        self.slots
            .into_iter()
            .map(|slot| match slot {
                Some(Node::Leaf(leaf)) => leaf.entries.into_iter().map(Some).collect(),
                Some(Node::Branch(branch)) => std::iter::once(None)
                    .chain(branch.separators.into_iter().map(Some))
                    .collect(),
                None => Vec::new(),
            })
            .collect()
    }
}

// =============================================================================
// In-node search
// =============================================================================

/// Locates `key` among sorted `entries`.
///
/// Returns `Ok(index)` when an entry compares equal, otherwise
/// `Err(index)` where `index` is the number of entries sorting before `key`.
pub(crate) fn locate<K, V, C, Q>(
    strategy: SearchStrategy,
    entries: &[Entry<K, V>],
    key: &Q,
    comparator: &C,
) -> Result<usize, usize>
where
    K: Borrow<Q>,
    C: Comparator<Q>,
    Q: ?Sized,
{
    match strategy {
        SearchStrategy::Linear => {
            for (index, entry) in entries.iter().enumerate() {
                match comparator.compare(entry.key.borrow(), key) {
                    Ordering::Less => {}
                    Ordering::Equal => return Ok(index),
                    Ordering::Greater => return Err(index),
                }
            }
            Err(entries.len())
        }
        SearchStrategy::Binary => {
            entries.binary_search_by(|entry| comparator.compare(entry.key.borrow(), key))
        }
    }
}

/// Number of entries sorting strictly before `key`.
#[inline]
pub(crate) fn count_less<K, V, C, Q>(
    strategy: SearchStrategy,
    entries: &[Entry<K, V>],
    key: &Q,
    comparator: &C,
) -> usize
where
    K: Borrow<Q>,
    C: Comparator<Q>,
    Q: ?Sized,
{
    match locate(strategy, entries, key, comparator) {
        Ok(index) | Err(index) => index,
    }
}

/// Number of entries sorting before or equal to `key`.
#[inline]
pub(crate) fn count_not_greater<K, V, C, Q>(
    strategy: SearchStrategy,
    entries: &[Entry<K, V>],
    key: &Q,
    comparator: &C,
) -> usize
where
    K: Borrow<Q>,
    C: Comparator<Q>,
    Q: ?Sized,
{
    match locate(strategy, entries, key, comparator) {
        Ok(index) => index + 1,
        Err(index) => index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::comparator::NaturalOrder;
    use rstest::rstest;

    fn entries(keys: &[i32]) -> Vec<Entry<i32, ()>> {
        keys.iter().map(|&key| Entry::new(key, ())).collect()
    }

    #[rstest]
    #[case(SearchStrategy::Linear)]
    #[case(SearchStrategy::Binary)]
    fn test_locate_found(#[case] strategy: SearchStrategy) {
        let slice = entries(&[10, 20, 30, 40]);
        assert_eq!(locate(strategy, &slice, &30, &NaturalOrder), Ok(2));
        assert_eq!(locate(strategy, &slice, &10, &NaturalOrder), Ok(0));
    }

    #[rstest]
    #[case(SearchStrategy::Linear, 5, 0)]
    #[case(SearchStrategy::Linear, 25, 2)]
    #[case(SearchStrategy::Linear, 45, 4)]
    #[case(SearchStrategy::Binary, 5, 0)]
    #[case(SearchStrategy::Binary, 25, 2)]
    #[case(SearchStrategy::Binary, 45, 4)]
    fn test_locate_vacant(
        #[case] strategy: SearchStrategy,
        #[case] key: i32,
        #[case] expected: usize,
    ) {
        let slice = entries(&[10, 20, 30, 40]);
        assert_eq!(locate(strategy, &slice, &key, &NaturalOrder), Err(expected));
    }

    #[rstest]
    #[case(SearchStrategy::Linear)]
    #[case(SearchStrategy::Binary)]
    fn test_counts(#[case] strategy: SearchStrategy) {
        let slice = entries(&[10, 20, 30]);
        assert_eq!(count_less(strategy, &slice, &20, &NaturalOrder), 1);
        assert_eq!(count_not_greater(strategy, &slice, &20, &NaturalOrder), 2);
        assert_eq!(count_less(strategy, &slice, &15, &NaturalOrder), 1);
        assert_eq!(count_not_greater(strategy, &slice, &15, &NaturalOrder), 1);
        assert_eq!(count_less(strategy, &entries(&[]), &15, &NaturalOrder), 0);
    }

    #[rstest]
    fn test_arena_recycles_ids() {
        let mut arena: Arena<i32, ()> = Arena::new();
        let first = arena.allocate(Node::Leaf(Leaf::new(None, 4)));
        let second = arena.allocate(Node::Leaf(Leaf::new(None, 4)));
        assert_eq!(arena.live(), 2);

        arena.release(first);
        assert_eq!(arena.live(), 1);

        let third = arena.allocate(Node::Leaf(Leaf::new(None, 4)));
        assert_eq!(third, first);
        assert_ne!(third, second);
        assert_eq!(arena.live(), 2);
    }

    #[rstest]
    fn test_branch_item_numbering() {
        let mut arena: Arena<i32, ()> = Arena::new();
        let left = arena.allocate(Node::Leaf(Leaf::new(None, 4)));
        let right = arena.allocate(Node::Leaf(Leaf::new(None, 4)));
        let mut branch = Branch::new(None, left, 3);
        branch.children.push(right);
        branch.separators.push(Entry::new(50, ()));

        assert_eq!(branch.last_index(), 1);
        assert_eq!(branch.separator(1).key, 50);

        let node = Node::Branch(branch);
        assert_eq!(node.physical(), 1);
        assert_eq!(node.virtual_entries(), 2);
        assert_eq!(node.entry(1).key, 50);
    }
}
