use core::fmt;

use nodepool::{OutOfMemory, Ptr};

use crate::nodes::Node;

mod del;
mod ins;

type Result<T, E = OutOfMemory> = core::result::Result<T, E>;

/// An unordered set of `u32` stored as a difference trie.
///
/// The set owns its entire subtree through the allocator `A`: every
/// node is referenced from exactly one child slot (or the root), so
/// there is no sharing and no internal synchronisation.  Concurrent
/// mutation must be excluded by the caller.
///
/// [`IntSet::insert`] is the only operation which allocates and thus
/// the only one which can fail; see [`OutOfMemory`].  A failed insert
/// leaves the set exactly as it was.
pub struct IntSet<A = nodepool::VecAllocator<Node>> {
    /// Root of the trie; `None` when no element has been inserted yet.
    ///
    /// Note that after removals the root may still be set while the set
    /// holds no elements: branches are never collapsed (see
    /// [`IntSet::remove`]).
    root: Option<Ptr>,
    /// Allocator owning the nodes.
    pub(crate) alloc: A,
}

impl IntSet {
    /// Constructs an empty set backed by a growable pool.
    pub fn new() -> Self {
        Self::with_allocator(nodepool::VecAllocator::new())
    }
}

impl Default for IntSet {
    fn default() -> Self { Self::new() }
}

impl<A: crate::Allocator> IntSet<A> {
    /// Constructs an empty set allocating nodes from `alloc`.
    ///
    /// The allocator is assumed to be fresh; pointers it hands out are
    /// owned by this set until freed back through [`IntSet::clear`] or
    /// element removal.
    pub fn with_allocator(alloc: A) -> Self { Self { root: None, alloc } }

    /// Inserts `elt` into the set.
    ///
    /// Returns whether the element was added, i.e. `Ok(false)` means it
    /// was already present and the set is unchanged.  O(W).
    ///
    /// Fails with [`OutOfMemory`] only if the allocator does; a failure
    /// mid-split is rolled back so the set is left untouched.
    pub fn insert(&mut self, elt: u32) -> Result<bool> {
        ins::Context::new(&mut self.alloc, elt).insert(&mut self.root)
    }

    /// Removes `elt` from the set.
    ///
    /// Returns whether the element was present.  O(W).  Never fails:
    /// removal only ever frees nodes.
    ///
    /// A branch whose children all become empty is *not* collapsed;
    /// dead branches persist until [`IntSet::clear`].  Lookups through
    /// them remain correct, they merely cost memory.
    pub fn remove(&mut self, elt: u32) -> bool {
        del::Context::new(&mut self.alloc, elt).remove(&mut self.root)
    }

    /// Returns whether `elt` is a member of the set.  O(W), no
    /// mutation.
    pub fn contains(&self, elt: u32) -> bool {
        let mut next = self.root;
        while let Some(ptr) = next {
            match self.alloc.get(ptr) {
                Node::Leaf(leaf) => return leaf.contains(elt),
                Node::Branch(branch) => {
                    next = branch.children[branch.child_index(elt)];
                }
            }
        }
        false
    }

    /// Returns the number of elements in the set.
    ///
    /// O(number of nodes): the count is not cached, the whole tree is
    /// traversed summing leaf lengths.
    pub fn len(&self) -> usize { self.subtree_len(self.root) }

    /// Returns whether the set holds no elements.
    ///
    /// O(number of nodes) like [`IntSet::len`]: because dead branches
    /// are not pruned, a set may be empty while `root` is still set.
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// Releases every node, leaving the set empty and reusable.
    ///
    /// Dropping the set releases the allocator (and with it the pool)
    /// as well; `clear` is for handing the allocator back in a state
    /// where every block has been freed.
    pub fn clear(&mut self) {
        if let Some(ptr) = self.root.take() {
            self.free_subtree(ptr);
        }
    }

    fn subtree_len(&self, ptr: Option<Ptr>) -> usize {
        match ptr.map(|ptr| self.alloc.get(ptr)) {
            None => 0,
            Some(Node::Leaf(leaf)) => leaf.len(),
            Some(Node::Branch(branch)) => branch
                .children
                .iter()
                .map(|&child| self.subtree_len(child))
                .sum(),
        }
    }

    /// Frees the node at `ptr` and, bottom-up, everything below it.
    ///
    /// Recursion depth is bounded by the trie depth (at most seven for
    /// 32-bit elements).
    fn free_subtree(&mut self, ptr: Ptr) {
        if let Node::Branch(branch) = self.alloc.get_mut(ptr) {
            let children =
                core::mem::replace(&mut branch.children, [None; crate::nodes::FANOUT]);
            for child in children.into_iter().flatten() {
                self.free_subtree(child);
            }
        }
        self.alloc.free(ptr);
    }

    fn fmt_node(
        &self,
        fmtr: &mut fmt::Formatter,
        ptr: Ptr,
        depth: usize,
    ) -> fmt::Result {
        match self.alloc.get(ptr) {
            Node::Leaf(leaf) => write!(fmtr, "Leaf {:?}", leaf.as_slice()),
            Node::Branch(branch) => {
                write!(fmtr, "Branch mask={:#010x}", branch.mask())?;
                for (idx, child) in branch.children.iter().enumerate() {
                    if let Some(child) = child {
                        write!(
                            fmtr,
                            "\n{:width$}{idx:02}: ",
                            "",
                            width = (depth + 1) * 4
                        )?;
                        self.fmt_node(fmtr, *child, depth + 1)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Renders the tree shape: branch masks and leaf contents, children
/// labelled by their slot index.  Meant for test diagnostics.
impl<A: crate::Allocator> fmt::Debug for IntSet<A> {
    fn fmt(&self, fmtr: &mut fmt::Formatter) -> fmt::Result {
        match self.root {
            None => write!(fmtr, "(empty)"),
            Some(ptr) => self.fmt_node(fmtr, ptr, 0),
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
impl IntSet<nodepool::test_utils::TestAllocator<Node>> {
    /// Constructs a set backed by a fixed-capacity test allocator.
    pub fn test(capacity: usize) -> Self {
        Self::with_allocator(nodepool::test_utils::TestAllocator::new(capacity))
    }
}
