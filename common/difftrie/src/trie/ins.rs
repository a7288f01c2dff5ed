use nodepool::Ptr;

use super::Result;
use crate::nodes::{differing_bits, Branch, Leaf, LeafInsert, Node, FANOUT};

/// Context for [`super::IntSet::insert`] operation.
pub(super) struct Context<'a, A: nodepool::Allocator<Value = Node>> {
    /// Element being inserted.
    elt: u32,

    /// Allocator used to allocate new nodes.
    alloc: &'a mut A,
}

impl<'a, A: nodepool::Allocator<Value = Node>> Context<'a, A> {
    pub(super) fn new(alloc: &'a mut A, elt: u32) -> Self {
        Self { elt, alloc }
    }

    /// Inserts the element, descending from the root slot.
    ///
    /// The descent carries the slot the current node was read from as
    /// an `(owner, child index)` pair (`None` meaning the root) so that
    /// a freshly created leaf can be written back into the exact slot
    /// visited.
    pub(super) fn insert(mut self, root: &mut Option<Ptr>) -> Result<bool> {
        let mut slot: Option<(Ptr, usize)> = None;
        let mut cur = *root;
        loop {
            let ptr = match cur {
                Some(ptr) => ptr,
                None => {
                    // Reached an empty slot: the element gets a leaf of
                    // its own.
                    let ptr = self.alloc.alloc(Leaf::single(self.elt).into())?;
                    match slot {
                        None => *root = Some(ptr),
                        Some((owner, idx)) => self.set_child(owner, idx, ptr),
                    }
                    return Ok(true);
                }
            };
            let outcome = match self.alloc.get_mut(ptr) {
                Node::Leaf(leaf) => leaf.insert(self.elt),
                Node::Branch(branch) => {
                    let idx = branch.child_index(self.elt);
                    cur = branch.children[idx];
                    slot = Some((ptr, idx));
                    continue;
                }
            };
            match outcome {
                LeafInsert::Inserted => return Ok(true),
                LeafInsert::Found => return Ok(false),
                // The leaf at `ptr` is full.  Replace it with a branch;
                // `cur` still names the same slot, so the next loop
                // iteration descends through the branch and places the
                // pending element in the right bucket (creating a fresh
                // leaf or, in principle, splitting again).
                LeafInsert::Overflow => self.split_leaf(ptr)?,
            }
        }
    }

    /// Replaces the full leaf at `ptr` with a branch redistributing its
    /// elements.
    ///
    /// The branch takes over the leaf’s own slot in the pool, so the
    /// parent’s reference stays valid without write-back.  The pending
    /// element is *not* inserted here; the caller resumes the descent
    /// through the new branch.
    ///
    /// If allocating a child leaf fails, the children allocated so far
    /// are freed and the original leaf is put back, so the set is
    /// observably unchanged when the error surfaces.
    fn split_leaf(&mut self, ptr: Ptr) -> Result<()> {
        let mask = match self.alloc.get(ptr) {
            Node::Leaf(leaf) => differing_bits(leaf.as_slice()),
            Node::Branch(_) => unreachable!("split target is always a leaf"),
        };
        let leaf = match core::mem::replace(
            self.alloc.get_mut(ptr),
            Branch::new(mask).into(),
        ) {
            Node::Leaf(leaf) => leaf,
            Node::Branch(_) => unreachable!(),
        };

        let mut children = [None; FANOUT];
        match self.distribute(mask, &leaf, &mut children) {
            Ok(()) => {
                match self.alloc.get_mut(ptr) {
                    Node::Branch(branch) => branch.children = children,
                    Node::Leaf(_) => unreachable!(),
                }
                Ok(())
            }
            Err(err) => {
                for child in children.into_iter().flatten() {
                    self.alloc.free(child);
                }
                self.alloc.set(ptr, leaf.into());
                Err(err)
            }
        }
    }

    /// Routes every element of `leaf` into its bucket under `mask`.
    ///
    /// The leaf is sorted and partitioning a sorted sequence is stable,
    /// so each bucket receives its elements in increasing order and the
    /// ordered append keeps every child leaf sorted.
    fn distribute(
        &mut self,
        mask: u32,
        leaf: &Leaf,
        children: &mut [Option<Ptr>; FANOUT],
    ) -> Result<()> {
        for &value in leaf.as_slice() {
            let idx = Branch::index_of(mask, value);
            match children[idx] {
                Some(child) => match self.alloc.get_mut(child) {
                    Node::Leaf(bucket) => bucket.push(value),
                    Node::Branch(_) => unreachable!(),
                },
                None => {
                    children[idx] =
                        Some(self.alloc.alloc(Leaf::single(value).into())?);
                }
            }
        }
        Ok(())
    }

    fn set_child(&mut self, owner: Ptr, idx: usize, child: Ptr) {
        match self.alloc.get_mut(owner) {
            Node::Branch(branch) => branch.children[idx] = Some(child),
            Node::Leaf(_) => unreachable!("slot owner is always a branch"),
        }
    }
}
