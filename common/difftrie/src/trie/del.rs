use nodepool::Ptr;

use crate::nodes::Node;

/// Context for [`super::IntSet::remove`] operation.
pub(super) struct Context<'a, A: nodepool::Allocator<Value = Node>> {
    /// Element being removed.
    elt: u32,

    /// Allocator the nodes live in; removal only ever frees.
    alloc: &'a mut A,
}

impl<'a, A: nodepool::Allocator<Value = Node>> Context<'a, A> {
    pub(super) fn new(alloc: &'a mut A, elt: u32) -> Self {
        Self { elt, alloc }
    }

    /// Removes the element, descending from the root slot.
    ///
    /// Mirrors the insert descent: the slot the current node was read
    /// from travels along as an `(owner, child index)` pair so that
    /// a leaf emptied by the removal can be freed and its slot cleared.
    ///
    /// Branches are left in place even when their last child goes away;
    /// pruning is deliberately not performed.
    pub(super) fn remove(mut self, root: &mut Option<Ptr>) -> bool {
        let mut slot: Option<(Ptr, usize)> = None;
        let mut cur = *root;
        loop {
            let ptr = match cur {
                Some(ptr) => ptr,
                None => return false,
            };
            let emptied = match self.alloc.get_mut(ptr) {
                Node::Leaf(leaf) => {
                    if !leaf.remove(self.elt) {
                        return false;
                    }
                    leaf.is_empty()
                }
                Node::Branch(branch) => {
                    let idx = branch.child_index(self.elt);
                    cur = branch.children[idx];
                    slot = Some((ptr, idx));
                    continue;
                }
            };
            if emptied {
                // That was the leaf’s last element; release it and
                // empty the slot that pointed at it.
                self.alloc.free(ptr);
                match slot {
                    None => *root = None,
                    Some((owner, idx)) => self.clear_child(owner, idx),
                }
            }
            return true;
        }
    }

    fn clear_child(&mut self, owner: Ptr, idx: usize) {
        match self.alloc.get_mut(owner) {
            Node::Branch(branch) => branch.children[idx] = None,
            Node::Leaf(_) => unreachable!("slot owner is always a branch"),
        }
    }
}
