use alloc::vec::Vec;

use nodepool::Ptr;

#[cfg(test)]
mod tests;

/// Number of bit positions a branch discriminates on.
pub const BRANCH_BITS: u32 = 5;

/// Number of child slots in a branch, i.e. `2**BRANCH_BITS`.
pub const FANOUT: usize = 1 << BRANCH_BITS;

/// Maximum number of elements a leaf holds.
///
/// An insert into a leaf already holding this many elements replaces
/// the leaf with a branch redistributing its contents.
pub const MAX_LEAF_LEN: usize = 64;

/// A trie node as kept in the pool.
///
/// There are two kinds of nodes: leaves and branches.  An *empty*
/// subtree is not represented by a node at all; it is a `None` child
/// reference (or root), so the pool only ever holds nodes with at least
/// one element beneath them.
///
/// A leaf holds a strictly increasing vector of between one and
/// [`MAX_LEAF_LEN`] elements.  A branch holds a mask naming exactly
/// [`BRANCH_BITS`] bit positions together with [`FANOUT`] child
/// references.  Every element stored beneath child slot `i` of a branch
/// projects onto `i` when its mask bits are extracted (see
/// [`Branch::index_of`]); the tree operations rely on this to descend
/// without comparisons.
#[derive(Clone, Debug, PartialEq, Eq, derive_more::From)]
pub enum Node {
    Leaf(Leaf),
    Branch(Branch),
}

/// A sorted vector of distinct elements.
///
/// Growth uses `Vec`’s amortised doubling; capacity is never shrunk on
/// removal so a leaf oscillating around some size does not thrash the
/// allocator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf(Vec<u32>);

/// Result of a leaf-local insert.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LeafInsert {
    /// The element has been added to the leaf.
    Inserted,
    /// The element was already present; the leaf is unchanged.
    Found,
    /// The leaf is full ([`MAX_LEAF_LEN`] elements) and the element is
    /// absent; the caller must split the leaf into a branch.
    Overflow,
}

/// A dispatch table over [`BRANCH_BITS`] dynamically chosen bits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Branch {
    /// Bit positions this branch discriminates on; popcount is always
    /// [`BRANCH_BITS`].
    mask: u32,
    /// Child references indexed by the mask projection of the element.
    pub(crate) children: [Option<Ptr>; FANOUT],
}

impl Leaf {
    /// Constructs a leaf holding a single element.
    pub fn single(elt: u32) -> Self {
        let mut values = Vec::with_capacity(1);
        values.push(elt);
        Self(values)
    }

    /// Returns the smallest index whose element is not less than `elt`,
    /// or `len()` if there is none.
    pub fn locate(&self, elt: u32) -> usize {
        self.0.partition_point(|&value| value < elt)
    }

    pub fn contains(&self, elt: u32) -> bool {
        self.0.get(self.locate(elt)) == Some(&elt)
    }

    /// Inserts `elt` keeping the vector sorted and distinct.
    ///
    /// Never grows the leaf past [`MAX_LEAF_LEN`]; see [`LeafInsert`].
    pub fn insert(&mut self, elt: u32) -> LeafInsert {
        let at = self.locate(elt);
        if self.0.get(at) == Some(&elt) {
            LeafInsert::Found
        } else if self.0.len() == MAX_LEAF_LEN {
            LeafInsert::Overflow
        } else {
            self.0.insert(at, elt);
            LeafInsert::Inserted
        }
    }

    /// Removes `elt` if present; returns whether it was found.
    ///
    /// May leave the leaf empty.  The caller is responsible for freeing
    /// an emptied leaf and clearing the reference to it, restoring the
    /// one-element minimum the rest of the structure assumes.
    pub fn remove(&mut self, elt: u32) -> bool {
        let at = self.locate(elt);
        if self.0.get(at) == Some(&elt) {
            self.0.remove(at);
            true
        } else {
            false
        }
    }

    /// Appends an element known to be greater than every element held.
    ///
    /// Restricted form of [`Leaf::insert`] used when redistributing
    /// a sorted leaf into split buckets: elements arrive at each bucket
    /// in increasing order, so the search and shift can be skipped.
    pub fn push(&mut self, elt: u32) {
        debug_assert!(self.0.last().map_or(true, |&last| last < elt));
        self.0.push(elt);
    }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn as_slice(&self) -> &[u32] { self.0.as_slice() }
}

impl Branch {
    /// Constructs a branch with given mask and all children empty.
    pub fn new(mask: u32) -> Self {
        debug_assert_eq!(BRANCH_BITS, mask.count_ones());
        Self { mask, children: [None; FANOUT] }
    }

    /// Bit positions this branch discriminates on.
    pub fn mask(&self) -> u32 { self.mask }

    /// Returns the child slot `elt` routes to.
    pub fn child_index(&self, elt: u32) -> usize {
        Self::index_of(self.mask, elt)
    }

    /// Extracts the bits of `elt` at the positions named by `mask`,
    /// packed into an index with the lowest mask position becoming bit
    /// zero.
    ///
    /// This is a software PEXT over an at-most-[`BRANCH_BITS`]-bit
    /// mask; with a five-bit mask the result is in `0..FANOUT`.
    pub fn index_of(mask: u32, elt: u32) -> usize {
        let mut mask = mask;
        let mut index = 0;
        let mut at = 0;
        while mask != 0 {
            let bit = mask & mask.wrapping_neg();
            // Works because bit is a subset of mask.
            mask ^= bit;
            index |= u32::from(elt & bit != 0) << at;
            at += 1;
        }
        index as usize
    }
}

/// Picks the mask for splitting a full leaf.
///
/// Scans the sorted values left to right, accumulating the lowest
/// still-unset bit of `values[0] ^ value` each time one exists, and
/// stops once [`BRANCH_BITS`] bits have been gathered.  The choice is
/// a greedy heuristic: it takes the first five positions, in array
/// order, where some element differs from the first, rather than
/// searching for the most balanced split.
///
/// The structure’s invariants guarantee five bits are found before the
/// scan runs out: the values are distinct and there are at least
/// [`MAX_LEAF_LEN`] of them, while five bit positions can only tell
/// apart thirty-two.  That is a property of the data, checked here only
/// by a debug assertion.
pub fn differing_bits(values: &[u32]) -> u32 {
    debug_assert!(values.len() >= 2);
    let base = values[0];
    let mut bits = 0u32;
    let mut left = BRANCH_BITS;
    for &value in values {
        let diff = (base ^ value) & !bits;
        if diff != 0 {
            bits |= diff & diff.wrapping_neg();
            left -= 1;
            if left == 0 {
                break;
            }
        }
    }
    debug_assert_eq!(BRANCH_BITS, bits.count_ones());
    bits
}
