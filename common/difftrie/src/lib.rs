//! An unordered set of `u32` built on a *difference trie*.
//!
//! Difference tries are a variant of tries which attempt to mitigate
//! the shortcomings of tries at the cost of some of their nice
//! properties (mostly, ordering).  Each branch node carries a mask
//! naming the bit positions it discriminates on; the term arises
//! because each bit of the mask marks a position of a *difference*
//! between the keys stored under the branch.  Leaves hold sorted
//! vectors of up to 64 integers, so the structure touches far fewer
//! nodes per operation than a canonical bit-trie.
//!
//! Insert, lookup and removal are O(W) where W is the width of the key
//! (32 bits here, giving a maximum depth of seven branches).  Ordered
//! iteration is deliberately not offered: leaves are locally sorted but
//! branch child order follows bit extraction, not numeric order.
//!
//! ## Example
//!
//! ```
//! let mut set = difftrie::IntSet::new();
//! assert_eq!(Ok(true), set.insert(42));
//! assert_eq!(Ok(false), set.insert(42));
//! assert!(set.contains(42));
//! assert_eq!(1, set.len());
//! set.remove(42);
//! assert!(set.is_empty());
//! ```

#![no_std]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod nodes;
pub mod trie;

pub use nodepool::OutOfMemory;
pub use trie::IntSet;

pub trait Allocator: nodepool::Allocator<Value = nodes::Node> {}

impl<A: nodepool::Allocator<Value = nodes::Node>> Allocator for A {}
