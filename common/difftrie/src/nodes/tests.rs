use pretty_assertions::assert_eq;

use crate::nodes::{differing_bits, Branch, Leaf, LeafInsert, MAX_LEAF_LEN};

/// Builds a leaf from a strictly increasing list of values.
fn leaf(values: &[u32]) -> Leaf {
    let mut leaf = Leaf::single(values[0]);
    for &value in &values[1..] {
        leaf.push(value);
    }
    leaf
}

#[test]
fn test_leaf_single() {
    let leaf = Leaf::single(42);
    assert_eq!(1, leaf.len());
    assert_eq!(&[42], leaf.as_slice());
    assert!(leaf.contains(42));
    assert!(!leaf.contains(41));
}

#[test]
fn test_leaf_locate() {
    let leaf = leaf(&[10, 20, 30]);
    assert_eq!(0, leaf.locate(5));
    assert_eq!(0, leaf.locate(10));
    assert_eq!(1, leaf.locate(15));
    assert_eq!(1, leaf.locate(20));
    assert_eq!(2, leaf.locate(30));
    assert_eq!(3, leaf.locate(31));
}

#[test]
fn test_leaf_insert_keeps_order() {
    let mut leaf = leaf(&[10, 30]);
    assert_eq!(LeafInsert::Inserted, leaf.insert(20));
    assert_eq!(LeafInsert::Inserted, leaf.insert(5));
    assert_eq!(LeafInsert::Inserted, leaf.insert(40));
    assert_eq!(&[5, 10, 20, 30, 40], leaf.as_slice());
}

#[test]
fn test_leaf_insert_duplicate() {
    let mut leaf = leaf(&[10, 20, 30]);
    assert_eq!(LeafInsert::Found, leaf.insert(20));
    assert_eq!(&[10, 20, 30], leaf.as_slice());
}

#[test]
fn test_leaf_insert_overflow() {
    // Even values 0, 2, …, 126 fill the leaf to the brim.
    let mut full = Leaf::single(0);
    for value in 1..MAX_LEAF_LEN as u32 {
        full.push(value * 2);
    }
    assert_eq!(MAX_LEAF_LEN, full.len());
    assert_eq!(LeafInsert::Overflow, full.insert(1));
    // Presence wins over overflow: a duplicate is still a no-op.
    assert_eq!(LeafInsert::Found, full.insert(2));
    assert_eq!(MAX_LEAF_LEN, full.len());
}

#[test]
fn test_leaf_remove() {
    let mut leaf = leaf(&[10, 20, 30]);
    assert!(!leaf.remove(15));
    assert!(leaf.remove(20));
    assert_eq!(&[10, 30], leaf.as_slice());
    assert!(!leaf.remove(20));
    assert!(leaf.remove(10));
    assert!(leaf.remove(30));
    assert!(leaf.is_empty());
}

#[test]
fn test_differing_bits_sequential() {
    // Diffs against base 0 contribute, in scan order, bits 0, 1, 2, 3
    // and 4; values whose diff lies within already chosen bits are
    // skipped.
    assert_eq!(0x1F, differing_bits(&[0, 1, 2, 3, 4, 5, 6, 7, 8, 16]));
    assert_eq!(0x1F, differing_bits(&[0, 1, 3, 7, 15, 31]));
}

#[test]
fn test_differing_bits_scattered() {
    // Bits are accumulated in scan order, not numeric order, and may
    // come from anywhere in the word.
    assert_eq!(
        0x8000_014A,
        differing_bits(&[0, 0x8000_0000, 0x100, 0x2, 0x40, 0x8]),
    );
}

#[test]
fn test_differing_bits_lowest_of_diff() {
    // A value differing in several positions contributes only the
    // lowest still-unset one: 24 yields bit 3, 88 yields bit 4 (not
    // bit 6), even though both also differ higher up.
    assert_eq!(0x9B, differing_bits(&[0, 24, 25, 88, 128, 2]));
}

#[test]
fn test_differing_bits_nonzero_base() {
    // Base is the first element, not zero.
    assert_eq!(0x37, differing_bits(&[5, 4, 6, 1, 21, 37]));
}

#[test]
fn test_index_of_contiguous_mask() {
    assert_eq!(22, Branch::index_of(0x1F, 0b10110));
    assert_eq!(0, Branch::index_of(0x1F, 0xFFFF_FFE0));
    assert_eq!(31, Branch::index_of(0x1F, u32::MAX));
}

#[test]
fn test_index_of_scattered_mask() {
    // Mask bits 1, 4, 9, 17 and 31 map to index bits 0 through 4.
    const MASK: u32 = 0x8002_0212;
    assert_eq!(0, Branch::index_of(MASK, 0));
    assert_eq!(0, Branch::index_of(MASK, !MASK));
    assert_eq!(9, Branch::index_of(MASK, 0x2_0002));
    assert_eq!(16, Branch::index_of(MASK, 0x8000_0000));
    assert_eq!(31, Branch::index_of(MASK, MASK));
}

#[test]
fn test_branch_new() {
    let branch = Branch::new(0x1F);
    assert_eq!(0x1F, branch.mask());
    assert!(branch.children.iter().all(Option::is_none));
    assert_eq!(5, Branch::index_of(branch.mask(), 0b00101));
}
