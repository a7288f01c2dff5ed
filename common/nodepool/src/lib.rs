#![no_std]
extern crate alloc;

use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroU32;

/// A non-null handle to a slot in a node pool.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    derive_more::Into,
)]
#[repr(transparent)]
pub struct Ptr(NonZeroU32);

#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
#[display(fmt = "out of memory")]
pub struct OutOfMemory;

impl Ptr {
    /// Constructs a new pointer from given address.
    ///
    /// Returns `None` if the address is zero, i.e. a null pointer.
    ///
    /// ## Example
    ///
    /// ```
    /// assert!(nodepool::Ptr::new(0).is_none());
    /// assert_eq!(42, nodepool::Ptr::new(42).unwrap().get());
    /// ```
    pub const fn new(addr: u32) -> Option<Ptr> {
        // Using match so the function is const
        match NonZeroU32::new(addr) {
            None => None,
            Some(num) => Some(Self(num)),
        }
    }

    /// Returns the numeric value of the pointer.
    pub const fn get(self) -> u32 { self.0.get() }
}

impl fmt::Display for Ptr {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(fmtr)
    }
}

impl fmt::Debug for Ptr {
    fn fmt(&self, fmtr: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(fmtr)
    }
}

/// An interface for memory management used by the trie.
///
/// The structure using the pool owns every allocated slot exclusively:
/// a [`Ptr`] returned from [`Allocator::alloc`] is held in exactly one
/// place and is handed back through [`Allocator::free`] exactly once.
pub trait Allocator {
    type Value;

    /// Allocates a new block and initialises it to given value.
    fn alloc(&mut self, value: Self::Value) -> Result<Ptr, OutOfMemory>;

    /// Returns shared reference to value stored at given pointer.
    ///
    /// May panic or return garbage if `ptr` is invalid.
    fn get(&self, ptr: Ptr) -> &Self::Value;

    /// Returns exclusive reference to value stored at given pointer.
    ///
    /// May panic or return garbage if `ptr` is invalid.
    fn get_mut(&mut self, ptr: Ptr) -> &mut Self::Value;

    /// Sets value at given pointer.
    fn set(&mut self, ptr: Ptr, value: Self::Value) {
        *self.get_mut(ptr) = value;
    }

    /// Frees a block.
    fn free(&mut self, ptr: Ptr);
}

/// A growable `Vec`-backed pool with a free list.
///
/// This is the default allocator.  Freed slots are kept on a free list
/// and handed out again before the pool grows.  Allocation fails only
/// once the 32-bit address space of [`Ptr`] is exhausted.
pub struct VecAllocator<T> {
    pool: Vec<Option<T>>,
    free_list: Vec<Ptr>,
    count: usize,
}

impl<T> VecAllocator<T> {
    pub fn new() -> Self {
        Self { pool: Vec::new(), free_list: Vec::new(), count: 0 }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pool: Vec::with_capacity(capacity),
            free_list: Vec::new(),
            count: 0,
        }
    }

    /// Number of currently allocated blocks.
    pub fn count(&self) -> usize { self.count }

    /// Gets index in the pool for the given pointer.
    fn index(ptr: Ptr) -> usize { ptr.get() as usize - 1 }
}

impl<T> Default for VecAllocator<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Allocator for VecAllocator<T> {
    type Value = T;

    fn alloc(&mut self, value: T) -> Result<Ptr, OutOfMemory> {
        let ptr = if let Some(ptr) = self.free_list.pop() {
            self.pool[Self::index(ptr)] = Some(value);
            ptr
        } else {
            let addr = u32::try_from(self.pool.len() + 1)
                .ok()
                .and_then(Ptr::new)
                .ok_or(OutOfMemory)?;
            self.pool.push(Some(value));
            addr
        };
        self.count += 1;
        Ok(ptr)
    }

    #[track_caller]
    fn get(&self, ptr: Ptr) -> &T {
        match &self.pool[Self::index(ptr)] {
            Some(value) => value,
            None => panic!("Tried to read freed block at {ptr}"),
        }
    }

    #[track_caller]
    fn get_mut(&mut self, ptr: Ptr) -> &mut T {
        match &mut self.pool[Self::index(ptr)] {
            Some(value) => value,
            None => panic!("Tried to access freed block at {ptr}"),
        }
    }

    #[track_caller]
    fn free(&mut self, ptr: Ptr) {
        match self.pool[Self::index(ptr)].take() {
            Some(_) => {
                self.free_list.push(ptr);
                self.count -= 1;
            }
            None => panic!("Tried to free freed block at {ptr}"),
        }
    }
}

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils {
    use super::*;

    /// A fixed-capacity allocator for tests.
    ///
    /// Refuses to grow past the capacity given at construction (which
    /// makes allocation failure reachable in tests) and panics on any
    /// use-after-free or double-free.
    pub struct TestAllocator<T> {
        capacity: usize,
        pool: Vec<Option<T>>,
        free_list: Vec<Ptr>,
        count: usize,
    }

    impl<T> TestAllocator<T> {
        pub fn new(capacity: usize) -> Self {
            Self {
                capacity,
                pool: Vec::with_capacity(capacity),
                free_list: Vec::new(),
                count: 0,
            }
        }

        /// Number of currently allocated blocks.
        pub fn count(&self) -> usize { self.count }

        fn index(ptr: Ptr) -> usize { ptr.get() as usize - 1 }

        /// Verifies that block has been allocated.  Panics if it hasn’t.
        #[track_caller]
        fn check_allocated(&self, action: &str, ptr: Ptr) -> usize {
            let index = Self::index(ptr);
            let adj = match self.pool.get(index) {
                None => "unallocated",
                Some(None) => "freed",
                Some(Some(_)) => return index,
            };
            panic!("Tried to {action} {adj} block at {ptr}")
        }
    }

    impl<T> Allocator for TestAllocator<T> {
        type Value = T;

        fn alloc(&mut self, value: T) -> Result<Ptr, OutOfMemory> {
            if let Some(ptr) = self.free_list.pop() {
                // Grab node from the free list.
                self.pool[Self::index(ptr)] = Some(value);
                self.count += 1;
                Ok(ptr)
            } else if self.pool.len() < self.capacity {
                // Grab a new node.
                self.pool.push(Some(value));
                self.count += 1;
                Ok(Ptr::new(self.pool.len() as u32).unwrap())
            } else {
                // No free node to allocate.
                Err(OutOfMemory)
            }
        }

        #[track_caller]
        fn get(&self, ptr: Ptr) -> &T {
            let idx = self.check_allocated("read", ptr);
            self.pool[idx].as_ref().unwrap()
        }

        #[track_caller]
        fn get_mut(&mut self, ptr: Ptr) -> &mut T {
            let idx = self.check_allocated("access", ptr);
            self.pool[idx].as_mut().unwrap()
        }

        #[track_caller]
        fn free(&mut self, ptr: Ptr) {
            let idx = self.check_allocated("free", ptr);
            self.pool[idx] = None;
            self.free_list.push(ptr);
            self.count -= 1;
        }
    }
}
