//! Uninitialized element storage drawn from an allocator

use core::ptr::NonNull;

use crate::allocator::{Allocator, TypedAllocator};
use crate::error::MemoryResult;

/// Owned region of `cap` uninitialized `T` slots
///
/// Does not hold its allocator; the owner passes the same one to every call.
pub(super) struct RawStorage<T> {
    pub(super) ptr: NonNull<T>,
    pub(super) cap: usize,
}

impl<T> RawStorage<T> {
    /// No storage at all
    pub(super) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    /// Requests room for `cap` elements
    pub(super) fn allocate_in<A: Allocator>(cap: usize, alloc: &A) -> MemoryResult<Self> {
        let ptr = alloc.allocate_array::<T>(cap)?;
        Ok(Self { ptr, cap })
    }

    /// Hands the region back
    ///
    /// # Safety
    /// `alloc` must be the allocator this storage came from, and no live
    /// element may remain in it.
    pub(super) unsafe fn release_in<A: Allocator>(self, alloc: &A) {
        if self.cap == 0 {
            return;
        }
        // SAFETY: ptr/cap match the allocate_array call in allocate_in
        unsafe { alloc.deallocate_array(self.ptr, self.cap) };
    }
}
