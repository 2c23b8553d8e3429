//! Allocator traits
//!
//! # Safety
//!
//! [`Allocator`] is an unsafe trait: implementors promise that every region
//! they hand out is valid for reads and writes of `layout.size()` bytes,
//! aligned to `layout.align()`, and disjoint from every other region still
//! outstanding. Callers in turn promise to release a region only once, with
//! the layout it was requested with.
//!
//! Blanket impls for `&A` and `Rc<A>` forward every call to the underlying
//! allocator, so the contract carries through unchanged.

use core::alloc::Layout;
use core::ptr::NonNull;
use std::rc::Rc;

use super::{AllocError, AllocResult};

/// Raw byte-region allocator
///
/// # Safety
///
/// Implementors must ensure that:
/// - returned regions are aligned to `layout.align()` and hold at least
///   `layout.size()` bytes
/// - no two outstanding regions overlap
/// - a region stays valid until it is passed to [`Allocator::deallocate`]
///   or the allocator is dropped
pub unsafe trait Allocator {
    /// Allocates an uninitialized region for `layout`
    ///
    /// Zero-sized layouts yield an aligned dangling pointer that must still
    /// be handed back to [`Allocator::deallocate`] with the same layout.
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] when no region can be found.
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Releases a region previously obtained from [`Allocator::allocate`]
    ///
    /// # Safety
    /// - `ptr` must have been returned by this allocator for `layout`
    /// - the region must not be used after this call
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Returns true if `other` draws from the same underlying memory, so
    /// that a region obtained through one can be released through the other
    fn is_same(&self, _other: &Self) -> bool {
        false
    }
}

/// Typed helpers over [`Allocator`]
///
/// Blanket-implemented for every allocator.
pub trait TypedAllocator: Allocator {
    /// Allocates uninitialized storage for `count` values of `T`
    ///
    /// # Errors
    /// Returns [`AllocError::OutOfMemory`] if the byte size overflows or the
    /// allocator has no room.
    ///
    /// # Examples
    /// ```rust
    /// use fixmem_memory::allocator::TypedAllocator;
    /// use fixmem_memory::arena::FixedArena;
    ///
    /// let arena = FixedArena::new(256)?;
    /// let ptr = arena.allocate_array::<u32>(8)?;
    /// unsafe {
    ///     for i in 0..8 {
    ///         ptr.as_ptr().add(i).write(i as u32);
    ///     }
    ///     arena.deallocate_array(ptr, 8);
    /// }
    /// # Ok::<(), fixmem_memory::MemoryError>(())
    /// ```
    fn allocate_array<T>(&self, count: usize) -> AllocResult<NonNull<T>> {
        let layout = array_layout::<T>(count)?;
        Ok(self.allocate(layout)?.cast::<T>())
    }

    /// Releases storage obtained from [`TypedAllocator::allocate_array`]
    ///
    /// # Safety
    /// - `ptr` must come from `allocate_array::<T>(count)` on this allocator
    /// - the values in the region must already be dropped or moved out
    unsafe fn deallocate_array<T>(&self, ptr: NonNull<T>, count: usize) {
        // allocate_array already rejected counts whose layout overflows
        if let Ok(layout) = Layout::array::<T>(count) {
            // SAFETY: caller guarantees ptr/count match a prior allocate_array
            unsafe { self.deallocate(ptr.cast::<u8>(), layout) };
        }
    }
}

impl<A: Allocator + ?Sized> TypedAllocator for A {}

fn array_layout<T>(count: usize) -> AllocResult<Layout> {
    Layout::array::<T>(count).map_err(|_| AllocError::size_overflow(align_of::<T>()))
}

// ============================================================================
// Blanket implementations
// ============================================================================

// SAFETY: forwards every call to the referenced allocator.
unsafe impl<A: Allocator + ?Sized> Allocator for &A {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: same contract as A::deallocate
        unsafe { (**self).deallocate(ptr, layout) }
    }

    fn is_same(&self, other: &Self) -> bool {
        (**self).is_same(*other)
    }
}

// SAFETY: forwards every call to the shared allocator.
unsafe impl<A: Allocator + ?Sized> Allocator for Rc<A> {
    fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        (**self).allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: same contract as A::deallocate
        unsafe { (**self).deallocate(ptr, layout) }
    }

    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other) || (**self).is_same(other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::FixedArena;

    #[test]
    fn array_layout_overflow_is_out_of_memory() {
        let arena = FixedArena::new(64).unwrap();
        let err = arena.allocate_array::<u64>(usize::MAX).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(arena.live_blocks(), 0);
    }

    #[test]
    fn array_round_trip_frees_block() {
        let arena = FixedArena::new(128).unwrap();
        let ptr = arena.allocate_array::<u16>(10).unwrap();
        assert_eq!(arena.used(), 20);
        unsafe { arena.deallocate_array(ptr, 10) };
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn reference_and_rc_forward_identity() {
        let arena = FixedArena::new(64).unwrap();
        let other = FixedArena::new(64).unwrap();
        assert!(<&FixedArena as Allocator>::is_same(&&arena, &&arena));
        assert!(!<&FixedArena as Allocator>::is_same(&&arena, &&other));

        let shared = Rc::new(FixedArena::new(64).unwrap());
        let clone = Rc::clone(&shared);
        assert!(shared.is_same(&clone));
        assert!(!shared.is_same(&Rc::new(FixedArena::new(64).unwrap())));
    }
}
