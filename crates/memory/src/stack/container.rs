use core::fmt;
use core::marker::PhantomData;
use core::{mem, ptr, slice};

#[cfg(feature = "logging")]
use tracing::{debug, warn};

use super::iter::{Iter, IterMut};
use super::raw::RawStorage;
use super::{INITIAL_CAPACITY, SHRINK_DIVISOR, SHRINK_FLOOR};
use crate::allocator::Allocator;
use crate::error::{MemoryError, MemoryResult};

/// LIFO container whose storage comes from an [`Allocator`]
///
/// Elements live in one contiguous region. A push onto a full stack doubles
/// the capacity (starting at [`INITIAL_CAPACITY`]); a pop that leaves the
/// stack less than a quarter full halves it again once the capacity is
/// above [`SHRINK_FLOOR`]. Every capacity change moves the elements into a
/// fresh region before the old one is released.
///
/// # Examples
/// ```rust
/// use fixmem_memory::arena::FixedArena;
/// use fixmem_memory::stack::Stack;
///
/// let arena = FixedArena::new(1024)?;
/// let mut stack = Stack::new_in(&arena);
///
/// stack.push(1)?;
/// stack.push(2)?;
/// stack.push(3)?;
///
/// assert_eq!(*stack.top()?, 3);
/// assert_eq!(stack.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// assert_eq!(stack.pop(), Some(3));
/// # Ok::<(), fixmem_memory::MemoryError>(())
/// ```
pub struct Stack<T, A: Allocator> {
    buf: RawStorage<T>,
    len: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: Allocator> Stack<T, A> {
    /// Creates an empty stack; nothing is allocated until the first push
    pub const fn new_in(alloc: A) -> Self {
        Self {
            buf: RawStorage::empty(),
            len: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of elements the current storage holds
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.cap
    }

    /// The allocator backing this stack
    pub fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Pushes a value on top
    ///
    /// Grows the storage when full. If growing fails the stack is left as
    /// it was and `value` is dropped.
    pub fn push(&mut self, value: T) -> MemoryResult<()> {
        if self.len == self.buf.cap {
            self.grow()?;
        }

        // SAFETY: len < cap after the check above, so the slot is allocated
        // and currently uninitialized
        unsafe { self.buf.ptr.as_ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes the top value and hands it back
    ///
    /// Returns `None` on an empty stack.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }

        self.len -= 1;
        // SAFETY: the slot at the old top was initialized and is now outside
        // the live range, so it is read exactly once
        let value = unsafe { self.buf.ptr.as_ptr().add(self.len).read() };
        self.shrink_if_sparse();
        Some(value)
    }

    /// Reference to the top value
    ///
    /// # Errors
    /// Returns [`MemoryError::OutOfRange`] if the stack is empty.
    pub fn top(&self) -> MemoryResult<&T> {
        self.as_slice()
            .last()
            .ok_or_else(|| MemoryError::empty_stack("top"))
    }

    /// Mutable reference to the top value
    ///
    /// # Errors
    /// Returns [`MemoryError::OutOfRange`] if the stack is empty.
    pub fn top_mut(&mut self) -> MemoryResult<&mut T> {
        self.as_mut_slice()
            .last_mut()
            .ok_or_else(|| MemoryError::empty_stack("top_mut"))
    }

    /// Drops every element and releases the storage
    pub fn clear(&mut self) {
        let live = ptr::slice_from_raw_parts_mut(self.buf.ptr.as_ptr(), self.len);
        self.len = 0;
        // SAFETY: the first `len` slots were initialized; len is already
        // zero so a panicking destructor cannot cause a double drop
        unsafe { ptr::drop_in_place(live) };

        let old = mem::replace(&mut self.buf, RawStorage::empty());
        // SAFETY: storage came from self.alloc and holds no live element
        unsafe { old.release_in(&self.alloc) };
    }

    /// Iterates from the top of the stack down to the bottom
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.as_slice())
    }

    /// Mutably iterates from the top of the stack down to the bottom
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(self.as_mut_slice())
    }

    fn as_slice(&self) -> &[T] {
        // SAFETY: ptr is non-null and aligned (dangling when cap is zero),
        // and the first len slots are initialized
        unsafe { slice::from_raw_parts(self.buf.ptr.as_ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in as_slice, and &mut self guarantees uniqueness
        unsafe { slice::from_raw_parts_mut(self.buf.ptr.as_ptr(), self.len) }
    }

    fn grow(&mut self) -> MemoryResult<()> {
        let new_cap = if self.buf.cap == 0 {
            INITIAL_CAPACITY
        } else {
            self.buf
                .cap
                .checked_mul(2)
                .ok_or_else(|| MemoryError::size_overflow(align_of::<T>()))?
        };
        self.relocate(new_cap)
    }

    fn shrink_if_sparse(&mut self) {
        let cap = self.buf.cap;
        if cap <= SHRINK_FLOOR || self.len >= cap / SHRINK_DIVISOR {
            return;
        }

        // A failed shrink keeps the larger storage
        if let Err(_err) = self.relocate(cap / 2) {
            #[cfg(feature = "logging")]
            warn!(error = %_err, len = self.len, capacity = cap, "stack shrink failed");
        }
    }

    /// Moves the live elements into a fresh region of `new_cap` slots,
    /// then releases the old region
    fn relocate(&mut self, new_cap: usize) -> MemoryResult<()> {
        debug_assert!(new_cap >= self.len);
        let fresh = RawStorage::allocate_in(new_cap, &self.alloc)?;

        // SAFETY: the regions are distinct live allocations, the source holds
        // len initialized values and the destination has room for new_cap
        unsafe {
            ptr::copy_nonoverlapping(self.buf.ptr.as_ptr(), fresh.ptr.as_ptr(), self.len);
        }

        let old = mem::replace(&mut self.buf, fresh);

        #[cfg(feature = "logging")]
        debug!(from = old.cap, to = new_cap, len = self.len, "stack storage relocated");

        // SAFETY: every value was moved out bitwise, so the old region holds
        // nothing that needs dropping, and it came from self.alloc
        unsafe { old.release_in(&self.alloc) };
        Ok(())
    }
}

impl<T, A: Allocator> Drop for Stack<T, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, A: Allocator> fmt::Debug for Stack<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a Stack<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator> IntoIterator for &'a mut Stack<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::FixedArena;

    #[test]
    fn new_stack_allocates_nothing() {
        let arena = FixedArena::new(64).unwrap();
        let stack: Stack<u32, _> = Stack::new_in(&arena);
        assert!(stack.is_empty());
        assert_eq!(stack.capacity(), 0);
        assert_eq!(arena.live_blocks(), 0);
    }

    #[test]
    fn storage_is_returned_to_the_arena() {
        let arena = FixedArena::new(256).unwrap();
        {
            let mut stack = Stack::new_in(&arena);
            for i in 0..9u64 {
                stack.push(i).unwrap();
            }
            assert_eq!(stack.capacity(), 16);
            assert_eq!(arena.live_blocks(), 1);
            assert_eq!(arena.used(), 16 * 8);
        }
        assert_eq!(arena.live_blocks(), 0);
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn failed_growth_keeps_contents() {
        // room for 4 u32 only; growing to 8 cannot fit alongside the old block
        let arena = FixedArena::new(32).unwrap();
        let mut stack = Stack::new_in(&arena);
        for i in 0..4u32 {
            stack.push(i).unwrap();
        }

        let err = stack.push(99).unwrap_err();
        assert!(err.is_out_of_memory());
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.capacity(), 4);
        assert_eq!(*stack.top().unwrap(), 3);
    }

    #[test]
    fn failed_shrink_keeps_larger_storage() {
        use core::alloc::Layout;

        // u8 growth leaves the 16-slot region at [12, 28)
        let arena = FixedArena::new(28).unwrap();
        let mut stack = Stack::new_in(&arena);
        for i in 0..16u8 {
            stack.push(i).unwrap();
        }
        assert_eq!(stack.capacity(), 16);

        // occupy the hole in front so the 8-slot region has nowhere to go
        let filler = Layout::from_size_align(arena.largest_free_gap(), 1).unwrap();
        let hole = arena.allocate(filler).unwrap();
        assert_eq!(arena.available(), 0);

        while stack.len() > 3 {
            stack.pop();
        }
        assert_eq!(stack.capacity(), 16);
        assert_eq!(stack.iter().copied().collect::<Vec<_>>(), vec![2, 1, 0]);

        unsafe { arena.deallocate(hole.cast(), filler) };
    }

    #[test]
    fn top_mut_edits_in_place() {
        let arena = FixedArena::new(256).unwrap();
        let mut stack = Stack::new_in(&arena);
        stack.push(String::from("a")).unwrap();
        stack.top_mut().unwrap().push('b');
        assert_eq!(stack.top().unwrap(), "ab");
        assert!(Stack::<u8, _>::new_in(&arena).top_mut().is_err());
    }

    #[test]
    fn clear_drops_owned_values() {
        use std::rc::Rc;

        let arena = FixedArena::new(256).unwrap();
        let tracker = Rc::new(());
        let mut stack = Stack::new_in(&arena);
        for _ in 0..5 {
            stack.push(Rc::clone(&tracker)).unwrap();
        }
        assert_eq!(Rc::strong_count(&tracker), 6);

        stack.clear();
        assert_eq!(Rc::strong_count(&tracker), 1);
        assert_eq!(stack.capacity(), 0);
        assert_eq!(arena.live_blocks(), 0);
    }

    #[test]
    fn zero_sized_elements() {
        let arena = FixedArena::new(0).unwrap();
        let mut stack = Stack::new_in(&arena);
        for _ in 0..10 {
            stack.push(()).unwrap();
        }
        assert_eq!(stack.len(), 10);
        assert_eq!(stack.iter().count(), 10);
        assert_eq!(stack.pop(), Some(()));
    }

    #[test]
    fn debug_lists_top_first() {
        let arena = FixedArena::new(64).unwrap();
        let mut stack = Stack::new_in(&arena);
        stack.push(1).unwrap();
        stack.push(2).unwrap();
        assert_eq!(format!("{stack:?}"), "[2, 1]");
    }
}
