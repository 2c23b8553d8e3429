//! Fixed-capacity first-fit arena

use core::alloc::Layout;
use core::cell::RefCell;
use core::fmt;
use core::ptr::{self, NonNull};
use std::alloc::{alloc, dealloc};

#[cfg(feature = "logging")]
use tracing::{debug, trace, warn};

use super::blocks::{Block, BlockList};
use super::config::ArenaConfig;
use super::stats::{ArenaStats, ArenaStatsSnapshot, FragmentationStats};
use crate::allocator::Allocator;
use crate::error::{MemoryError, MemoryResult};

/// Alignment of the backing buffer itself
const BUFFER_ALIGN: usize = 16;

/// The single heap region an arena carves blocks out of
struct Buffer {
    ptr: NonNull<u8>,
    capacity: usize,
}

impl Buffer {
    fn new(capacity: usize) -> MemoryResult<Self> {
        if capacity == 0 {
            return Ok(Self {
                ptr: NonNull::<u128>::dangling().cast(),
                capacity: 0,
            });
        }

        let layout = Layout::from_size_align(capacity, BUFFER_ALIGN)
            .map_err(|_| MemoryError::out_of_memory(capacity, BUFFER_ALIGN, 0))?;

        // SAFETY: layout has non-zero size (checked above) and a valid
        // power-of-two alignment. A null return is handled below.
        let raw = unsafe { alloc(layout) };
        let ptr = NonNull::new(raw)
            .ok_or_else(|| MemoryError::out_of_memory(capacity, BUFFER_ALIGN, 0))?;

        #[cfg(feature = "logging")]
        debug!(capacity, addr = ptr.as_ptr() as usize, "arena buffer created");

        Ok(Self { ptr, capacity })
    }

    #[inline]
    fn addr(&self) -> usize {
        self.ptr.as_ptr() as usize
    }

    /// Pointer to `offset` bytes into the buffer
    ///
    /// # Safety
    /// `offset` must not exceed `capacity`
    #[inline]
    unsafe fn at(&self, offset: usize) -> *mut u8 {
        debug_assert!(offset <= self.capacity);
        // SAFETY: caller keeps offset within the allocation (or one past it)
        unsafe { self.ptr.as_ptr().add(offset) }
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if self.capacity == 0 {
            return;
        }

        #[cfg(feature = "logging")]
        debug!(capacity = self.capacity, "arena buffer released");

        // SAFETY: ptr came from alloc() in Buffer::new with exactly this
        // layout, which was valid then and is unchanged. Drop runs once.
        unsafe {
            dealloc(
                self.ptr.as_ptr(),
                Layout::from_size_align_unchecked(self.capacity, BUFFER_ALIGN),
            );
        }
    }
}

/// Fixed-capacity arena with first-fit placement
///
/// Owns one buffer, allocated up front and released on drop. Each request is
/// placed at the lowest address where an aligned gap between live blocks
/// holds it. Released blocks become reusable immediately; the arena never
/// grows and never returns partial results.
///
/// The arena is single-threaded (`!Send`, `!Sync`). Share it between
/// containers by reference or through `Rc`.
///
/// # Examples
/// ```rust
/// use core::alloc::Layout;
/// use fixmem_memory::allocator::Allocator;
/// use fixmem_memory::arena::FixedArena;
///
/// let arena = FixedArena::new(1024)?;
/// let layout = Layout::from_size_align(64, 8).unwrap();
///
/// let a = arena.allocate(layout)?;
/// assert_eq!(arena.used(), 64);
///
/// unsafe { arena.deallocate(a.cast(), layout) };
/// let b = arena.allocate(layout)?;
/// assert_eq!(a.cast::<u8>(), b.cast::<u8>());
/// # Ok::<(), fixmem_memory::MemoryError>(())
/// ```
pub struct FixedArena {
    buffer: Buffer,
    blocks: RefCell<BlockList>,
    stats: ArenaStats,
    config: ArenaConfig,
}

impl FixedArena {
    /// Creates an arena over a fresh buffer of `capacity` bytes
    ///
    /// A capacity of zero allocates nothing; every non-empty request on such
    /// an arena fails.
    pub fn new(capacity: usize) -> MemoryResult<Self> {
        Self::with_config(ArenaConfig::new(capacity))
    }

    /// Creates an arena from a configuration
    pub fn with_config(config: ArenaConfig) -> MemoryResult<Self> {
        let buffer = Buffer::new(config.capacity)?;
        Ok(Self {
            buffer,
            blocks: RefCell::new(BlockList::default()),
            stats: ArenaStats::default(),
            config,
        })
    }

    /// Buffer length in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity
    }

    /// Bytes held by live blocks
    pub fn used(&self) -> usize {
        self.blocks.borrow().used()
    }

    /// Bytes not held by any live block
    ///
    /// Alignment and gaps may keep a request of this size from fitting.
    pub fn available(&self) -> usize {
        self.capacity() - self.used()
    }

    /// Number of live blocks
    pub fn live_blocks(&self) -> usize {
        self.blocks.borrow().len()
    }

    /// Configuration the arena was built with
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Returns true if `ptr` points into this arena's buffer
    pub fn contains(&self, ptr: *const u8) -> bool {
        let addr = ptr as usize;
        let base = self.buffer.addr();
        addr >= base && addr - base < self.capacity()
    }

    /// Largest contiguous gap, ignoring alignment
    pub fn largest_free_gap(&self) -> usize {
        self.blocks
            .borrow()
            .gaps(self.capacity())
            .max()
            .unwrap_or(0)
    }

    /// Free space layout across all gaps
    pub fn fragmentation(&self) -> FragmentationStats {
        let blocks = self.blocks.borrow();
        let (total, largest, count) = blocks
            .gaps(self.capacity())
            .fold((0, 0, 0), |(total, largest, count), gap| {
                (total + gap, largest.max(gap), count + 1)
            });
        FragmentationStats::calculate(total, largest, count)
    }

    /// Snapshot of the arena's counters
    ///
    /// Counters stay at zero when `track_stats` is off; `used` and
    /// `live_blocks` are always current.
    pub fn stats(&self) -> ArenaStatsSnapshot {
        let blocks = self.blocks.borrow();
        self.stats.snapshot(blocks.used(), blocks.len())
    }

    /// Zeroes the counters; the peak restarts from current usage
    pub fn reset_stats(&self) {
        self.stats.reset(self.used());
    }

    fn allocate_block(&self, layout: Layout) -> MemoryResult<NonNull<[u8]>> {
        let size = layout.size();
        let align = layout.align();
        let mut blocks = self.blocks.borrow_mut();

        let Some(offset) = blocks.find_fit(self.buffer.addr(), self.capacity(), size, align)
        else {
            if self.config.track_stats {
                self.stats.record_failure();
            }
            return Err(MemoryError::out_of_memory_with_layout(
                layout,
                self.capacity() - blocks.used(),
            ));
        };

        blocks.insert(Block { offset, size });
        let used = blocks.used();
        drop(blocks);

        // SAFETY: find_fit only returns offsets with offset + size <= capacity
        let start = unsafe { self.buffer.at(offset) };

        if let Some(pattern) = self.config.alloc_pattern {
            // SAFETY: [start, start + size) lies inside the buffer and was
            // just reserved for this call alone
            unsafe { ptr::write_bytes(start, pattern, size) };
        }

        if self.config.track_stats {
            self.stats.record_allocation(used);
        }

        #[cfg(feature = "logging")]
        trace!(offset, size, align, used, "arena block allocated");

        // SAFETY: start is derived from the non-null buffer pointer
        let start = unsafe { NonNull::new_unchecked(start) };
        Ok(NonNull::slice_from_raw_parts(start, size))
    }

    fn release_block(&self, ptr: NonNull<u8>) {
        let addr = ptr.as_ptr() as usize;
        let released = if self.contains(ptr.as_ptr()) {
            self.blocks.borrow_mut().remove(addr - self.buffer.addr())
        } else {
            None
        };

        let Some(block) = released else {
            if self.config.track_stats {
                self.stats.record_unknown_deallocation();
            }
            #[cfg(feature = "logging")]
            warn!(addr, "deallocate called with an address this arena never granted");
            return;
        };

        if let Some(pattern) = self.config.dealloc_pattern {
            // SAFETY: the block was live until now, so its range is inside
            // the buffer and no longer handed out
            unsafe { ptr::write_bytes(self.buffer.at(block.offset), pattern, block.size) };
        }

        if self.config.track_stats {
            self.stats.record_deallocation();
        }

        #[cfg(feature = "logging")]
        trace!(offset = block.offset, size = block.size, "arena block released");
    }
}

// SAFETY: blocks are carved from one owned buffer, aligned by find_fit
// against absolute addresses, and the sorted block list keeps them
// disjoint. The buffer lives as long as the arena.
unsafe impl Allocator for FixedArena {
    fn allocate(&self, layout: Layout) -> MemoryResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            // SAFETY: Layout alignment is never zero
            let dangling =
                unsafe { NonNull::new_unchecked(ptr::without_provenance_mut::<u8>(layout.align())) };
            return Ok(NonNull::slice_from_raw_parts(dangling, 0));
        }
        self.allocate_block(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        self.release_block(ptr);
    }

    fn is_same(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

/// Arenas compare by identity: two arenas are equal only if they are the
/// same object.
impl PartialEq for FixedArena {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self, other)
    }
}

impl Eq for FixedArena {}

impl fmt::Debug for FixedArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedArena")
            .field("capacity", &self.capacity())
            .field("used", &self.used())
            .field("live_blocks", &self.live_blocks())
            .finish_non_exhaustive()
    }
}

impl Drop for FixedArena {
    fn drop(&mut self) {
        let blocks = self.blocks.get_mut();

        #[cfg(feature = "logging")]
        if blocks.len() != 0 {
            warn!(
                live_blocks = blocks.len(),
                used = blocks.used(),
                "arena dropped while blocks are still live"
            );
        }

        blocks.clear();
    }
}
