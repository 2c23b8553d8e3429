//! Integration tests for first-fit placement in FixedArena

use std::alloc::Layout;
use std::ptr::NonNull;

use fixmem_memory::allocator::Allocator;
use fixmem_memory::arena::{ArenaConfig, FixedArena};
use fixmem_memory::utils::is_aligned;
use pretty_assertions::assert_eq;

fn layout(size: usize, align: usize) -> Layout {
    Layout::from_size_align(size, align).unwrap()
}

fn addr(ptr: NonNull<[u8]>) -> usize {
    ptr.cast::<u8>().as_ptr() as usize
}

#[test]
fn test_distinct_blocks() {
    let arena = FixedArena::new(1024).expect("Failed to create arena");
    let a = arena.allocate(layout(32, 8)).expect("Allocation A failed");
    let b = arena.allocate(layout(64, 8)).expect("Allocation B failed");

    assert_ne!(addr(a), addr(b));
    assert!(arena.contains(a.cast::<u8>().as_ptr()));
    assert!(arena.contains(b.cast::<u8>().as_ptr()));
    assert_eq!(arena.used(), 96);

    unsafe {
        arena.deallocate(a.cast(), layout(32, 8));
        arena.deallocate(b.cast(), layout(64, 8));
    }
    assert_eq!(arena.live_blocks(), 0);
}

#[test]
fn test_freed_block_is_reused() {
    let arena = FixedArena::new(512).expect("Failed to create arena");
    let first = arena.allocate(layout(64, 8)).unwrap();
    unsafe { arena.deallocate(first.cast(), layout(64, 8)) };

    let second = arena.allocate(layout(64, 8)).unwrap();
    assert_eq!(addr(first), addr(second));
}

#[test]
fn test_hole_reused_by_same_size_request() {
    let arena = FixedArena::new(1024).unwrap();
    let a = arena.allocate(layout(32, 8)).unwrap();
    let b = arena.allocate(layout(64, 8)).unwrap();
    unsafe { arena.deallocate(a.cast(), layout(32, 8)) };

    // a larger request skips the 32-byte hole and lands after B
    let c = arena.allocate(layout(64, 8)).unwrap();
    assert_eq!(addr(c), addr(b) + 64);

    // a request that fits takes the hole
    let d = arena.allocate(layout(32, 8)).unwrap();
    assert_eq!(addr(d), addr(a));
    assert_eq!(arena.live_blocks(), 3);
}

#[test]
fn test_oversized_request_fails_without_side_effects() {
    let arena = FixedArena::new(128).unwrap();
    let err = arena.allocate(layout(256, 8)).unwrap_err();
    assert!(err.is_out_of_memory());
    assert_eq!(err.code(), "MEM:ALLOC:OOM");
    assert_eq!(arena.live_blocks(), 0);

    // the arena behaves as if the failed call never happened
    let whole = arena.allocate(layout(128, 8)).unwrap();
    assert_eq!(arena.available(), 0);
    unsafe { arena.deallocate(whole.cast(), layout(128, 8)) };
    assert_eq!(arena.available(), 128);
}

#[test]
fn test_alignment_padding_between_blocks() {
    let arena = FixedArena::new(256).unwrap();
    let small = arena.allocate(layout(1, 1)).unwrap();
    let wide = arena.allocate(layout(16, 64)).unwrap();

    assert!(is_aligned(addr(wide), 64));
    assert!(addr(small) < addr(wide));

    // the padding gap in front of `wide` still serves small requests
    let filler = arena.allocate(layout(4, 4)).unwrap();
    assert!(addr(filler) < addr(wide));
    assert!(is_aligned(addr(filler), 4));
}

#[test]
fn test_exact_fill() {
    let arena = FixedArena::new(64).unwrap();
    let blocks: Vec<_> = (0..4)
        .map(|_| arena.allocate(layout(16, 16)).unwrap())
        .collect();
    assert_eq!(arena.available(), 0);
    assert!(arena.allocate(layout(1, 1)).is_err());

    // free the middle two; a 32-byte request fits only because they are
    // adjacent in the address space
    unsafe {
        arena.deallocate(blocks[1].cast(), layout(16, 16));
        arena.deallocate(blocks[2].cast(), layout(16, 16));
    }
    let merged = arena.allocate(layout(32, 16)).unwrap();
    assert_eq!(addr(merged), addr(blocks[1]));
}

#[test]
fn test_double_free_is_tolerated() {
    let arena = FixedArena::new(64).unwrap();
    let a = arena.allocate(layout(8, 8)).unwrap();
    unsafe {
        arena.deallocate(a.cast(), layout(8, 8));
        arena.deallocate(a.cast(), layout(8, 8));
    }
    let stats = arena.stats();
    assert_eq!(stats.deallocations, 1);
    assert_eq!(stats.unknown_deallocations, 1);
}

#[test]
fn test_stats_track_peak_and_failures() {
    let arena = FixedArena::with_config(ArenaConfig::new(128)).unwrap();
    let a = arena.allocate(layout(64, 8)).unwrap();
    let b = arena.allocate(layout(32, 8)).unwrap();
    let _ = arena.allocate(layout(64, 8));
    unsafe {
        arena.deallocate(a.cast(), layout(64, 8));
        arena.deallocate(b.cast(), layout(32, 8));
    }

    let stats = arena.stats();
    assert_eq!(stats.allocations, 2);
    assert_eq!(stats.failed_allocations, 1);
    assert_eq!(stats.peak_used, 96);
    assert_eq!(stats.used, 0);

    arena.reset_stats();
    assert_eq!(arena.stats().peak_used, 0);
}
