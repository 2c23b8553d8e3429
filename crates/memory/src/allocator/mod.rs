//! Allocator capability consumed by arena-backed containers
//!
//! Containers never talk to a concrete arena. They hold some `A: Allocator`
//! and ask it for `(size, alignment)` regions described by a [`Layout`].
//!
//! - [`Allocator`]: raw byte-region allocation and release
//! - [`TypedAllocator`]: array helpers derived from [`Allocator`]
//!
//! [`Layout`]: core::alloc::Layout

mod traits;

pub use traits::{Allocator, TypedAllocator};

pub use crate::error::{AllocError, AllocResult};
