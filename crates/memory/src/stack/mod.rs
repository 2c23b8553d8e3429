//! Arena-backed LIFO stack
//!
//! [`Stack`] keeps its elements in one contiguous region obtained from any
//! [`Allocator`](crate::allocator::Allocator), typically a borrowed or
//! `Rc`-shared [`FixedArena`](crate::arena::FixedArena).
//!
//! Capacity policy:
//! - the first push allocates [`INITIAL_CAPACITY`] slots
//! - a push onto a full stack doubles the capacity
//! - a pop that leaves fewer than `capacity / SHRINK_DIVISOR` elements
//!   halves the capacity, but only while it exceeds [`SHRINK_FLOOR`]

mod container;
mod iter;
mod raw;

pub use container::Stack;
pub use iter::{Iter, IterMut};

/// Slots allocated by the first push
pub const INITIAL_CAPACITY: usize = 4;

/// Capacities at or below this never shrink
pub const SHRINK_FLOOR: usize = 8;

/// Shrink once fewer than `capacity / SHRINK_DIVISOR` elements remain
pub const SHRINK_DIVISOR: usize = 4;
