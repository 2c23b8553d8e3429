//! # fixmem-memory
//!
//! Bounded-footprint memory management: one fixed buffer, carved up on
//! demand, and containers that draw all of their storage from it.
//!
//! - [`arena::FixedArena`] owns a single buffer allocated at construction
//!   and serves aligned requests with first-fit placement over its live
//!   blocks. Released blocks are reused; the buffer never grows.
//! - [`stack::Stack`] is a LIFO container generic over any
//!   [`allocator::Allocator`], with doubling growth and quarter-full shrink.
//!
//! ## Quick Start
//!
//! ```rust
//! use fixmem_memory::prelude::*;
//!
//! let arena = FixedArena::new(2048)?;
//! let mut stack = Stack::new_in(&arena);
//!
//! for value in [10, 20, 30, 40] {
//!     stack.push(value)?;
//! }
//! assert_eq!(*stack.top()?, 40);
//! assert_eq!(stack.iter().copied().collect::<Vec<_>>(), [40, 30, 20, 10]);
//!
//! stack.pop();
//! stack.push(50)?;
//! assert_eq!(stack.len(), 4);
//! # Ok::<(), MemoryError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): structured events through `tracing`
//! - `serde`: `Serialize`/`Deserialize` for [`ArenaConfig`]

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]
#![allow(unsafe_code)]

pub mod allocator;
pub mod arena;
pub mod error;
pub mod stack;
pub mod utils;

pub use crate::arena::{ArenaConfig, FixedArena};
pub use crate::error::{MemoryError, MemoryResult, Result};
pub use crate::stack::Stack;

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{AllocError, AllocResult, Allocator, TypedAllocator};
    pub use crate::arena::{ArenaConfig, ArenaStatsSnapshot, FixedArena, FragmentationStats};
    pub use crate::error::{MemoryError, MemoryResult};
    pub use crate::stack::Stack;
}
