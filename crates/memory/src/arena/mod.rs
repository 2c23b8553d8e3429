//! Fixed-capacity arena
//!
//! [`FixedArena`] owns a single buffer and hands out aligned blocks from it
//! with first-fit placement. It implements
//! [`Allocator`](crate::allocator::Allocator), so any container generic over
//! that trait can draw its storage from an arena.
//!
//! ```rust
//! use fixmem_memory::arena::{ArenaConfig, FixedArena};
//!
//! let arena = FixedArena::with_config(ArenaConfig::debug(512))?;
//! assert_eq!(arena.capacity(), 512);
//! assert_eq!(arena.available(), 512);
//! # Ok::<(), fixmem_memory::MemoryError>(())
//! ```

mod blocks;
mod config;
mod fixed;
mod stats;

pub use config::{ArenaConfig, DEFAULT_CAPACITY};
pub use fixed::FixedArena;
pub use stats::{ArenaStatsSnapshot, FragmentationStats};
