//! Error types for fixmem-memory
//!
//! Two failure kinds exist: the arena running out of room for an aligned
//! request, and reading the top of an empty stack. Everything else the crate
//! does (popping an empty stack, releasing an unknown address) is a tolerated
//! no-op rather than an error.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::warn;

// ============================================================================
// Main Error Types
// ============================================================================

/// Memory management errors
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    /// No aligned gap in the arena can hold the request, or the backing
    /// buffer itself could not be obtained.
    #[error(
        "Out of memory: requested {requested} bytes with {align} byte alignment ({available} bytes free)"
    )]
    OutOfMemory {
        requested: usize,
        align: usize,
        available: usize,
    },

    /// An element access on an empty container.
    #[error("Out of range: {operation} on a stack of length {len}")]
    OutOfRange { operation: &'static str, len: usize },
}

impl MemoryError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfMemory { .. } => "MEM:ALLOC:OOM",
            Self::OutOfRange { .. } => "MEM:STACK:RANGE",
        }
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create out of memory error
    pub fn out_of_memory(requested: usize, align: usize, available: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(requested, align, available, "arena allocation failed");

        Self::OutOfMemory {
            requested,
            align,
            available,
        }
    }

    /// Create out of memory error from layout
    pub fn out_of_memory_with_layout(layout: Layout, available: usize) -> Self {
        Self::out_of_memory(layout.size(), layout.align(), available)
    }

    /// Create out of memory error for a request whose byte size overflowed
    pub fn size_overflow(align: usize) -> Self {
        Self::out_of_memory(usize::MAX, align, 0)
    }

    /// Create error for an element access on an empty stack
    pub fn empty_stack(operation: &'static str) -> Self {
        Self::OutOfRange { operation, len: 0 }
    }

    /// Check if this is an out of memory error
    #[must_use]
    pub fn is_out_of_memory(&self) -> bool {
        matches!(self, Self::OutOfMemory { .. })
    }

    /// Check if this is an out of range error
    #[must_use]
    pub fn is_out_of_range(&self) -> bool {
        matches!(self, Self::OutOfRange { .. })
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for memory operations
pub type MemoryResult<T> = core::result::Result<T, MemoryError>;

/// Generic result type alias
pub type Result<T> = MemoryResult<T>;

/// Aliases used at the allocator seam
pub type AllocError = MemoryError;
pub type AllocResult<T> = MemoryResult<T>;

// ============================================================================
// Tests
// ============================================================================
