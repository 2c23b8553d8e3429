//! Fixed arena configuration

/// Default buffer length in bytes
pub const DEFAULT_CAPACITY: usize = 4096;

/// Configuration for [`FixedArena`](super::FixedArena)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ArenaConfig {
    /// Buffer length in bytes, fixed for the arena's lifetime
    pub capacity: usize,

    /// Byte written over every freshly granted region
    pub alloc_pattern: Option<u8>,

    /// Byte written over every released region. `None` leaves released
    /// memory untouched, so its old content shows through on reuse.
    pub dealloc_pattern: Option<u8>,

    /// Maintain allocation counters
    pub track_stats: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            alloc_pattern: None,
            dealloc_pattern: None,
            track_stats: true,
        }
    }
}

impl ArenaConfig {
    /// Default configuration with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Production configuration - no fill patterns, no counters
    pub fn production(capacity: usize) -> Self {
        Self {
            capacity,
            alloc_pattern: None,
            dealloc_pattern: None,
            track_stats: false,
        }
    }

    /// Debug configuration - poisons granted and released regions
    pub fn debug(capacity: usize) -> Self {
        Self {
            capacity,
            alloc_pattern: Some(0xCC),
            dealloc_pattern: Some(0xDD),
            track_stats: true,
        }
    }

    /// Sets the buffer length
    #[must_use = "builder methods must be chained or built"]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the fill byte for granted regions
    #[must_use = "builder methods must be chained or built"]
    pub fn with_alloc_pattern(mut self, pattern: Option<u8>) -> Self {
        self.alloc_pattern = pattern;
        self
    }

    /// Sets the fill byte for released regions
    #[must_use = "builder methods must be chained or built"]
    pub fn with_dealloc_pattern(mut self, pattern: Option<u8>) -> Self {
        self.dealloc_pattern = pattern;
        self
    }

    /// Enables/disables statistics tracking
    #[must_use = "builder methods must be chained or built"]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }
}
