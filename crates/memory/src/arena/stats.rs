//! Arena statistics

use core::cell::Cell;
use core::fmt;

/// Live counters kept by a [`FixedArena`](super::FixedArena)
#[derive(Debug, Default)]
pub(crate) struct ArenaStats {
    allocations: Cell<u64>,
    deallocations: Cell<u64>,
    failed_allocations: Cell<u64>,
    unknown_deallocations: Cell<u64>,
    peak_used: Cell<usize>,
}

impl ArenaStats {
    pub(crate) fn record_allocation(&self, used_after: usize) {
        self.allocations.set(self.allocations.get() + 1);
        if used_after > self.peak_used.get() {
            self.peak_used.set(used_after);
        }
    }

    pub(crate) fn record_deallocation(&self) {
        self.deallocations.set(self.deallocations.get() + 1);
    }

    pub(crate) fn record_failure(&self) {
        self.failed_allocations
            .set(self.failed_allocations.get() + 1);
    }

    pub(crate) fn record_unknown_deallocation(&self) {
        self.unknown_deallocations
            .set(self.unknown_deallocations.get() + 1);
    }

    pub(crate) fn reset(&self, used: usize) {
        self.allocations.set(0);
        self.deallocations.set(0);
        self.failed_allocations.set(0);
        self.unknown_deallocations.set(0);
        self.peak_used.set(used);
    }

    pub(crate) fn snapshot(&self, used: usize, live_blocks: usize) -> ArenaStatsSnapshot {
        ArenaStatsSnapshot {
            allocations: self.allocations.get(),
            deallocations: self.deallocations.get(),
            failed_allocations: self.failed_allocations.get(),
            unknown_deallocations: self.unknown_deallocations.get(),
            peak_used: self.peak_used.get(),
            used,
            live_blocks,
        }
    }
}

/// Point-in-time copy of an arena's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStatsSnapshot {
    /// Successful non-empty allocations
    pub allocations: u64,
    /// Records released
    pub deallocations: u64,
    /// Requests that found no fitting gap
    pub failed_allocations: u64,
    /// Release calls whose address matched no record
    pub unknown_deallocations: u64,
    /// Highest `used` value observed
    pub peak_used: usize,
    /// Bytes held by live records
    pub used: usize,
    /// Number of live records
    pub live_blocks: usize,
}

impl ArenaStatsSnapshot {
    /// Allocations minus deallocations
    pub fn outstanding(&self) -> u64 {
        self.allocations.saturating_sub(self.deallocations)
    }

    /// Fraction of requests that failed
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.allocations + self.failed_allocations;
        if attempts == 0 {
            0.0
        } else {
            self.failed_allocations as f64 / attempts as f64
        }
    }
}

impl fmt::Display for ArenaStatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "allocations: {}, deallocations: {}, failed: {}, unknown frees: {}, used: {} bytes (peak {}), live blocks: {}",
            self.allocations,
            self.deallocations,
            self.failed_allocations,
            self.unknown_deallocations,
            self.used,
            self.peak_used,
            self.live_blocks
        )
    }
}

/// Free space layout of an arena
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FragmentationStats {
    /// Total free bytes across all gaps
    pub total_free: usize,

    /// Largest contiguous gap (bytes)
    pub largest_block: usize,

    /// Number of non-empty gaps
    pub fragment_count: usize,

    /// External fragmentation, `100 * (1 - largest_block / total_free)`
    pub fragmentation_percent: u8,
}

impl FragmentationStats {
    /// Derives the percentage from free space metrics
    pub fn calculate(total_free: usize, largest_block: usize, fragment_count: usize) -> Self {
        let fragmentation_percent = if total_free > 0 {
            let ratio = 1.0 - (largest_block as f64 / total_free as f64);
            (ratio * 100.0).clamp(0.0, 100.0) as u8
        } else {
            0
        };

        Self {
            total_free,
            largest_block,
            fragment_count,
            fragmentation_percent,
        }
    }

    /// More than half of the free space lies outside the largest gap
    #[inline]
    pub fn is_fragmented(&self) -> bool {
        self.fragmentation_percent > 50
    }
}

impl fmt::Display for FragmentationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "free: {} bytes in {} gaps, largest: {} bytes, fragmentation: {}%",
            self.total_free, self.fragment_count, self.largest_block, self.fragmentation_percent
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_tracks_high_water_mark() {
        let stats = ArenaStats::default();
        stats.record_allocation(64);
        stats.record_allocation(128);
        stats.record_deallocation();
        stats.record_allocation(96);

        let snap = stats.snapshot(96, 2);
        assert_eq!(snap.allocations, 3);
        assert_eq!(snap.deallocations, 1);
        assert_eq!(snap.peak_used, 128);
        assert_eq!(snap.outstanding(), 2);
    }

    #[test]
    fn reset_keeps_current_usage_as_peak() {
        let stats = ArenaStats::default();
        stats.record_allocation(512);
        stats.record_failure();
        stats.reset(32);

        let snap = stats.snapshot(32, 1);
        assert_eq!(snap.allocations, 0);
        assert_eq!(snap.failed_allocations, 0);
        assert_eq!(snap.peak_used, 32);
    }

    #[test]
    fn failure_rate() {
        let stats = ArenaStats::default();
        assert_eq!(stats.snapshot(0, 0).failure_rate(), 0.0);
        stats.record_allocation(8);
        stats.record_failure();
        assert_eq!(stats.snapshot(8, 1).failure_rate(), 0.5);
    }

    #[test]
    fn fragmentation_percent() {
        assert_eq!(FragmentationStats::calculate(0, 0, 0).fragmentation_percent, 0);

        let single = FragmentationStats::calculate(100, 100, 1);
        assert_eq!(single.fragmentation_percent, 0);
        assert!(!single.is_fragmented());

        let split = FragmentationStats::calculate(100, 25, 4);
        assert_eq!(split.fragmentation_percent, 75);
        assert!(split.is_fragmented());
    }
}
