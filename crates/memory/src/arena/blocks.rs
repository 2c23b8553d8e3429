//! Sorted record of live blocks inside an arena buffer
//!
//! Offsets are relative to the buffer start. Alignment is always checked
//! against the absolute address `base + offset`, since the buffer itself is
//! only guaranteed the alignment it was created with.

use crate::utils::{align_up, is_aligned};

/// One granted region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Block {
    pub(crate) offset: usize,
    pub(crate) size: usize,
}

impl Block {
    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.offset + self.size
    }
}

/// Live blocks ordered by ascending offset, never overlapping
#[derive(Debug, Default)]
pub(crate) struct BlockList {
    blocks: Vec<Block>,
    used: usize,
}

impl BlockList {
    pub(crate) fn len(&self) -> usize {
        self.blocks.len()
    }

    pub(crate) fn used(&self) -> usize {
        self.used
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Lowest offset at which `size` bytes aligned to `align` fit
    ///
    /// Walks the gaps in address order: before the first block, between
    /// neighbours, and after the last block up to `capacity`.
    pub(crate) fn find_fit(
        &self,
        base: usize,
        capacity: usize,
        size: usize,
        align: usize,
    ) -> Option<usize> {
        let mut cursor = 0;
        for block in &self.blocks {
            if let Some(candidate) = fit_in_gap(base, cursor, block.offset, size, align) {
                return Some(candidate);
            }
            cursor = block.end();
        }
        fit_in_gap(base, cursor, capacity, size, align)
    }

    /// Records a block, keeping the list sorted
    pub(crate) fn insert(&mut self, block: Block) {
        let index = self
            .blocks
            .partition_point(|existing| existing.offset < block.offset);
        debug_assert!(index == 0 || self.blocks[index - 1].end() <= block.offset);
        debug_assert!(index == self.blocks.len() || block.end() <= self.blocks[index].offset);
        self.blocks.insert(index, block);
        self.used += block.size;
    }

    /// Removes the block starting exactly at `offset`
    pub(crate) fn remove(&mut self, offset: usize) -> Option<Block> {
        let index = self
            .blocks
            .binary_search_by_key(&offset, |block| block.offset)
            .ok()?;
        let block = self.blocks.remove(index);
        self.used -= block.size;
        Some(block)
    }

    /// Sizes of every non-empty gap, in address order
    pub(crate) fn gaps(&self, capacity: usize) -> impl Iterator<Item = usize> + '_ {
        let mut cursor = 0;
        self.blocks
            .iter()
            .map(|block| block.offset)
            .chain(core::iter::once(capacity))
            .zip(self.blocks.iter().map(Block::end).chain(core::iter::once(capacity)))
            .filter_map(move |(start_of_next, end_of_this)| {
                let gap = start_of_next - cursor;
                cursor = end_of_this;
                (gap > 0).then_some(gap)
            })
    }

    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
        self.used = 0;
    }
}

/// Aligned start inside `[start, end)` that holds `size` bytes
fn fit_in_gap(base: usize, start: usize, end: usize, size: usize, align: usize) -> Option<usize> {
    let absolute = base.checked_add(start)?;
    let candidate = align_up(absolute, align)? - base;
    debug_assert!(is_aligned(base + candidate, align));
    let candidate_end = candidate.checked_add(size)?;
    (candidate_end <= end).then_some(candidate)
}
