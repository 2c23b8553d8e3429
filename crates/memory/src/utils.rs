//! Alignment helpers used by the arena's gap search

/// Aligns a value up to the nearest multiple of alignment
///
/// Returns `None` if rounding up would overflow `usize`.
///
/// # Examples
/// ```
/// use fixmem_memory::utils::align_up;
///
/// assert_eq!(align_up(7, 8), Some(8));
/// assert_eq!(align_up(8, 8), Some(8));
/// assert_eq!(align_up(9, 8), Some(16));
/// assert_eq!(align_up(usize::MAX, 8), None);
/// ```
#[inline]
pub const fn align_up(value: usize, alignment: usize) -> Option<usize> {
    debug_assert!(alignment.is_power_of_two());
    match value.checked_add(alignment - 1) {
        Some(bumped) => Some(bumped & !(alignment - 1)),
        None => None,
    }
}

/// Checks if a value is aligned to the given alignment
///
/// # Examples
/// ```
/// use fixmem_memory::utils::is_aligned;
///
/// assert!(is_aligned(16, 8));
/// assert!(!is_aligned(17, 8));
/// ```
#[inline]
pub const fn is_aligned(value: usize, alignment: usize) -> bool {
    debug_assert!(alignment.is_power_of_two());
    value & (alignment - 1) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_up_rounds_to_next_multiple() {
        assert_eq!(align_up(0, 16), Some(0));
        assert_eq!(align_up(1, 16), Some(16));
        assert_eq!(align_up(33, 32), Some(64));
        assert_eq!(align_up(5, 1), Some(5));
    }

    #[test]
    fn align_up_detects_overflow() {
        assert_eq!(align_up(usize::MAX - 2, 4), None);
        assert_eq!(align_up(usize::MAX, 1), Some(usize::MAX));
    }

    #[test]
    fn aligned_values() {
        assert!(is_aligned(0, 64));
        assert!(is_aligned(128, 64));
        assert!(!is_aligned(129, 2));
    }
}
