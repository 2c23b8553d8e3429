//! Top-to-bottom iterators over a [`Stack`](super::Stack)

use core::iter::{FusedIterator, Rev};
use core::slice;

/// Shared iterator, most recently pushed element first
#[derive(Debug)]
pub struct Iter<'a, T> {
    inner: Rev<slice::Iter<'a, T>>,
}

impl<'a, T> Iter<'a, T> {
    pub(super) fn new(live: &'a [T]) -> Self {
        Self {
            inner: live.iter().rev(),
        }
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Mutable iterator, most recently pushed element first
#[derive(Debug)]
pub struct IterMut<'a, T> {
    inner: Rev<slice::IterMut<'a, T>>,
}

impl<'a, T> IterMut<'a, T> {
    pub(super) fn new(live: &'a mut [T]) -> Self {
        Self {
            inner: live.iter_mut().rev(),
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_backwards() {
        let live = [1, 2, 3];
        let mut iter = Iter::new(&live);
        assert_eq!(iter.len(), 3);
        assert_eq!(iter.next(), Some(&3));
        assert_eq!(iter.next_back(), Some(&1));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn restartable_by_clone() {
        let live = [4, 5];
        let iter = Iter::new(&live);
        let first: Vec<_> = iter.clone().collect();
        let second: Vec<_> = iter.collect();
        assert_eq!(first, second);
    }

    #[test]
    fn mutable_walk() {
        let mut live = [1, 2, 3];
        for (step, value) in IterMut::new(&mut live).enumerate() {
            *value += step * 10;
        }
        assert_eq!(live, [21, 12, 3]);
    }

    #[test]
    fn empty() {
        let live: [u8; 0] = [];
        assert_eq!(Iter::new(&live).count(), 0);
    }
}
