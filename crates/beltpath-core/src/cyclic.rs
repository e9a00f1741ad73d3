//! Index arithmetic for the closed pulley loop.
//!
//! Pulley `i` hands the belt to `next(i, n)` and receives it from
//! `prev(i, n)`. Segment `i` is the straight run from pulley `i` to its
//! successor, so the segment entering pulley `i` is `prev(i, n)`.

/// Successor of `index` in a loop of `len` pulleys.
#[inline]
pub fn next(index: usize, len: usize) -> usize {
    debug_assert!(index < len);
    if index + 1 == len { 0 } else { index + 1 }
}

/// Predecessor of `index` in a loop of `len` pulleys.
#[inline]
pub fn prev(index: usize, len: usize) -> usize {
    debug_assert!(index < len);
    if index == 0 { len - 1 } else { index - 1 }
}

/// Iterates `(prev, index, next)` triples for every pulley in the loop.
pub fn neighbours(len: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    (0..len).map(move |i| (prev(i, len), i, next(i, len)))
}
