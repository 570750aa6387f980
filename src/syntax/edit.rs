//! Text edits in byte offsets
//!
//! An [`Edit`] describes one replacement: the bytes `start..old_end` of the
//! text before the edit became `start..new_end` after it. A sequence of edits
//! is applied in order, each one in the coordinates produced by the previous.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start: usize,
    pub old_end: usize,
    pub new_end: usize,
}

impl Edit {
    pub fn new(start: usize, old_end: usize, new_end: usize) -> Self {
        Self {
            start,
            old_end,
            new_end,
        }
    }

    /// Replace `range` with `new_len` bytes
    pub fn replace(range: Range<usize>, new_len: usize) -> Self {
        Self::new(range.start, range.end, range.start + new_len)
    }

    pub fn insert(at: usize, len: usize) -> Self {
        Self::new(at, at, at + len)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range.start, range.end, range.start)
    }

    /// Replace `range` of `text` with `replacement` and describe the change
    ///
    /// # Panics
    /// Panics if `range` is out of bounds or does not lie on char boundaries,
    /// like [`String::replace_range`].
    pub fn apply(text: &mut String, range: Range<usize>, replacement: &str) -> Self {
        let edit = Self::replace(range.clone(), replacement.len());
        text.replace_range(range, replacement);
        edit
    }

    pub fn old_range(&self) -> Range<usize> {
        self.start..self.old_end
    }

    pub fn new_range(&self) -> Range<usize> {
        self.start..self.new_end
    }

    /// Change in text length caused by this edit
    pub fn delta(&self) -> isize {
        self.new_end as isize - self.old_end as isize
    }

    pub fn is_well_formed(&self) -> bool {
        self.start <= self.old_end && self.start <= self.new_end
    }
}
