//! Scratch arena allocation.
//!
//! Short-lived lists built while parsing a file are allocated from a bump
//! arena and copied into the syntax tree once complete. The arena is dropped
//! with the parse, releasing every scratch allocation at once.

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

/// A bump allocator for per-file scratch allocations.
pub struct ScratchArena {
    bump: Bump,
}

impl ScratchArena {
    /// Create a new scratch arena with default capacity.
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Create a new scratch arena sized for a source text of `bytes` bytes.
    pub fn for_source_len(bytes: usize) -> Self {
        // Roughly one list slot per eight bytes of source is plenty for
        // typical TTCN-3 files.
        Self {
            bump: Bump::with_capacity(bytes / 2),
        }
    }

    /// Start a new scratch list.
    #[inline]
    pub fn list<T>(&self) -> BumpVec<'_, T> {
        BumpVec::new_in(&self.bump)
    }
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy a finished scratch list into an owned vector.
#[inline]
pub fn freeze<T: Copy>(list: BumpVec<'_, T>) -> Vec<T> {
    list.as_slice().to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scratch_list_freeze() {
        let arena = ScratchArena::new();
        let mut list = arena.list::<u32>();
        list.push(1);
        list.push(2);
        assert_eq!(freeze(list), vec![1, 2]);
    }

    #[test]
    fn test_lists_are_independent() {
        let arena = ScratchArena::for_source_len(1024);
        let mut outer = arena.list::<u8>();
        let mut inner = arena.list::<u8>();
        outer.push(1);
        inner.push(7);
        inner.push(8);
        outer.push(2);
        assert_eq!(freeze(inner), vec![7, 8]);
        assert_eq!(freeze(outer), vec![1, 2]);
    }
}
