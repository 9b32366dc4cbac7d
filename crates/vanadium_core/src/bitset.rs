//! Fixed-size bitsets used to track which identifiers of an externally
//! resolved group have been explained, and by which provider.

use fixedbitset::FixedBitSet;
use std::fmt;

/// A fixed-length set of bit indices.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Bitset {
    bits: FixedBitSet,
}

impl Bitset {
    /// Create a bitset of `len` cleared bits.
    pub fn with_len(len: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(len),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.len() == 0
    }

    #[inline]
    pub fn set(&mut self, index: usize) {
        self.bits.insert(index);
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        self.bits.contains(index)
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Whether no bit is set.
    pub fn none(&self) -> bool {
        self.count_ones() == 0
    }

    /// Whether every bit is set. An empty bitset is trivially full.
    pub fn all(&self) -> bool {
        self.count_ones() == self.bits.len()
    }

    /// `self |= other`.
    pub fn union_with(&mut self, other: &Bitset) {
        self.bits.union_with(&other.bits);
    }

    /// `self &= !other`.
    pub fn subtract(&mut self, other: &Bitset) {
        self.bits.difference_with(&other.bits);
    }

    /// Iterate over the indices of set bits in ascending order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.ones()
    }

    /// Iterate over the indices of cleared bits in ascending order.
    pub fn zeroes(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.bits.len()).filter(move |&i| !self.bits.contains(i))
    }
}

impl fmt::Debug for Bitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.bits.len() {
            f.write_str(if self.bits.contains(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_union_and_subtract() {
        let mut resolved = Bitset::with_len(4);
        let mut contribution = Bitset::with_len(4);
        contribution.set(1);
        contribution.set(3);
        resolved.set(0);
        resolved.union_with(&contribution);
        assert_eq!(resolved.count_ones(), 3);
        resolved.subtract(&contribution);
        assert_eq!(resolved.ones().collect::<Vec<_>>(), vec![0]);
        assert_eq!(resolved.zeroes().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_all_and_none() {
        let mut bits = Bitset::with_len(2);
        assert!(Bitset::with_len(0).all());
        assert!(bits.none());
        bits.set(0);
        bits.set(1);
        assert!(bits.all());
        assert_eq!(format!("{:?}", bits), "11");
    }
}
