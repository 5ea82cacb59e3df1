use bitvec::prelude::*;
use std::fmt;

/// Fixed-size bitset over vine positions
///
/// Position `i` refers to the `i`-th vine of the set being searched. Serves as
/// the hashable state key of the solvability search, so equal sets hash equally
/// regardless of how many vines the level has.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VineSet {
    bits: BitVec,
}

impl VineSet {
    /// Create a set with no vines present
    pub fn empty(len: usize) -> Self {
        Self {
            bits: bitvec![0; len],
        }
    }

    /// Create a set containing every vine
    pub fn full(len: usize) -> Self {
        Self {
            bits: bitvec![1; len],
        }
    }

    /// Number of positions the set can hold
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a vine position, ignoring positions past the capacity
    pub fn insert(&mut self, position: usize) {
        if position < self.bits.len() {
            self.bits.set(position, true);
        }
    }

    /// Remove a vine position
    pub fn remove(&mut self, position: usize) {
        if position < self.bits.len() {
            self.bits.set(position, false);
        }
    }

    /// Copy of the set without one position
    #[must_use]
    pub fn without(&self, position: usize) -> Self {
        let mut result = self.clone();
        result.remove(position);
        result
    }

    /// Test membership
    pub fn contains(&self, position: usize) -> bool {
        self.bits.get(position).as_deref() == Some(&true)
    }

    /// Test whether every position in `other` is also in this set
    pub fn is_superset_of(&self, other: &Self) -> bool {
        other.bits.iter_ones().all(|position| self.contains(position))
    }

    /// Test whether no vines are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count vines in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Present positions in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.bits.iter_ones()
    }

    /// Present positions as a vector
    pub fn to_vec(&self) -> Vec<usize> {
        self.bits.iter_ones().collect()
    }
}

impl fmt::Display for VineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VineSet({} vines: {:?})", self.count(), self.to_vec())
    }
}
