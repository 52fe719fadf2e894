//! Bitfield for tracking which owners have confirmed a transaction.

use sbor::prelude::*;

/// A compact bitfield representing which owners have confirmed.
///
/// Bit `i` corresponds to the owner in slot `i` of the registry's owner set.
/// Membership tests and counting are constant-time for the small owner sets
/// a registry holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, BasicSbor)]
pub struct ConfirmationBitfield {
    /// The bitfield bytes.
    bits: Vec<u8>,
    /// Number of owner slots (bits that are valid).
    num_owners: usize,
}

impl ConfirmationBitfield {
    /// Create a new empty bitfield for the given number of owners.
    pub fn new(num_owners: usize) -> Self {
        Self {
            bits: vec![0u8; num_owners.div_ceil(8)],
            num_owners,
        }
    }

    /// Mark slot as confirmed. Returns false if it was already set or out of range.
    pub fn set(&mut self, slot: usize) -> bool {
        if slot >= self.num_owners || self.is_set(slot) {
            return false;
        }
        self.bits[slot / 8] |= 1 << (slot % 8);
        true
    }

    /// Clear a slot. Returns false if it was not set.
    pub fn clear(&mut self, slot: usize) -> bool {
        if !self.is_set(slot) {
            return false;
        }
        self.bits[slot / 8] &= !(1 << (slot % 8));
        true
    }

    /// Check if a slot is set.
    pub fn is_set(&self, slot: usize) -> bool {
        if slot >= self.num_owners {
            return false;
        }
        (self.bits[slot / 8] >> (slot % 8)) & 1 == 1
    }

    /// Count the number of confirmations.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Iterator over confirmed slots, ascending.
    pub fn set_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_owners).filter(|&i| self.is_set(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitfield_basic() {
        let mut bf = ConfirmationBitfield::new(10);
        assert_eq!(bf.count(), 0);

        assert!(bf.set(0));
        assert!(bf.set(5));
        assert!(bf.set(9));

        assert!(bf.is_set(5));
        assert!(!bf.is_set(1));
        assert!(!bf.is_set(10)); // out of range
        assert_eq!(bf.count(), 3);
    }

    #[test]
    fn test_set_is_rejecting() {
        let mut bf = ConfirmationBitfield::new(3);
        assert!(bf.set(2));
        assert!(!bf.set(2));
        assert!(!bf.set(3));
        assert_eq!(bf.count(), 1);
    }

    #[test]
    fn test_clear_inverts_set() {
        let mut bf = ConfirmationBitfield::new(8);
        let before = bf.clone();
        bf.set(3);
        assert!(bf.clear(3));
        assert_eq!(bf, before);
        assert!(!bf.clear(3));
    }

    #[test]
    fn test_set_slots() {
        let mut bf = ConfirmationBitfield::new(12);
        bf.set(1);
        bf.set(8);
        bf.set(11);
        assert_eq!(bf.set_slots().collect::<Vec<_>>(), vec![1, 8, 11]);
    }
}
