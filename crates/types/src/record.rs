//! Transaction records held in a registry log.

use crate::{AccountId, Amount, ConfirmationBitfield, TxIndex};
use sbor::prelude::*;

/// One proposed operation and its confirmation tally.
///
/// Records are created by the registry on submit and only ever mutated
/// through the registry's confirm, revoke and execute operations. The
/// `executed` flag is monotonic.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct TransactionRecord {
    index: TxIndex,
    target: AccountId,
    value: Amount,
    payload: Vec<u8>,
    executed: bool,
    confirmations: ConfirmationBitfield,
}

impl TransactionRecord {
    /// Create a pending record with no confirmations.
    pub fn new(
        index: TxIndex,
        target: AccountId,
        value: Amount,
        payload: Vec<u8>,
        num_owners: usize,
    ) -> Self {
        Self {
            index,
            target,
            value,
            payload,
            executed: false,
            confirmations: ConfirmationBitfield::new(num_owners),
        }
    }

    pub fn index(&self) -> TxIndex {
        self.index
    }

    pub fn target(&self) -> AccountId {
        self.target
    }

    pub fn value(&self) -> Amount {
        self.value
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn executed(&self) -> bool {
        self.executed
    }

    /// Confirmations by owner slot.
    pub fn confirmations(&self) -> &ConfirmationBitfield {
        &self.confirmations
    }

    /// Number of distinct owners that currently confirm this record.
    pub fn confirmation_count(&self) -> usize {
        self.confirmations.count()
    }

    /// Whether the owner in `slot` confirms this record.
    pub fn is_confirmed_by(&self, slot: usize) -> bool {
        self.confirmations.is_set(slot)
    }

    /// Record a confirmation. Returns false if the slot already confirmed.
    pub fn add_confirmation(&mut self, slot: usize) -> bool {
        self.confirmations.set(slot)
    }

    /// Withdraw a confirmation. Returns false if the slot had not confirmed.
    pub fn remove_confirmation(&mut self, slot: usize) -> bool {
        self.confirmations.clear(slot)
    }

    /// Move the record into its terminal state.
    pub fn mark_executed(&mut self) {
        self.executed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> TransactionRecord {
        TransactionRecord::new(
            TxIndex(4),
            AccountId::from_seed(b"target"),
            5,
            vec![0x00],
            3,
        )
    }

    #[test]
    fn test_new_record_is_pending() {
        let rec = record();
        assert_eq!(rec.index(), TxIndex(4));
        assert_eq!(rec.value(), 5);
        assert_eq!(rec.payload(), &[0x00]);
        assert!(!rec.executed());
        assert_eq!(rec.confirmation_count(), 0);
    }

    #[test]
    fn test_confirmations_are_per_slot() {
        let mut rec = record();
        assert!(rec.add_confirmation(0));
        assert!(!rec.add_confirmation(0));
        assert!(rec.add_confirmation(2));
        assert_eq!(rec.confirmation_count(), 2);
        assert!(rec.remove_confirmation(0));
        assert!(!rec.is_confirmed_by(0));
        assert!(rec.is_confirmed_by(2));
    }

    #[test]
    fn test_mark_executed_is_terminal() {
        let mut rec = record();
        rec.mark_executed();
        assert!(rec.executed());
        rec.mark_executed();
        assert!(rec.executed());
    }
}
