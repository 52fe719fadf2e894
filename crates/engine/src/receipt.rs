//! Result of a committed transaction.

use multisig_core::{EmittedEvent, Event};
use multisig_types::AccountId;

/// Record of one committed top-level transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Position of the transaction in the ledger's total order.
    pub sequence: u64,
    pub sender: AccountId,
    pub target: AccountId,
    /// Events emitted by the transaction, in emission order.
    pub events: Vec<EmittedEvent>,
}

impl Receipt {
    /// Iterate the bare events.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().map(|e| &e.event)
    }

    /// Events emitted by a specific contract.
    pub fn events_from(&self, emitter: AccountId) -> impl Iterator<Item = &Event> {
        self.events
            .iter()
            .filter(move |e| e.emitter == emitter)
            .map(|e| &e.event)
    }
}
