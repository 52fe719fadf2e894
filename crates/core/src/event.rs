//! Notifications emitted on registry state changes.

use multisig_types::{AccountId, Amount, TxIndex};

/// Registry notifications.
///
/// Each variant carries enough data for an external observer to rebuild the
/// registry's state from the event stream alone, without polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Value received by the registry.
    Deposit {
        sender: AccountId,
        amount: Amount,
        /// Registry balance after the credit.
        balance: Amount,
    },

    /// A new record was appended to the log.
    SubmitTransaction {
        owner: AccountId,
        index: TxIndex,
        target: AccountId,
        value: Amount,
        payload: Vec<u8>,
    },

    ConfirmTransaction { owner: AccountId, index: TxIndex },

    RevokeConfirmation { owner: AccountId, index: TxIndex },

    ExecuteTransaction { owner: AccountId, index: TxIndex },
}

impl Event {
    /// Get a human-readable name for this event type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Event::Deposit { .. } => "Deposit",
            Event::SubmitTransaction { .. } => "SubmitTransaction",
            Event::ConfirmTransaction { .. } => "ConfirmTransaction",
            Event::RevokeConfirmation { .. } => "RevokeConfirmation",
            Event::ExecuteTransaction { .. } => "ExecuteTransaction",
        }
    }
}

/// An event as recorded by the substrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedEvent {
    /// Contract that emitted the event.
    pub emitter: AccountId,
    /// Sequence number of the transaction the event belongs to.
    pub sequence: u64,
    pub event: Event,
}
