//! Error types for the ledger.

use multisig_types::AccountId;
use thiserror::Error;

/// Errors from ledger administration outside of transactions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Code or state already exists at the derived address.
    #[error("Address already in use: {0}")]
    AddressInUse(AccountId),

    /// Crediting the account would overflow its balance.
    #[error("Balance overflow for {0}")]
    BalanceOverflow(AccountId),
}
