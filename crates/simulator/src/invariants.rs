//! Registry and ledger invariants checked after every simulation step.

use multisig_engine::Ledger;
use multisig_registry::QuorumRegistry;
use multisig_types::{AccountId, Amount, TxIndex};
use thiserror::Error;

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("registry state missing from the ledger")]
    MissingState,

    #[error("log shrank from {before} to {after} records")]
    LogShrank { before: u64, after: u64 },

    #[error("{index}: immutable fields changed")]
    RecordChanged { index: TxIndex },

    #[error("{index}: executed flag was cleared")]
    ExecutionReverted { index: TxIndex },

    #[error("{index}: confirmations changed after execution")]
    ExecutedRecordChanged { index: TxIndex },

    #[error("{index}: executed with {confirmations} of {threshold} confirmations")]
    ExecutedWithoutQuorum {
        index: TxIndex,
        confirmations: usize,
        threshold: usize,
    },

    #[error("{index}: {confirmations} confirmations from {owners} owners")]
    TooManyConfirmations {
        index: TxIndex,
        confirmations: usize,
        owners: usize,
    },

    #[error("registry records balance {state}, ledger holds {ledger}")]
    BalanceMismatch { state: Amount, ledger: Amount },

    #[error("total supply changed from {expected} to {actual}")]
    SupplyChanged { expected: Amount, actual: Amount },

    #[error("{operation} from an outsider was not rejected as not owner: {outcome}")]
    OutsiderNotRejected {
        operation: &'static str,
        outcome: String,
    },
}

/// Compares each registry state with the one from the previous step.
pub struct InvariantChecker {
    registry: AccountId,
    total_supply: Amount,
    previous: Option<QuorumRegistry>,
}

impl InvariantChecker {
    /// Start checking `registry`, taking the ledger's current supply as fixed.
    pub fn new(ledger: &Ledger, registry: AccountId) -> Self {
        Self {
            registry,
            total_supply: ledger.total_supply(),
            previous: ledger.state::<QuorumRegistry>(registry).cloned(),
        }
    }

    /// Check every invariant against the ledger's current state.
    pub fn check(&mut self, ledger: &Ledger) -> Vec<Violation> {
        let mut violations = Vec::new();

        let actual = ledger.total_supply();
        if actual != self.total_supply {
            violations.push(Violation::SupplyChanged {
                expected: self.total_supply,
                actual,
            });
        }

        let Some(current) = ledger.state::<QuorumRegistry>(self.registry) else {
            violations.push(Violation::MissingState);
            return violations;
        };

        let held = ledger.balance(self.registry);
        if current.balance() != held {
            violations.push(Violation::BalanceMismatch {
                state: current.balance(),
                ledger: held,
            });
        }

        let owners = current.owners().len();
        for record in current.transactions() {
            let confirmations = record.confirmation_count();
            if confirmations > owners {
                violations.push(Violation::TooManyConfirmations {
                    index: record.index(),
                    confirmations,
                    owners,
                });
            }
            if record.executed() && confirmations < current.threshold() {
                violations.push(Violation::ExecutedWithoutQuorum {
                    index: record.index(),
                    confirmations,
                    threshold: current.threshold(),
                });
            }
        }

        if let Some(previous) = &self.previous {
            Self::compare(previous, current, &mut violations);
        }
        self.previous = Some(current.clone());
        violations
    }

    fn compare(previous: &QuorumRegistry, current: &QuorumRegistry, out: &mut Vec<Violation>) {
        let before = previous.transaction_count();
        let after = current.transaction_count();
        if after < before {
            out.push(Violation::LogShrank { before, after });
            return;
        }

        for (old, new) in previous.transactions().zip(current.transactions()) {
            let index = old.index();
            if old.index() != new.index()
                || old.target() != new.target()
                || old.value() != new.value()
                || old.payload() != new.payload()
            {
                out.push(Violation::RecordChanged { index });
            }
            if old.executed() && !new.executed() {
                out.push(Violation::ExecutionReverted { index });
            }
            if old.executed() && old.confirmations() != new.confirmations() {
                out.push(Violation::ExecutedRecordChanged { index });
            }
        }
    }
}
