//! Error taxonomy shared by the registry, the relay and the substrate.
//!
//! Every error aborts the call that produced it; the substrate rolls back
//! all of that call's effects. Nothing is retried.

use multisig_types::{AccountId, Amount, CodecError, TxIndex};
use thiserror::Error;

/// Invalid registry construction parameters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("owners required")]
    NoOwners,

    #[error("owner not unique: {0}")]
    DuplicateOwner(AccountId),

    #[error("invalid number of required confirmations: {threshold} of {owners} owners")]
    InvalidThreshold { threshold: usize, owners: usize },
}

/// Failures of registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Caller is not in the owner set.
    #[error("not owner")]
    NotOwner,

    #[error("tx does not exist: {index}")]
    NoSuchTransaction { index: TxIndex },

    #[error("tx already executed")]
    AlreadyExecuted,

    #[error("tx already confirmed")]
    AlreadyConfirmedByCaller,

    #[error("tx not confirmed")]
    NotYetConfirmedByCaller,

    #[error("cannot execute tx: {confirmations} of {threshold} confirmations")]
    QuorumNotMet {
        confirmations: usize,
        threshold: usize,
    },

    /// The payload dispatch failed; the execute call was reverted.
    #[error("tx failed: {0}")]
    DispatchFailed(Box<DispatchError>),
}

/// Failures of the atomic batch relay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BatchError {
    #[error("length mismatch: {targets} targets, {payloads} payloads, {values} values")]
    LengthMismatch {
        targets: usize,
        payloads: usize,
        values: usize,
    },

    /// Step `index` failed; no step of the batch has any effect.
    #[error("batch step {index} failed: {source}")]
    BatchStepFailed {
        index: usize,
        source: Box<DispatchError>,
    },
}

/// Failures reported by a dispatch through the execution substrate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error("insufficient balance: available {available}, required {required}")]
    InsufficientBalance { available: Amount, required: Amount },

    #[error("balance overflow crediting {account}")]
    BalanceOverflow { account: AccountId },

    #[error("{contract} does not accept value with a call")]
    NonPayable { contract: AccountId },

    #[error("payload decode failed: {0}")]
    Decode(#[from] CodecError),

    #[error("call depth exceeded: max {max}")]
    CallDepthExceeded { max: usize },

    #[error("{0} has no code")]
    UnknownContract(AccountId),

    #[error("query not supported")]
    QueryUnsupported,

    #[error("state of {0} is missing or has an unexpected type")]
    CorruptState(AccountId),

    /// Free-form revert from a contract outside this workspace.
    #[error("reverted: {0}")]
    Reverted(String),
}

impl DispatchError {
    /// Follow nested dispatch and batch-step failures to the error that started them.
    pub fn root_cause(&self) -> &DispatchError {
        match self {
            DispatchError::Registry(RegistryError::DispatchFailed(inner))
            | DispatchError::Batch(BatchError::BatchStepFailed { source: inner, .. }) => {
                inner.root_cause()
            }
            other => other,
        }
    }

    /// The registry error at the root of this failure, if any.
    pub fn registry_error(&self) -> Option<&RegistryError> {
        match self.root_cause() {
            DispatchError::Registry(e) => Some(e),
            _ => None,
        }
    }

    /// Short stable label, for counting failures by kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Registry(e) => e.kind(),
            DispatchError::Batch(BatchError::LengthMismatch { .. }) => "length_mismatch",
            DispatchError::Batch(BatchError::BatchStepFailed { .. }) => "batch_step_failed",
            DispatchError::InsufficientBalance { .. } => "insufficient_balance",
            DispatchError::BalanceOverflow { .. } => "balance_overflow",
            DispatchError::NonPayable { .. } => "non_payable",
            DispatchError::Decode(_) => "decode",
            DispatchError::CallDepthExceeded { .. } => "call_depth_exceeded",
            DispatchError::UnknownContract(_) => "unknown_contract",
            DispatchError::QueryUnsupported => "query_unsupported",
            DispatchError::CorruptState(_) => "corrupt_state",
            DispatchError::Reverted(_) => "reverted",
        }
    }
}

impl RegistryError {
    /// Short stable label, for counting failures by kind.
    pub fn kind(&self) -> &'static str {
        match self {
            RegistryError::NotOwner => "not_owner",
            RegistryError::NoSuchTransaction { .. } => "no_such_transaction",
            RegistryError::AlreadyExecuted => "already_executed",
            RegistryError::AlreadyConfirmedByCaller => "already_confirmed",
            RegistryError::NotYetConfirmedByCaller => "not_confirmed",
            RegistryError::QuorumNotMet { .. } => "quorum_not_met",
            RegistryError::DispatchFailed(_) => "dispatch_failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_revert_reasons() {
        assert_eq!(RegistryError::NotOwner.to_string(), "not owner");
        assert_eq!(
            RegistryError::AlreadyConfirmedByCaller.to_string(),
            "tx already confirmed"
        );
        assert_eq!(
            RegistryError::NoSuchTransaction { index: TxIndex(1) }.to_string(),
            "tx does not exist: tx#1"
        );
    }

    #[test]
    fn test_root_cause_unwraps_batch_and_dispatch() {
        let inner = DispatchError::Registry(RegistryError::NotOwner);
        let step = DispatchError::Batch(BatchError::BatchStepFailed {
            index: 1,
            source: Box::new(DispatchError::Registry(RegistryError::DispatchFailed(
                Box::new(inner.clone()),
            ))),
        });
        assert_eq!(step.root_cause(), &inner);
        assert_eq!(step.registry_error(), Some(&RegistryError::NotOwner));
        assert_eq!(step.kind(), "batch_step_failed");
    }

    #[test]
    fn test_non_registry_root() {
        let err = DispatchError::InsufficientBalance {
            available: 1,
            required: 2,
        };
        assert_eq!(err.registry_error(), None);
        assert_eq!(err.kind(), "insufficient_balance");
    }
}
