//! Call payload format for registry and relay contracts.
//!
//! # Wire Format
//!
//! Every payload is a single SBOR-encoded call enum:
//!
//! ```text
//! [SBOR RegistryCall | RegistryQuery | BatchCall | QueryResponse]
//! ```
//!
//! An empty payload is not a call: contracts treat it as a plain value
//! transfer. The substrate never looks inside payloads; only the receiving
//! contract decodes them.

use crate::{AccountId, Amount, TransactionRecord, TxIndex};
use sbor::prelude::*;
use thiserror::Error;

/// Errors that can occur during payload encoding/decoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("SBOR encode error: {0}")]
    Encode(String),

    #[error("SBOR decode error: {0}")]
    Decode(String),
}

macro_rules! sbor_codec {
    ($ty:ty) => {
        impl $ty {
            /// SBOR-encode into a call payload.
            pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
                sbor::basic_encode(self).map_err(|e| CodecError::Encode(format!("{:?}", e)))
            }

            /// Decode from a call payload.
            pub fn decode(payload: &[u8]) -> Result<Self, CodecError> {
                sbor::basic_decode(payload).map_err(|e| CodecError::Decode(format!("{:?}", e)))
            }
        }
    };
}

/// Owner-gated registry operations.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub enum RegistryCall {
    /// Propose a new operation.
    Submit {
        target: AccountId,
        value: Amount,
        payload: Vec<u8>,
    },
    /// Confirm a pending operation.
    Confirm { index: TxIndex },
    /// Withdraw an earlier confirmation.
    Revoke { index: TxIndex },
    /// Dispatch an operation that reached quorum.
    Execute { index: TxIndex },
}

sbor_codec!(RegistryCall);

impl RegistryCall {
    /// Operation name, for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            RegistryCall::Submit { .. } => "submit",
            RegistryCall::Confirm { .. } => "confirm",
            RegistryCall::Revoke { .. } => "revoke",
            RegistryCall::Execute { .. } => "execute",
        }
    }
}

/// Read-only registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub enum RegistryQuery {
    TransactionCount,
    Transaction { index: TxIndex },
    IsConfirmed { index: TxIndex, owner: AccountId },
    Owners,
    Threshold,
    Balance,
}

sbor_codec!(RegistryQuery);

/// Answers to [`RegistryQuery`].
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub enum QueryResponse {
    Count(u64),
    Transaction(TransactionRecord),
    Confirmed(bool),
    Owners(Vec<AccountId>),
    Threshold(u64),
    Balance(Amount),
}

sbor_codec!(QueryResponse);

/// One step of a batch: a dispatch of `payload` and `value` to `target`.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub struct Call {
    pub target: AccountId,
    pub value: Amount,
    pub payload: Vec<u8>,
}

impl Call {
    /// Create a new call.
    pub fn new(target: AccountId, value: Amount, payload: Vec<u8>) -> Self {
        Self {
            target,
            value,
            payload,
        }
    }

    /// A registry operation with no attached value.
    pub fn registry(registry: AccountId, call: &RegistryCall) -> Result<Self, CodecError> {
        Ok(Self::new(registry, 0, call.encode()?))
    }
}

/// Operations of the atomic batch relay.
#[derive(Debug, Clone, PartialEq, Eq, BasicSbor)]
pub enum BatchCall {
    /// Dispatch `(targets[i], payloads[i], values[i])` for every `i`, in order.
    Batch {
        targets: Vec<AccountId>,
        payloads: Vec<Vec<u8>>,
        values: Vec<Amount>,
    },
    /// Submit to `registry` and confirm the resulting index in one unit.
    SubmitAndConfirm {
        registry: AccountId,
        target: AccountId,
        value: Amount,
        payload: Vec<u8>,
    },
}

sbor_codec!(BatchCall);

impl BatchCall {
    /// Build a `Batch` from a sequence of calls.
    pub fn from_calls(calls: impl IntoIterator<Item = Call>) -> Self {
        let mut targets = Vec::new();
        let mut payloads = Vec::new();
        let mut values = Vec::new();
        for call in calls {
            targets.push(call.target);
            payloads.push(call.payload);
            values.push(call.value);
        }
        BatchCall::Batch {
            targets,
            payloads,
            values,
        }
    }

    /// Confirm `index` on `registry` and execute it in the same unit.
    pub fn confirm_and_execute(registry: AccountId, index: TxIndex) -> Result<Self, CodecError> {
        Ok(Self::from_calls([
            Call::registry(registry, &RegistryCall::Confirm { index })?,
            Call::registry(registry, &RegistryCall::Execute { index })?,
        ]))
    }
}
