//! Core types for the quorum transaction registry.
//!
//! This crate holds the data shared by every other crate in the workspace:
//!
//! - Identifiers: [`AccountId`], [`TxIndex`], [`Amount`]
//! - Registry data: [`TransactionRecord`] and its [`ConfirmationBitfield`]
//! - The call ABI: SBOR-encoded payloads for registry and relay contracts
//!
//! Nothing here performs I/O or holds mutable global state.

pub mod abi;
mod confirmations;
mod identifiers;
mod record;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use abi::{BatchCall, Call, CodecError, QueryResponse, RegistryCall, RegistryQuery};
pub use confirmations::ConfirmationBitfield;
pub use identifiers::{AccountId, Amount, HexError, TxIndex};
pub use record::TransactionRecord;
