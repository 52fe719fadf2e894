//! Core traits for contracts and the substrate they run on.

use crate::{CallContext, DispatchError, Event};
use multisig_types::{AccountId, Amount};
use std::any::Any;
use std::sync::Arc;

/// Per-contract state held by the substrate.
///
/// Stored behind an `Arc` so the substrate can snapshot all contract state in
/// O(1). Contracts never mutate a stored value in place: they clone, modify
/// and store the new value through [`Host::set_state`].
pub type ContractState = Arc<dyn Any + Send + Sync>;

/// Capability to deliver a value/payload pair to an account.
///
/// This is the only way the registry and relay reach the outside world. The
/// payload is opaque here; only the receiving account interprets it.
pub trait Dispatcher {
    /// Dispatch `payload` and `value` to `target`.
    ///
    /// On error, none of the dispatch's effects are visible afterwards.
    fn invoke(
        &mut self,
        target: AccountId,
        value: Amount,
        payload: &[u8],
    ) -> Result<(), DispatchError>;
}

/// The substrate as seen from inside one call frame.
///
/// Dispatches issued through a host originate from the executing contract:
/// the target sees the contract's address as its caller.
pub trait Host: Dispatcher {
    /// Identity and value of the current call.
    fn context(&self) -> &CallContext;

    /// The executing contract's state, if any has been stored.
    fn state(&self) -> Option<ContractState>;

    /// Replace the executing contract's state.
    ///
    /// Takes effect immediately: calls dispatched afterwards, including
    /// reentrant calls into this contract, observe the new state.
    fn set_state(&mut self, state: ContractState);

    /// Record a notification.
    fn emit(&mut self, event: Event);

    /// Read-only query against another contract.
    fn query(&self, target: AccountId, request: &[u8]) -> Result<Vec<u8>, DispatchError>;

    /// Current balance of the executing contract.
    fn balance(&self) -> Amount;
}

/// Code deployed at an account.
///
/// Contracts hold no state of their own: everything that must survive a call
/// lives in the substrate and is reached through the [`Host`].
pub trait Contract: Send + Sync {
    /// Name for logs.
    fn name(&self) -> &'static str;

    /// Handle an inbound call. Any value sent with the call has already been
    /// credited to the contract when this runs.
    fn call(&self, host: &mut dyn Host, payload: &[u8]) -> Result<(), DispatchError>;

    /// Answer a read-only request against `state`.
    fn query(
        &self,
        state: Option<&ContractState>,
        request: &[u8],
    ) -> Result<Vec<u8>, DispatchError> {
        let _ = (state, request);
        Err(DispatchError::QueryUnsupported)
    }
}
