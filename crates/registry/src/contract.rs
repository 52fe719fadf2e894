//! The registry deployed as a contract.
//!
//! # Payloads
//!
//! | payload                 | effect                                   |
//! |-------------------------|------------------------------------------|
//! | empty                   | deposit of the attached value            |
//! | `RegistryCall::Submit`  | append a record                          |
//! | `RegistryCall::Confirm` | confirm a record                         |
//! | `RegistryCall::Revoke`  | withdraw a confirmation                  |
//! | `RegistryCall::Execute` | execute a record that reached quorum     |
//!
//! Non-empty payloads must not carry value. A deposit fails only when the
//! ledger rejects the transfer itself (`InsufficientBalance` on the sender or
//! `BalanceOverflow` on the registry account).

use crate::{QuorumRegistry, RegistryConfig};
use multisig_core::{
    ConfigError, Contract, ContractState, DispatchError, Event, Host, RegistryError,
};
use multisig_types::{QueryResponse, RegistryCall, RegistryQuery};
use std::sync::Arc;
use tracing::debug;

/// Code of a deployed registry. State lives in the ledger.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryContract;

impl RegistryContract {
    /// Initial state to deploy a registry with.
    pub fn initial_state(config: RegistryConfig) -> Result<ContractState, ConfigError> {
        Ok(Arc::new(QuorumRegistry::new(config)?))
    }

    fn load(host: &dyn Host) -> Result<QuorumRegistry, DispatchError> {
        let address = host.context().address;
        host.state()
            .and_then(|state| state.downcast::<QuorumRegistry>().ok())
            .map(|registry| (*registry).clone())
            .ok_or(DispatchError::CorruptState(address))
    }
}

impl Contract for RegistryContract {
    fn name(&self) -> &'static str {
        "quorum-registry"
    }

    fn call(&self, host: &mut dyn Host, payload: &[u8]) -> Result<(), DispatchError> {
        let ctx = *host.context();
        let mut registry = Self::load(host)?;

        if payload.is_empty() {
            let balance = registry.deposit(ctx.caller, ctx.value);
            host.set_state(Arc::new(registry));
            host.emit(Event::Deposit {
                sender: ctx.caller,
                amount: ctx.value,
                balance,
            });
            return Ok(());
        }

        if ctx.value > 0 {
            return Err(DispatchError::NonPayable {
                contract: ctx.address,
            });
        }

        let call = RegistryCall::decode(payload)?;
        debug!(
            registry = %ctx.address,
            caller = %ctx.caller,
            depth = ctx.depth,
            op = call.name(),
            "Registry call"
        );

        match call {
            RegistryCall::Submit {
                target,
                value,
                payload,
            } => {
                let index = registry.submit(ctx.caller, target, value, payload.clone())?;
                host.set_state(Arc::new(registry));
                host.emit(Event::SubmitTransaction {
                    owner: ctx.caller,
                    index,
                    target,
                    value,
                    payload,
                });
            }
            RegistryCall::Confirm { index } => {
                registry.confirm(ctx.caller, index)?;
                host.set_state(Arc::new(registry));
                host.emit(Event::ConfirmTransaction {
                    owner: ctx.caller,
                    index,
                });
            }
            RegistryCall::Revoke { index } => {
                registry.revoke(ctx.caller, index)?;
                host.set_state(Arc::new(registry));
                host.emit(Event::RevokeConfirmation {
                    owner: ctx.caller,
                    index,
                });
            }
            RegistryCall::Execute { index } => {
                let dispatch = registry.begin_execute(ctx.caller, index)?;
                // Committed before the dispatch so reentrant calls see it.
                host.set_state(Arc::new(registry));
                host.invoke(dispatch.target, dispatch.value, &dispatch.payload)
                    .map_err(|e| RegistryError::DispatchFailed(Box::new(e)))?;
                host.emit(Event::ExecuteTransaction {
                    owner: ctx.caller,
                    index,
                });
            }
        }
        Ok(())
    }

    fn query(
        &self,
        state: Option<&ContractState>,
        request: &[u8],
    ) -> Result<Vec<u8>, DispatchError> {
        let registry = state
            .and_then(|state| (**state).downcast_ref::<QuorumRegistry>())
            .ok_or(DispatchError::QueryUnsupported)?;

        let response = match RegistryQuery::decode(request)? {
            RegistryQuery::TransactionCount => {
                QueryResponse::Count(registry.transaction_count())
            }
            RegistryQuery::Transaction { index } => {
                QueryResponse::Transaction(registry.transaction(index)?.clone())
            }
            RegistryQuery::IsConfirmed { index, owner } => {
                QueryResponse::Confirmed(registry.is_confirmed(index, owner))
            }
            RegistryQuery::Owners => QueryResponse::Owners(registry.owners().collect()),
            RegistryQuery::Threshold => QueryResponse::Threshold(registry.threshold() as u64),
            RegistryQuery::Balance => QueryResponse::Balance(registry.balance()),
        };
        Ok(response.encode()?)
    }
}
