//! The relay deployed as a contract.

use crate::run_batch;
use multisig_core::{Contract, DispatchError, Host};
use multisig_types::{
    AccountId, BatchCall, CodecError, QueryResponse, RegistryCall, RegistryQuery, TxIndex,
};
use tracing::{debug, info};

/// Stateless relay that runs a [`BatchCall`] as one atomic unit.
///
/// Every step is dispatched with the relay's own address as caller, so a
/// registry sees the relay, not the account that invoked it. Anyone may
/// invoke the relay.
///
/// `SubmitAndConfirm` reads the registry's `TransactionCount` before any step
/// runs. If `registry` has no code or does not answer that query, the call
/// fails with that query error (`UnknownContract`, `QueryUnsupported` or
/// `Decode`) rather than a `BatchError`, and nothing is dispatched.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchExecutor;

impl BatchExecutor {
    /// Ask `registry` for the index its next record will get.
    fn next_index(host: &dyn Host, registry: AccountId) -> Result<TxIndex, DispatchError> {
        let response = host.query(registry, &RegistryQuery::TransactionCount.encode()?)?;
        match QueryResponse::decode(&response)? {
            QueryResponse::Count(count) => Ok(TxIndex(count)),
            other => Err(CodecError::Decode(format!("expected a count, got {:?}", other)).into()),
        }
    }
}

impl Contract for BatchExecutor {
    fn name(&self) -> &'static str {
        "batch-executor"
    }

    fn call(&self, host: &mut dyn Host, payload: &[u8]) -> Result<(), DispatchError> {
        // Plain value transfers just fund the relay.
        if payload.is_empty() {
            return Ok(());
        }

        let ctx = *host.context();
        match BatchCall::decode(payload)? {
            BatchCall::Batch {
                targets,
                payloads,
                values,
            } => {
                debug!(
                    relay = %ctx.address,
                    caller = %ctx.caller,
                    steps = targets.len(),
                    "Running batch"
                );
                run_batch(host, &targets, &payloads, &values)?;
            }
            BatchCall::SubmitAndConfirm {
                registry,
                target,
                value,
                payload,
            } => {
                let index = Self::next_index(host, registry)?;
                let steps = [
                    RegistryCall::Submit {
                        target,
                        value,
                        payload,
                    }
                    .encode()?,
                    RegistryCall::Confirm { index }.encode()?,
                ];
                run_batch(host, &[registry, registry], &steps, &[0, 0])?;
                info!(
                    relay = %ctx.address,
                    registry = %registry,
                    %index,
                    "Submitted and confirmed through relay"
                );
            }
        }
        Ok(())
    }
}
