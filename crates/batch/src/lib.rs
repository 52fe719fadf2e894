//! Atomic batch relay.
//!
//! A [`BatchExecutor`] dispatches an ordered list of calls; if any step
//! fails, the whole relay call fails and the ledger discards the effects of
//! every step, including the ones that had succeeded.
//!
//! The relay is the caller of every step it dispatches. To act on a registry
//! through the relay, the relay's address must be one of the registry's
//! owners.
//!
//! # Example
//!
//! ```ignore
//! let call = BatchCall::SubmitAndConfirm { registry, target, value: 0, payload };
//! ledger.transact(alice, relay, 0, &call.encode()?)?;
//! ```

mod contract;
mod sequencer;

pub use contract::BatchExecutor;
pub use sequencer::run_batch;
