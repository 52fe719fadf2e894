//! Quorum-gated transaction registry.
//!
//! A fixed set of owners proposes operations (a target, a value and an opaque
//! payload), confirms them, and executes any operation that `threshold`
//! distinct owners confirm. Each operation executes at most once.
//!
//! [`QuorumRegistry`] is the state object and can be driven directly with any
//! [`Dispatcher`](multisig_core::Dispatcher). [`RegistryContract`] deploys it
//! on the ledger, where its state is committed before every outbound
//! dispatch:
//!
//! ```text
//! execute(index)
//!   ├─ checks: owner, exists, not executed, quorum, balance
//!   ├─ effects: executed = true, balance -= value   (stored)
//!   └─ interaction: dispatch(target, value, payload)
//!        └─ on failure the whole call reverts
//! ```

mod config;
mod contract;
mod registry;

pub use config::RegistryConfig;
pub use contract::RegistryContract;
pub use registry::{Dispatch, QuorumRegistry};
