//! In-memory execution substrate.
//!
//! The ledger runs top-level transactions one at a time. Each transaction is
//! a tree of call frames; a frame that fails leaves no trace of itself or of
//! anything it dispatched, while its caller continues and decides whether to
//! propagate the failure.
//!
//! ```text
//! transact(sender, target, value, payload)
//!   └─ dispatch(frame 0)         snapshot world
//!        ├─ transfer value
//!        ├─ contract.call(host)
//!        │    └─ host.invoke ──► dispatch(frame 1)   snapshot world
//!        │                          ...
//!        └─ on error: restore snapshot
//! ```
//!
//! World state lives in persistent maps, so a snapshot is a pointer copy.

mod config;
mod error;
mod frame;
mod ledger;
mod receipt;

pub use config::LedgerConfig;
pub use error::LedgerError;
pub use ledger::Ledger;
pub use receipt::Receipt;
