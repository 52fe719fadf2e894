//! Core abstractions shared by the registry, the relay and the substrate.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   invoke(target, value, payload)   ┌────────────┐
//! │ Contract (registry,  │ ─────────────────────────────────▶ │ Dispatcher │
//! │ relay, ...)          │ ◀───── state / emit / query ────── │  / Host    │
//! └──────────────────────┘                                     └────────────┘
//! ```
//!
//! Contracts are code only. The [`Host`] owns their state, moves value,
//! records [`Event`]s and provides atomicity: a call that returns an error
//! leaves no trace.

mod context;
mod error;
mod event;
mod traits;

pub use context::CallContext;
pub use error::{BatchError, ConfigError, DispatchError, RegistryError};
pub use event::{EmittedEvent, Event};
pub use traits::{Contract, ContractState, Dispatcher, Host};
