//! Multisig Simulator
//!
//! A seeded workload simulator for the quorum registry and the batch relay.
//! Drives randomized owner, outsider and relay traffic against a fresh
//! ledger and checks registry invariants after every step.
//!
//! # Architecture
//!
//! - **Account Management**: a pool of funded owners and outsiders
//! - **Workload Generation**: weighted registry, deposit and relay operations
//! - **Invariant Checking**: log, record, quorum and balance invariants per step
//! - **Scenarios**: scripted end-to-end call sequences with fixed expectations
//!
//! # Example
//!
//! ```ignore
//! use multisig_simulator::{Simulator, SimulatorConfig, WorkloadConfig};
//!
//! // Three owners plus the relay, two confirmations required
//! let config = SimulatorConfig::new(3, 2)
//!     .with_steps(10_000)
//!     .with_workload(WorkloadConfig::default());
//!
//! let report = Simulator::new(config)?.run()?;
//! assert!(report.is_clean());
//! report.print();
//! ```

pub mod accounts;
pub mod config;
pub mod error;
pub mod invariants;
pub mod metrics;
pub mod runner;
pub mod scenarios;
pub mod workload;

pub use accounts::{AccountPool, AccountUsageStats, Role};
pub use config::{SimulatorConfig, WorkloadConfig};
pub use error::SimulatorError;
pub use invariants::{InvariantChecker, Violation};
pub use metrics::{MetricsCollector, OperationStats, SimulationReport};
pub use runner::Simulator;
pub use scenarios::Scenario;
pub use workload::{Action, Operation, OperationKind, Workload};
