//! Configuration types for the simulator.

use crate::SimulatorError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a simulation run.
///
/// Every field has a default, so a TOML file only needs the values it
/// changes:
///
/// ```toml
/// owners = 5
/// threshold = 3
/// steps = 2000
///
/// [workload]
/// execute = 4
/// outsider = 0
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Number of registry owners, not counting the relay.
    pub owners: usize,

    /// Confirmations required to execute.
    pub threshold: usize,

    /// Enroll the relay as an additional owner.
    pub relay_is_owner: bool,

    /// Number of accounts outside the owner set.
    pub outsiders: usize,

    /// Genesis balance of every owner and outsider.
    pub initial_balance: u64,

    /// Upper bound of a single deposit.
    pub deposit_amount: u64,

    /// Upper bound of the value attached to a submitted record.
    pub max_value: u64,

    /// Number of operations to run.
    pub steps: u64,

    /// Random seed for deterministic simulation.
    pub seed: u64,

    /// Workload configuration.
    pub workload: WorkloadConfig,
}

impl SimulatorConfig {
    /// Create a new simulator configuration.
    pub fn new(owners: usize, threshold: usize) -> Self {
        Self {
            owners,
            threshold,
            relay_is_owner: true,
            outsiders: 2,
            initial_balance: 10_000,
            deposit_amount: 500,
            max_value: 300,
            steps: 1_000,
            seed: 12345,
            workload: WorkloadConfig::default(),
        }
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, SimulatorError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self, SimulatorError> {
        let text = std::fs::read_to_string(path).map_err(|source| SimulatorError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Set the relay's owner enrollment.
    pub fn with_relay_is_owner(mut self, relay_is_owner: bool) -> Self {
        self.relay_is_owner = relay_is_owner;
        self
    }

    /// Set the number of outsider accounts.
    pub fn with_outsiders(mut self, outsiders: usize) -> Self {
        self.outsiders = outsiders;
        self
    }

    /// Set the genesis balance of each account.
    pub fn with_initial_balance(mut self, balance: u64) -> Self {
        self.initial_balance = balance;
        self
    }

    /// Set the number of steps.
    pub fn with_steps(mut self, steps: u64) -> Self {
        self.steps = steps;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the workload configuration.
    pub fn with_workload(mut self, workload: WorkloadConfig) -> Self {
        self.workload = workload;
        self
    }

    /// Owners as enrolled in the registry, relay included.
    pub fn total_owners(&self) -> usize {
        self.owners + usize::from(self.relay_is_owner)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self::new(3, 2)
    }
}

/// Relative weights of the operations the workload picks from.
///
/// A weight of zero disables the operation. At least one weight must be
/// non-zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    pub deposit: u32,
    pub submit: u32,
    pub confirm: u32,
    pub revoke: u32,
    pub execute: u32,
    /// Submit and confirm in one relay call.
    pub relay_submit_confirm: u32,
    /// Confirm and execute in one relay call.
    pub relay_confirm_execute: u32,
    /// Owner-gated call from an account outside the owner set.
    pub outsider: u32,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            deposit: 2,
            submit: 3,
            confirm: 6,
            revoke: 1,
            execute: 3,
            relay_submit_confirm: 1,
            relay_confirm_execute: 1,
            outsider: 1,
        }
    }
}

impl WorkloadConfig {
    /// Only direct owner calls, no relay and no outsiders.
    pub fn direct_only() -> Self {
        Self {
            relay_submit_confirm: 0,
            relay_confirm_execute: 0,
            outsider: 0,
            ..Default::default()
        }
    }

    /// Weights in the order of [`OperationKind::ALL`](crate::OperationKind::ALL).
    pub fn weights(&self) -> [u32; 8] {
        [
            self.deposit,
            self.submit,
            self.confirm,
            self.revoke,
            self.execute,
            self.relay_submit_confirm,
            self.relay_confirm_execute,
            self.outsider,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulatorConfig::from_toml_str(
            r#"
            owners = 5
            threshold = 3
            seed = 7

            [workload]
            outsider = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.owners, 5);
        assert_eq!(config.threshold, 3);
        assert_eq!(config.seed, 7);
        assert_eq!(config.steps, SimulatorConfig::default().steps);
        assert_eq!(config.workload.outsider, 0);
        assert_eq!(config.workload.confirm, WorkloadConfig::default().confirm);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        assert!(matches!(
            SimulatorConfig::from_toml_str("owners = \"three\""),
            Err(SimulatorError::Toml(_))
        ));
    }

    #[test]
    fn test_total_owners_counts_relay() {
        assert_eq!(SimulatorConfig::new(3, 2).total_owners(), 4);
        assert_eq!(
            SimulatorConfig::new(3, 2)
                .with_relay_is_owner(false)
                .total_owners(),
            3
        );
    }
}
