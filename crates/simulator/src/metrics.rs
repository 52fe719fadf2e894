//! Outcome counting and the final simulation report.

use crate::accounts::AccountUsageStats;
use crate::invariants::Violation;
use crate::workload::OperationKind;
use multisig_core::DispatchError;
use multisig_types::Amount;
use std::collections::BTreeMap;

/// Attempts and successes of one operation kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OperationStats {
    pub attempted: u64,
    pub succeeded: u64,
}

impl OperationStats {
    pub fn failed(&self) -> u64 {
        self.attempted - self.succeeded
    }
}

/// Accumulates outcomes while a simulation runs.
#[derive(Debug, Default)]
pub struct MetricsCollector {
    steps: u64,
    skipped: u64,
    operations: BTreeMap<OperationKind, OperationStats>,
    errors: BTreeMap<&'static str, u64>,
    executed: u64,
    value_moved: Amount,
    violations: Vec<(u64, Violation)>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a step for which no operation could be generated.
    pub fn record_skipped(&mut self) {
        self.steps += 1;
        self.skipped += 1;
    }

    /// Count a committed operation.
    pub fn record_success(&mut self, kind: OperationKind) {
        self.steps += 1;
        let stats = self.operations.entry(kind).or_default();
        stats.attempted += 1;
        stats.succeeded += 1;
    }

    /// Count a reverted operation under the kind of its root cause.
    pub fn record_failure(&mut self, kind: OperationKind, error: &DispatchError) {
        self.steps += 1;
        self.operations.entry(kind).or_default().attempted += 1;
        *self.errors.entry(error.root_cause().kind()).or_insert(0) += 1;
    }

    /// Count a record that executed during the last step.
    pub fn record_execution(&mut self, value: Amount) {
        self.executed += 1;
        self.value_moved = self.value_moved.saturating_add(value);
    }

    pub fn record_violation(&mut self, step: u64, violation: Violation) {
        self.violations.push((step, violation));
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Build the final report.
    pub fn finish(
        self,
        seed: u64,
        log_length: u64,
        registry_balance: Amount,
        account_usage: AccountUsageStats,
    ) -> SimulationReport {
        SimulationReport {
            seed,
            steps: self.steps,
            skipped: self.skipped,
            operations: self.operations,
            errors: self.errors,
            executed: self.executed,
            value_moved: self.value_moved,
            log_length,
            registry_balance,
            violations: self.violations,
            account_usage,
        }
    }
}

/// Results of a simulation run.
///
/// Two runs with the same configuration produce equal reports.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationReport {
    pub seed: u64,
    pub steps: u64,
    /// Steps where the pool had no account for the chosen operation.
    pub skipped: u64,
    pub operations: BTreeMap<OperationKind, OperationStats>,
    /// Reverts by root-cause kind.
    pub errors: BTreeMap<&'static str, u64>,
    /// Records executed.
    pub executed: u64,
    /// Value dispatched by executed records.
    pub value_moved: Amount,
    /// Records in the log at the end of the run.
    pub log_length: u64,
    pub registry_balance: Amount,
    /// Broken invariants, with the step that broke them.
    pub violations: Vec<(u64, Violation)>,
    pub account_usage: AccountUsageStats,
}

impl SimulationReport {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// Committed operations across all kinds.
    pub fn succeeded(&self) -> u64 {
        self.operations.values().map(|s| s.succeeded).sum()
    }

    /// Print a human-readable summary to stdout.
    pub fn print(&self) {
        println!("=== Simulation Report (seed {}) ===", self.seed);
        println!(
            "Steps: {} ({} committed, {} skipped)",
            self.steps,
            self.succeeded(),
            self.skipped
        );
        println!();
        println!("{:<24} {:>10} {:>10} {:>10}", "operation", "attempted", "ok", "failed");
        for (kind, stats) in &self.operations {
            println!(
                "{:<24} {:>10} {:>10} {:>10}",
                kind.name(),
                stats.attempted,
                stats.succeeded,
                stats.failed()
            );
        }
        if !self.errors.is_empty() {
            println!();
            println!("Reverts by cause:");
            for (kind, count) in &self.errors {
                println!("  {:<22} {:>10}", kind, count);
            }
        }
        println!();
        println!("Records in log:    {}", self.log_length);
        println!("Records executed:  {}", self.executed);
        println!("Value moved:       {}", self.value_moved);
        println!("Registry balance:  {}", self.registry_balance);
        println!(
            "Account usage:     {} selections over {} accounts (skew {:.2})",
            self.account_usage.total_selections,
            self.account_usage.account_count,
            self.account_usage.skew_ratio()
        );
        println!();
        if self.is_clean() {
            println!("Invariants: all held");
        } else {
            println!("Invariants: {} violations", self.violations.len());
            for (step, violation) in &self.violations {
                println!("  step {}: {}", step, violation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisig_core::{BatchError, RegistryError};

    #[test]
    fn test_failures_counted_by_root_cause() {
        let mut metrics = MetricsCollector::new();
        let relayed = DispatchError::Batch(BatchError::BatchStepFailed {
            index: 0,
            source: Box::new(RegistryError::NotOwner.into()),
        });

        metrics.record_failure(OperationKind::RelaySubmitConfirm, &relayed);
        metrics.record_failure(OperationKind::Outsider, &RegistryError::NotOwner.into());
        metrics.record_success(OperationKind::Submit);
        metrics.record_skipped();

        let report = metrics.finish(
            1,
            1,
            0,
            AccountUsageStats {
                total_selections: 0,
                avg_selections: 0.0,
                max_selections: 0,
                min_selections: 0,
                account_count: 0,
            },
        );
        assert_eq!(report.steps, 4);
        assert_eq!(report.succeeded(), 1);
        assert_eq!(report.errors.get("not_owner"), Some(&2));
        assert_eq!(
            report.operations[&OperationKind::RelaySubmitConfirm],
            OperationStats {
                attempted: 1,
                succeeded: 0
            }
        );
    }
}
