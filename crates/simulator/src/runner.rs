//! The simulation loop.

use crate::accounts::AccountPool;
use crate::invariants::{InvariantChecker, Violation};
use crate::metrics::{MetricsCollector, SimulationReport};
use crate::workload::{Operation, OperationKind, Workload};
use crate::{SimulatorConfig, SimulatorError};
use multisig_batch::BatchExecutor;
use multisig_core::{DispatchError, Event, RegistryError};
use multisig_engine::{Ledger, LedgerConfig, Receipt};
use multisig_registry::{QuorumRegistry, RegistryConfig, RegistryContract};
use multisig_types::{AccountId, Amount};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Drives a seeded workload against a registry and relay on a fresh ledger.
pub struct Simulator {
    config: SimulatorConfig,
    ledger: Ledger,
    registry: AccountId,
    relay: AccountId,
    accounts: AccountPool,
    workload: Workload,
    checker: InvariantChecker,
    metrics: MetricsCollector,
    rng: ChaCha8Rng,
}

impl Simulator {
    /// Build the ledger: fund the pool, deploy the relay, then the registry.
    pub fn new(config: SimulatorConfig) -> Result<Self, SimulatorError> {
        let accounts = AccountPool::generate(config.owners, config.outsiders);
        let mut ledger = Ledger::new(LedgerConfig::default());
        for (account, balance) in accounts.genesis_balances(Amount::from(config.initial_balance)) {
            ledger.fund(account, balance)?;
        }

        let deployer = AccountId::from_seed(b"multisig-sim/deployer");
        let relay = ledger.deploy(deployer, Arc::new(BatchExecutor), None)?;

        let mut owners = accounts.owners().to_vec();
        if config.relay_is_owner {
            owners.push(relay);
        }
        let state = RegistryContract::initial_state(RegistryConfig::new(owners, config.threshold))?;
        let registry = ledger.deploy(deployer, Arc::new(RegistryContract), Some(state))?;

        let workload = Workload::new(&config, registry, relay)?;
        let checker = InvariantChecker::new(&ledger, registry);

        info!(
            owners = config.total_owners(),
            threshold = config.threshold,
            relay_is_owner = config.relay_is_owner,
            seed = config.seed,
            registry = %registry,
            relay = %relay,
            "Simulator ready"
        );

        Ok(Self {
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
            ledger,
            registry,
            relay,
            accounts,
            workload,
            checker,
            metrics: MetricsCollector::new(),
        })
    }

    /// Run the configured number of steps and report.
    pub fn run(mut self) -> Result<SimulationReport, SimulatorError> {
        for _ in 0..self.config.steps {
            self.step()?;
        }

        let violations = self.metrics.violation_count();
        info!(
            steps = self.metrics.steps(),
            violations,
            "Simulation finished"
        );

        let state = self.state();
        let log_length = state.map(|s| s.transaction_count()).unwrap_or(0);
        let balance = state.map(|s| s.balance()).unwrap_or(0);
        let usage = self.accounts.usage_stats();
        Ok(self
            .metrics
            .finish(self.config.seed, log_length, balance, usage))
    }

    /// Generate and apply one operation, then check invariants.
    pub fn step(&mut self) -> Result<(), SimulatorError> {
        let step = self.metrics.steps();
        let Some(state) = self.state().cloned() else {
            self.metrics.record_violation(step, Violation::MissingState);
            self.metrics.record_skipped();
            return Ok(());
        };

        let Some(operation) =
            self.workload
                .next_operation(&mut self.accounts, &state, &mut self.rng)?
        else {
            self.metrics.record_skipped();
            return Ok(());
        };

        let (target, value, payload) = operation.to_transaction(self.registry, self.relay)?;
        let result = self.ledger.transact(operation.sender, target, value, &payload);
        debug!(
            step,
            op = operation.kind.name(),
            sender = %operation.sender,
            ok = result.is_ok(),
            "Applied operation"
        );

        match &result {
            Ok(receipt) => {
                self.metrics.record_success(operation.kind);
                self.record_executions(receipt);
            }
            Err(error) => self.metrics.record_failure(operation.kind, error),
        }

        if operation.kind == OperationKind::Outsider {
            if let Some(violation) = Self::check_outsider(&operation, &result) {
                self.metrics.record_violation(step, violation);
            }
        }

        for violation in self.checker.check(&self.ledger) {
            warn!(step, %violation, "Invariant violated");
            self.metrics.record_violation(step, violation);
        }
        Ok(())
    }

    fn record_executions(&mut self, receipt: &Receipt) {
        let Some(state) = self.ledger.state::<QuorumRegistry>(self.registry) else {
            return;
        };
        for event in receipt.events_from(self.registry) {
            if let Event::ExecuteTransaction { index, .. } = event {
                let value = state.transaction(*index).map(|r| r.value()).unwrap_or(0);
                self.metrics.record_execution(value);
            }
        }
    }

    /// Outsider calls must always fail with `NotOwner`.
    fn check_outsider(
        operation: &Operation,
        result: &Result<Receipt, DispatchError>,
    ) -> Option<Violation> {
        let outcome = match result {
            Err(DispatchError::Registry(RegistryError::NotOwner)) => return None,
            Err(error) => error.to_string(),
            Ok(_) => "committed".to_string(),
        };
        Some(Violation::OutsiderNotRejected {
            operation: operation.kind.name(),
            outcome,
        })
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn registry(&self) -> AccountId {
        self.registry
    }

    pub fn relay(&self) -> AccountId {
        self.relay
    }

    /// Current registry state.
    pub fn state(&self) -> Option<&QuorumRegistry> {
        self.ledger.state::<QuorumRegistry>(self.registry)
    }
}
