//! Scripted end-to-end scenarios.
//!
//! Each scenario builds a fresh ledger, runs a fixed call sequence, and
//! checks the outcome of every call against the expected registry behavior.

use crate::SimulatorError;
use multisig_batch::BatchExecutor;
use multisig_core::{DispatchError, RegistryError};
use multisig_engine::{Ledger, Receipt};
use multisig_registry::{QuorumRegistry, RegistryConfig, RegistryContract};
use multisig_types::{AccountId, Amount, BatchCall, RegistryCall, TxIndex};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

/// The scripted scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scenario {
    /// Submit, two confirmations, execute.
    A,
    /// Outsider confirm and double confirm are rejected.
    B,
    /// Submit and confirm in one relay call.
    C,
    /// An executed record rejects confirm and revoke.
    D,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::A, Scenario::B, Scenario::C, Scenario::D];

    pub fn name(self) -> &'static str {
        match self {
            Scenario::A => "a",
            Scenario::B => "b",
            Scenario::C => "c",
            Scenario::D => "d",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::A => "submit, confirm to quorum, execute once",
            Scenario::B => "outsider and repeated confirmations are rejected",
            Scenario::C => "relay submits and confirms in one atomic call",
            Scenario::D => "executed record is frozen",
        }
    }

    /// Run the scenario on a fresh ledger.
    pub fn run(self) -> Result<(), SimulatorError> {
        info!(scenario = self.name(), "Running scenario");
        match self {
            Scenario::A => scenario_a(),
            Scenario::B => scenario_b(),
            Scenario::C => scenario_c(),
            Scenario::D => scenario_d(),
        }?;
        info!(scenario = self.name(), "Scenario passed");
        Ok(())
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Scenario {
    type Err = SimulatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" => Ok(Scenario::A),
            "b" => Ok(Scenario::B),
            "c" => Ok(Scenario::C),
            "d" => Ok(Scenario::D),
            _ => Err(SimulatorError::UnknownScenario(s.to_string())),
        }
    }
}

/// A funded ledger with one registry and one relay.
struct Stage {
    scenario: &'static str,
    ledger: Ledger,
    registry: AccountId,
    relay: AccountId,
    owners: Vec<AccountId>,
}

impl Stage {
    /// `owners` funded accounts plus one funded outsider; the relay is
    /// enrolled when `relay_is_owner`.
    fn new(
        scenario: Scenario,
        owners: usize,
        threshold: usize,
        relay_is_owner: bool,
    ) -> Result<Self, SimulatorError> {
        let owners: Vec<_> = (0..owners).map(Self::account).collect();
        let mut ledger = Ledger::default();
        for account in owners.iter().copied().chain([Self::outsider()]) {
            ledger.fund(account, 1_000)?;
        }

        let deployer = AccountId::from_seed(b"scenario/deployer");
        let relay = ledger.deploy(deployer, Arc::new(BatchExecutor), None)?;
        let mut enrolled = owners.clone();
        if relay_is_owner {
            enrolled.push(relay);
        }
        let state = RegistryContract::initial_state(RegistryConfig::new(enrolled, threshold))?;
        let registry = ledger.deploy(deployer, Arc::new(RegistryContract), Some(state))?;

        Ok(Self {
            scenario: scenario.name(),
            ledger,
            registry,
            relay,
            owners,
        })
    }

    fn account(n: usize) -> AccountId {
        AccountId::from_seed(format!("scenario/owner/{}", n).as_bytes())
    }

    fn outsider() -> AccountId {
        AccountId::from_seed(b"scenario/outsider")
    }

    fn call(&mut self, sender: AccountId, call: RegistryCall) -> Result<Receipt, DispatchError> {
        let payload = call.encode()?;
        self.ledger.transact(sender, self.registry, 0, &payload)
    }

    /// A call that must commit.
    fn expect_ok(&mut self, sender: AccountId, call: RegistryCall) -> Result<Receipt, SimulatorError> {
        let name = call.name();
        self.call(sender, call)
            .map_err(|e| self.fail(format!("{} failed: {}", name, e)))
    }

    /// A call that must revert with `expected`.
    fn expect_err(
        &mut self,
        sender: AccountId,
        call: RegistryCall,
        expected: RegistryError,
    ) -> Result<(), SimulatorError> {
        let name = call.name();
        match self.call(sender, call) {
            Err(DispatchError::Registry(actual)) if actual == expected => Ok(()),
            Err(other) => Err(self.fail(format!("{} failed with {}, expected {}", name, other, expected))),
            Ok(_) => Err(self.fail(format!("{} committed, expected {}", name, expected))),
        }
    }

    fn ensure(&self, condition: bool, reason: impl Into<String>) -> Result<(), SimulatorError> {
        if condition {
            Ok(())
        } else {
            Err(self.fail(reason))
        }
    }

    fn fail(&self, reason: impl Into<String>) -> SimulatorError {
        SimulatorError::ScenarioFailed {
            scenario: self.scenario,
            reason: reason.into(),
        }
    }

    fn state(&self) -> Result<&QuorumRegistry, SimulatorError> {
        self.ledger
            .state::<QuorumRegistry>(self.registry)
            .ok_or_else(|| self.fail("registry state missing"))
    }

    fn deposit(&mut self, sender: AccountId, amount: Amount) -> Result<(), SimulatorError> {
        self.ledger
            .transact(sender, self.registry, amount, &[])
            .map(|_| ())
            .map_err(|e| self.fail(format!("deposit failed: {}", e)))
    }
}

fn submit(target: AccountId, value: Amount) -> RegistryCall {
    RegistryCall::Submit {
        target,
        value,
        payload: Vec::new(),
    }
}

fn scenario_a() -> Result<(), SimulatorError> {
    let mut stage = Stage::new(Scenario::A, 3, 2, false)?;
    let (owner0, owner1, owner2) = (stage.owners[0], stage.owners[1], stage.owners[2]);
    let index = TxIndex(0);
    stage.deposit(owner0, 10)?;
    let payee_before = stage.ledger.balance(owner1);

    stage.expect_ok(owner0, submit(owner1, 5))?;
    stage.ensure(stage.state()?.transaction_count() == 1, "record not appended")?;

    stage.expect_ok(owner0, RegistryCall::Confirm { index })?;
    let record = stage.state()?.transaction(index).map_err(|e| stage.fail(e.to_string()))?;
    stage.ensure(record.confirmation_count() == 1, "expected one confirmation")?;
    stage.ensure(!record.executed(), "executed too early")?;

    stage.expect_ok(owner1, RegistryCall::Confirm { index })?;
    stage.expect_ok(owner2, RegistryCall::Execute { index })?;

    let state = stage.state()?;
    let executed = state.transaction(index).map(|r| r.executed()).unwrap_or(false);
    stage.ensure(executed, "record not executed")?;
    stage.ensure(state.balance() == 5, "value not debited exactly once")?;
    stage.ensure(
        stage.ledger.balance(owner1) == payee_before + 5,
        "payee not credited",
    )
}

fn scenario_b() -> Result<(), SimulatorError> {
    let mut stage = Stage::new(Scenario::B, 3, 2, false)?;
    let owner0 = stage.owners[0];
    let owner3 = Stage::outsider();
    let index = TxIndex(0);

    stage.expect_ok(owner0, submit(owner0, 0))?;
    stage.expect_ok(owner0, RegistryCall::Confirm { index })?;
    stage.expect_err(owner3, RegistryCall::Confirm { index }, RegistryError::NotOwner)?;
    stage.expect_err(
        owner0,
        RegistryCall::Confirm { index },
        RegistryError::AlreadyConfirmedByCaller,
    )?;

    let count = stage
        .state()?
        .transaction(index)
        .map(|r| r.confirmation_count())
        .unwrap_or(0);
    stage.ensure(count == 1, "confirmation count changed")
}

fn scenario_c() -> Result<(), SimulatorError> {
    let mut stage = Stage::new(Scenario::C, 2, 2, true)?;
    let owner0 = stage.owners[0];
    stage.expect_ok(owner0, submit(owner0, 0))?;
    let index = TxIndex(stage.state()?.transaction_count());

    let call = BatchCall::SubmitAndConfirm {
        registry: stage.registry,
        target: stage.owners[1],
        value: 0,
        payload: vec![0x01],
    };
    let (relay, payload) = (stage.relay, call.encode()?);
    stage
        .ledger
        .transact(owner0, relay, 0, &payload)
        .map_err(|e| stage.fail(format!("relay call failed: {}", e)))?;

    let confirmations = stage
        .state()?
        .confirmations(index)
        .map_err(|e| stage.fail(e.to_string()))?;
    stage.ensure(
        confirmations == vec![relay],
        format!("expected confirmation by the relay only, got {:?}", confirmations),
    )
}

fn scenario_d() -> Result<(), SimulatorError> {
    let mut stage = Stage::new(Scenario::D, 3, 2, false)?;
    let (owner0, owner1, owner2) = (stage.owners[0], stage.owners[1], stage.owners[2]);
    let index = TxIndex(0);

    stage.expect_ok(owner0, submit(owner2, 0))?;
    stage.expect_ok(owner0, RegistryCall::Confirm { index })?;
    stage.expect_ok(owner1, RegistryCall::Confirm { index })?;
    stage.expect_ok(owner0, RegistryCall::Execute { index })?;

    stage.expect_err(owner0, RegistryCall::Revoke { index }, RegistryError::AlreadyExecuted)?;
    stage.expect_err(owner2, RegistryCall::Confirm { index }, RegistryError::AlreadyExecuted)?;
    stage.expect_err(owner1, RegistryCall::Execute { index }, RegistryError::AlreadyExecuted)
}
