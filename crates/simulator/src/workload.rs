//! Workload generation for simulations.
//!
//! Picks the next operation against the registry from weighted operation
//! kinds. Targets are biased toward calls that can succeed (confirming a
//! record the owner has not confirmed yet, executing a record at quorum) so
//! that long runs reach every state, while the remaining picks are uniform
//! and exercise the failure paths.

use crate::accounts::AccountPool;
use crate::{SimulatorConfig, SimulatorError};
use multisig_registry::QuorumRegistry;
use multisig_types::{AccountId, Amount, BatchCall, RegistryCall, TransactionRecord, TxIndex};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

/// Probability of picking from the preferred records when any exist.
const PREFERRED_PICK: f64 = 0.8;

/// The kinds of operation a workload generates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationKind {
    Deposit,
    Submit,
    Confirm,
    Revoke,
    Execute,
    RelaySubmitConfirm,
    RelayConfirmExecute,
    Outsider,
}

impl OperationKind {
    /// All kinds, in the order of [`WorkloadConfig::weights`](crate::WorkloadConfig::weights).
    pub const ALL: [OperationKind; 8] = [
        OperationKind::Deposit,
        OperationKind::Submit,
        OperationKind::Confirm,
        OperationKind::Revoke,
        OperationKind::Execute,
        OperationKind::RelaySubmitConfirm,
        OperationKind::RelayConfirmExecute,
        OperationKind::Outsider,
    ];

    pub fn name(self) -> &'static str {
        match self {
            OperationKind::Deposit => "deposit",
            OperationKind::Submit => "submit",
            OperationKind::Confirm => "confirm",
            OperationKind::Revoke => "revoke",
            OperationKind::Execute => "execute",
            OperationKind::RelaySubmitConfirm => "relay_submit_confirm",
            OperationKind::RelayConfirmExecute => "relay_confirm_execute",
            OperationKind::Outsider => "outsider",
        }
    }
}

/// What an operation sends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Plain value transfer to the registry.
    Deposit(Amount),
    /// Direct registry call.
    Registry(RegistryCall),
    /// Call through the relay.
    Relay(BatchCall),
}

/// One generated operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub sender: AccountId,
    pub action: Action,
}

impl Operation {
    /// The top-level transaction `(target, value, payload)` for this operation.
    pub fn to_transaction(
        &self,
        registry: AccountId,
        relay: AccountId,
    ) -> Result<(AccountId, Amount, Vec<u8>), SimulatorError> {
        Ok(match &self.action {
            Action::Deposit(amount) => (registry, *amount, Vec::new()),
            Action::Registry(call) => (registry, 0, call.encode()?),
            Action::Relay(call) => (relay, 0, call.encode()?),
        })
    }
}

/// Seeded operation generator.
pub struct Workload {
    kinds: WeightedIndex<u32>,
    registry: AccountId,
    relay: AccountId,
    deposit_amount: Amount,
    max_value: Amount,
}

impl Workload {
    /// Create a workload against `registry`, relaying through `relay`.
    pub fn new(
        config: &SimulatorConfig,
        registry: AccountId,
        relay: AccountId,
    ) -> Result<Self, SimulatorError> {
        let kinds = WeightedIndex::new(config.workload.weights())
            .map_err(|e| SimulatorError::InvalidWorkload(e.to_string()))?;
        Ok(Self {
            kinds,
            registry,
            relay,
            deposit_amount: Amount::from(config.deposit_amount),
            max_value: Amount::from(config.max_value),
        })
    }

    /// Generate the next operation given the registry's current state.
    ///
    /// Returns `None` when the pool has no account for the chosen kind.
    pub fn next_operation(
        &mut self,
        accounts: &mut AccountPool,
        state: &QuorumRegistry,
        rng: &mut impl Rng,
    ) -> Result<Option<Operation>, SimulatorError> {
        let kind = OperationKind::ALL[self.kinds.sample(rng)];

        // Record-level operations need a record.
        let kind = match kind {
            OperationKind::Confirm
            | OperationKind::Revoke
            | OperationKind::Execute
            | OperationKind::RelayConfirmExecute
                if state.transaction_count() == 0 =>
            {
                OperationKind::Submit
            }
            other => other,
        };

        let operation = match kind {
            OperationKind::Deposit => accounts.random_any(rng).map(|sender| Operation {
                kind,
                sender,
                action: Action::Deposit(rng.gen_range(1..=self.deposit_amount.max(1))),
            }),
            OperationKind::Submit => {
                let Some(sender) = accounts.random_owner(rng) else {
                    return Ok(None);
                };
                let (target, value, payload) = self.random_proposal(accounts, rng);
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Registry(RegistryCall::Submit {
                        target,
                        value,
                        payload,
                    }),
                })
            }
            OperationKind::Confirm => {
                let Some(sender) = accounts.random_owner(rng) else {
                    return Ok(None);
                };
                let index = pick_index(state, rng, |r| {
                    !r.executed() && !state.is_confirmed(r.index(), sender)
                });
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Registry(RegistryCall::Confirm { index }),
                })
            }
            OperationKind::Revoke => {
                let Some(sender) = accounts.random_owner(rng) else {
                    return Ok(None);
                };
                let index = pick_index(state, rng, |r| {
                    !r.executed() && state.is_confirmed(r.index(), sender)
                });
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Registry(RegistryCall::Revoke { index }),
                })
            }
            OperationKind::Execute => {
                let Some(sender) = accounts.random_owner(rng) else {
                    return Ok(None);
                };
                let threshold = state.threshold();
                let index = pick_index(state, rng, |r| {
                    !r.executed() && r.confirmation_count() >= threshold
                });
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Registry(RegistryCall::Execute { index }),
                })
            }
            OperationKind::RelaySubmitConfirm => {
                let Some(sender) = accounts.random_any(rng) else {
                    return Ok(None);
                };
                let (target, value, payload) = self.random_proposal(accounts, rng);
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Relay(BatchCall::SubmitAndConfirm {
                        registry: self.registry,
                        target,
                        value,
                        payload,
                    }),
                })
            }
            OperationKind::RelayConfirmExecute => {
                let Some(sender) = accounts.random_any(rng) else {
                    return Ok(None);
                };
                let relay = self.relay;
                let needed = state.threshold().saturating_sub(1);
                let index = pick_index(state, rng, |r| {
                    !r.executed()
                        && !state.is_confirmed(r.index(), relay)
                        && r.confirmation_count() >= needed
                });
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Relay(BatchCall::confirm_and_execute(self.registry, index)?),
                })
            }
            OperationKind::Outsider => {
                let Some(sender) = accounts.random_outsider(rng) else {
                    return Ok(None);
                };
                let index = TxIndex(rng.gen_range(0..=state.transaction_count()));
                let call = match rng.gen_range(0..4) {
                    0 => {
                        let (target, value, payload) = self.random_proposal(accounts, rng);
                        RegistryCall::Submit {
                            target,
                            value,
                            payload,
                        }
                    }
                    1 => RegistryCall::Confirm { index },
                    2 => RegistryCall::Revoke { index },
                    _ => RegistryCall::Execute { index },
                };
                Some(Operation {
                    kind,
                    sender,
                    action: Action::Registry(call),
                })
            }
        };
        Ok(operation)
    }

    /// A proposal paying a random account a random value.
    fn random_proposal(
        &self,
        accounts: &mut AccountPool,
        rng: &mut impl Rng,
    ) -> (AccountId, Amount, Vec<u8>) {
        let target = accounts.random_any(rng).unwrap_or(self.relay);
        let value = rng.gen_range(0..=self.max_value);
        let payload_len = rng.gen_range(0..4);
        let payload: Vec<u8> = (0..payload_len).map(|_| rng.gen()).collect();
        (target, value, payload)
    }
}

/// Pick a record index, favoring records that satisfy `preferred`.
///
/// The log must not be empty.
fn pick_index(
    state: &QuorumRegistry,
    rng: &mut impl Rng,
    preferred: impl Fn(&TransactionRecord) -> bool,
) -> TxIndex {
    let candidates: Vec<TxIndex> = state
        .transactions()
        .filter(|r| preferred(r))
        .map(|r| r.index())
        .collect();

    if !candidates.is_empty() && rng.gen_bool(PREFERRED_PICK) {
        candidates[rng.gen_range(0..candidates.len())]
    } else {
        TxIndex(rng.gen_range(0..state.transaction_count()))
    }
}
