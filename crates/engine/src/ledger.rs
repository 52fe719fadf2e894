//! The ledger: balances, deployed code, contract state and the event log.

use crate::frame::CallFrame;
use crate::{LedgerConfig, LedgerError, Receipt};
use multisig_core::{CallContext, Contract, ContractState, DispatchError, EmittedEvent};
use multisig_types::{AccountId, Amount};
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Everything a transaction can change.
///
/// Backed by persistent collections, so cloning is O(1). Every call frame
/// clones the world on entry and restores the clone if the frame fails.
#[derive(Clone, Default)]
pub(crate) struct WorldState {
    pub(crate) balances: im::HashMap<AccountId, Amount>,
    pub(crate) storage: im::HashMap<AccountId, ContractState>,
    pub(crate) events: im::Vector<EmittedEvent>,
}

/// Serial, all-or-nothing execution substrate.
///
/// All mutation goes through `&mut self`, so transactions are totally
/// ordered. A transaction either commits every effect of every frame it
/// opened, or none.
///
/// # Example
///
/// ```ignore
/// let mut ledger = Ledger::new(LedgerConfig::default());
/// ledger.fund(alice, 100)?;
/// let registry = ledger.deploy(alice, Arc::new(RegistryContract), Some(state))?;
///
/// // Plain value transfer: an empty payload.
/// let receipt = ledger.transact(alice, registry, 25, &[])?;
/// ```
pub struct Ledger {
    config: LedgerConfig,
    pub(crate) world: WorldState,
    contracts: HashMap<AccountId, Arc<dyn Contract>>,
    deploy_nonces: HashMap<AccountId, u64>,
    /// Number of committed transactions.
    pub(crate) sequence: u64,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            config,
            world: WorldState::default(),
            contracts: HashMap::new(),
            deploy_nonces: HashMap::new(),
            sequence: 0,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Credit an account outside of any transaction (genesis funding).
    ///
    /// Contracts are not notified; use [`Ledger::transact`] with an empty
    /// payload to send value to a contract.
    pub fn fund(&mut self, account: AccountId, amount: Amount) -> Result<Amount, LedgerError> {
        let balance = self
            .balance(account)
            .checked_add(amount)
            .ok_or(LedgerError::BalanceOverflow(account))?;
        self.world.balances.insert(account, balance);
        Ok(balance)
    }

    /// Deploy `contract` with optional initial state.
    ///
    /// The address is derived from the deployer and a per-deployer nonce.
    pub fn deploy(
        &mut self,
        deployer: AccountId,
        contract: Arc<dyn Contract>,
        state: Option<ContractState>,
    ) -> Result<AccountId, LedgerError> {
        let nonce = self.deploy_nonces.entry(deployer).or_insert(0);
        let address = AccountId::derive_contract(&deployer, *nonce);
        *nonce += 1;

        if self.contracts.contains_key(&address) || self.world.storage.contains_key(&address) {
            return Err(LedgerError::AddressInUse(address));
        }

        info!(
            contract = contract.name(),
            deployer = %deployer,
            address = %address,
            "Deployed contract"
        );

        if let Some(state) = state {
            self.world.storage.insert(address, state);
        }
        self.contracts.insert(address, contract);
        Ok(address)
    }

    /// Execute one top-level transaction from `sender`.
    ///
    /// On error the ledger is exactly as it was before the call.
    pub fn transact(
        &mut self,
        sender: AccountId,
        target: AccountId,
        value: Amount,
        payload: &[u8],
    ) -> Result<Receipt, DispatchError> {
        let sequence = self.sequence;
        let first_event = self.world.events.len();

        match self.dispatch(CallContext::top_level(sender, target, value), payload) {
            Ok(()) => {
                self.sequence += 1;
                let events: Vec<EmittedEvent> = self
                    .world
                    .events
                    .iter()
                    .skip(first_event)
                    .cloned()
                    .collect();
                debug!(
                    sequence,
                    sender = %sender,
                    target = %target,
                    events = events.len(),
                    "Transaction committed"
                );
                Ok(Receipt {
                    sequence,
                    sender,
                    target,
                    events,
                })
            }
            Err(error) => {
                warn!(
                    sequence,
                    sender = %sender,
                    target = %target,
                    error = %error,
                    "Transaction reverted"
                );
                Err(error)
            }
        }
    }

    /// Read-only query against a contract.
    pub fn query(&self, target: AccountId, request: &[u8]) -> Result<Vec<u8>, DispatchError> {
        let contract = self
            .contracts
            .get(&target)
            .ok_or(DispatchError::UnknownContract(target))?;
        contract.query(self.world.storage.get(&target), request)
    }

    pub fn balance(&self, account: AccountId) -> Amount {
        self.world.balances.get(&account).copied().unwrap_or(0)
    }

    /// Typed view of a contract's stored state.
    pub fn state<T: Any + Send + Sync>(&self, account: AccountId) -> Option<&T> {
        self.world
            .storage
            .get(&account)
            .and_then(|state| (**state).downcast_ref::<T>())
    }

    /// Whether code is deployed at `account`.
    pub fn has_code(&self, account: AccountId) -> bool {
        self.contracts.contains_key(&account)
    }

    /// All events of committed transactions, in order.
    pub fn events(&self) -> impl Iterator<Item = &EmittedEvent> {
        self.world.events.iter()
    }

    /// Number of committed transactions.
    pub fn transaction_count(&self) -> u64 {
        self.sequence
    }

    /// Sum of all balances. Constant across transactions.
    pub fn total_supply(&self) -> Amount {
        self.world
            .balances
            .values()
            .fold(0, |acc: Amount, b| acc.saturating_add(*b))
    }

    /// Run one call frame, restoring the world if it fails.
    pub(crate) fn dispatch(
        &mut self,
        ctx: CallContext,
        payload: &[u8],
    ) -> Result<(), DispatchError> {
        if ctx.depth > self.config.max_call_depth {
            return Err(DispatchError::CallDepthExceeded {
                max: self.config.max_call_depth,
            });
        }

        let snapshot = self.world.clone();
        let result = self.run_frame(ctx, payload);
        if let Err(error) = &result {
            debug!(
                caller = %ctx.caller,
                target = %ctx.address,
                depth = ctx.depth,
                error = %error,
                "Call frame reverted"
            );
            self.world = snapshot;
        }
        result
    }

    fn run_frame(&mut self, ctx: CallContext, payload: &[u8]) -> Result<(), DispatchError> {
        self.transfer(ctx.caller, ctx.address, ctx.value)?;

        // Accounts without code only receive value.
        let Some(contract) = self.contracts.get(&ctx.address).cloned() else {
            return Ok(());
        };

        debug!(
            contract = contract.name(),
            caller = %ctx.caller,
            target = %ctx.address,
            value = ctx.value,
            depth = ctx.depth,
            "Executing call"
        );

        let mut frame = CallFrame::new(self, ctx);
        contract.call(&mut frame, payload)
    }

    fn transfer(
        &mut self,
        from: AccountId,
        to: AccountId,
        value: Amount,
    ) -> Result<(), DispatchError> {
        if value == 0 {
            return Ok(());
        }

        let available = self.balance(from);
        if available < value {
            return Err(DispatchError::InsufficientBalance {
                available,
                required: value,
            });
        }
        if from == to {
            return Ok(());
        }

        let credited = self
            .balance(to)
            .checked_add(value)
            .ok_or(DispatchError::BalanceOverflow { account: to })?;
        self.world.balances.insert(from, available - value);
        self.world.balances.insert(to, credited);
        Ok(())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisig_core::{Event, Host};
    use multisig_types::test_utils::test_account;
    use tracing_test::traced_test;

    /// Counts calls; a payload of `[0xff]` counts and then fails.
    struct Counter;

    impl Contract for Counter {
        fn name(&self) -> &'static str {
            "counter"
        }

        fn call(&self, host: &mut dyn Host, payload: &[u8]) -> Result<(), DispatchError> {
            let count = host
                .state()
                .and_then(|s| s.downcast::<u64>().ok())
                .map(|c| *c)
                .unwrap_or(0);
            host.set_state(Arc::new(count + 1));
            let ctx = *host.context();
            let balance = host.balance();
            host.emit(Event::Deposit {
                sender: ctx.caller,
                amount: ctx.value,
                balance,
            });
            if payload == [0xff] {
                return Err(DispatchError::Reverted("told to fail".into()));
            }
            Ok(())
        }
    }

    /// Forwards `payload[20..]` to the account in `payload[..20]`.
    /// If the first byte after the address is `0x01`, inner failures are swallowed.
    struct Forwarder;

    impl Contract for Forwarder {
        fn name(&self) -> &'static str {
            "forwarder"
        }

        fn call(&self, host: &mut dyn Host, payload: &[u8]) -> Result<(), DispatchError> {
            let mut target = [0u8; 20];
            target.copy_from_slice(&payload[..20]);
            let swallow = payload[20] == 0x01;
            let result = host.invoke(AccountId(target), 0, &payload[21..]);
            host.set_state(Arc::new(result.is_ok()));
            if swallow {
                Ok(())
            } else {
                result
            }
        }
    }

    /// Calls itself until the ledger stops it.
    struct Recurser;

    impl Contract for Recurser {
        fn name(&self) -> &'static str {
            "recurser"
        }

        fn call(&self, host: &mut dyn Host, payload: &[u8]) -> Result<(), DispatchError> {
            let me = host.context().address;
            host.invoke(me, 0, payload)
        }
    }

    fn forward_payload(target: AccountId, swallow: bool, inner: &[u8]) -> Vec<u8> {
        let mut payload = target.0.to_vec();
        payload.push(swallow as u8);
        payload.extend_from_slice(inner);
        payload
    }

    #[traced_test]
    #[test]
    fn test_value_transfer_between_plain_accounts() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        let bob = test_account(1);
        ledger.fund(alice, 100).unwrap();

        let receipt = ledger.transact(alice, bob, 40, &[]).unwrap();

        assert_eq!(receipt.sequence, 0);
        assert!(receipt.events.is_empty());
        assert_eq!(ledger.balance(alice), 60);
        assert_eq!(ledger.balance(bob), 40);
        assert_eq!(ledger.total_supply(), 100);
        assert_eq!(ledger.transaction_count(), 1);
    }

    #[traced_test]
    #[test]
    fn test_insufficient_balance_reverts() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        ledger.fund(alice, 10).unwrap();

        let err = ledger.transact(alice, test_account(1), 11, &[]).unwrap_err();

        assert_eq!(
            err,
            DispatchError::InsufficientBalance {
                available: 10,
                required: 11
            }
        );
        assert_eq!(ledger.balance(alice), 10);
        assert_eq!(ledger.transaction_count(), 0);
        assert!(logs_contain("Transaction reverted"));
    }

    #[traced_test]
    #[test]
    fn test_failed_call_rolls_back_state_value_and_events() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        ledger.fund(alice, 50).unwrap();
        let counter = ledger.deploy(alice, Arc::new(Counter), None).unwrap();

        let receipt = ledger.transact(alice, counter, 5, &[]).unwrap();
        assert_eq!(receipt.events.len(), 1);
        assert_eq!(ledger.state::<u64>(counter), Some(&1));

        ledger.transact(alice, counter, 5, &[0xff]).unwrap_err();

        assert_eq!(ledger.state::<u64>(counter), Some(&1));
        assert_eq!(ledger.balance(counter), 5);
        assert_eq!(ledger.balance(alice), 45);
        assert_eq!(ledger.events().count(), 1);
    }

    #[traced_test]
    #[test]
    fn test_nested_caller_is_the_dispatching_contract() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        let forwarder = ledger.deploy(alice, Arc::new(Forwarder), None).unwrap();
        let counter = ledger.deploy(alice, Arc::new(Counter), None).unwrap();

        let receipt = ledger
            .transact(alice, forwarder, 0, &forward_payload(counter, false, &[]))
            .unwrap();

        let events: Vec<_> = receipt.events_from(counter).collect();
        assert_eq!(
            events,
            vec![&Event::Deposit {
                sender: forwarder,
                amount: 0,
                balance: 0
            }]
        );
    }

    #[traced_test]
    #[test]
    fn test_swallowed_inner_failure_only_reverts_inner_frame() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        let forwarder = ledger.deploy(alice, Arc::new(Forwarder), None).unwrap();
        let counter = ledger.deploy(alice, Arc::new(Counter), None).unwrap();

        ledger
            .transact(alice, forwarder, 0, &forward_payload(counter, true, &[0xff]))
            .unwrap();

        // Outer frame committed, inner frame left nothing behind.
        assert_eq!(ledger.state::<bool>(forwarder), Some(&false));
        assert_eq!(ledger.state::<u64>(counter), None);
        assert_eq!(ledger.events().count(), 0);
    }

    #[traced_test]
    #[test]
    fn test_unbounded_recursion_hits_depth_limit() {
        let mut ledger = Ledger::new(LedgerConfig::default().with_max_call_depth(8));
        let alice = test_account(0);
        let recurser = ledger.deploy(alice, Arc::new(Recurser), None).unwrap();

        let err = ledger.transact(alice, recurser, 0, &[]).unwrap_err();

        assert_eq!(err, DispatchError::CallDepthExceeded { max: 8 });
    }

    #[test]
    fn test_deploy_addresses_are_unique_per_nonce() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        let a = ledger.deploy(alice, Arc::new(Counter), None).unwrap();
        let b = ledger.deploy(alice, Arc::new(Counter), None).unwrap();
        assert_ne!(a, b);
        assert!(ledger.has_code(a));
        assert!(!ledger.has_code(alice));
    }

    #[test]
    fn test_query_without_code_fails() {
        let ledger = Ledger::default();
        let nobody = test_account(9);
        assert_eq!(
            ledger.query(nobody, &[]),
            Err(DispatchError::UnknownContract(nobody))
        );
    }

    #[test]
    fn test_fund_overflow() {
        let mut ledger = Ledger::default();
        let alice = test_account(0);
        ledger.fund(alice, Amount::MAX).unwrap();
        assert_eq!(
            ledger.fund(alice, 1),
            Err(LedgerError::BalanceOverflow(alice))
        );
    }
}
