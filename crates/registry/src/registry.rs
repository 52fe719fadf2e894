//! The registry state object.

use crate::RegistryConfig;
use indexmap::IndexSet;
use multisig_core::{ConfigError, DispatchError, Dispatcher, RegistryError};
use multisig_types::{AccountId, Amount, TransactionRecord, TxIndex};
use std::sync::Arc;
use tracing::{debug, info};

/// A dispatch released by a successful execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub index: TxIndex,
    pub target: AccountId,
    pub value: Amount,
    pub payload: Vec<u8>,
}

/// Quorum-gated log of proposed operations.
///
/// Owners append records, confirm and revoke them, and execute a record once
/// at least `threshold` distinct owners confirm it. Execution is one-shot.
///
/// Cloning is cheap: the owner set is shared and the log is a persistent
/// vector, so a clone is a snapshot that can be restored in O(1).
#[derive(Debug, Clone)]
pub struct QuorumRegistry {
    owners: Arc<IndexSet<AccountId>>,
    threshold: usize,
    balance: Amount,
    log: im::Vector<TransactionRecord>,
}

impl QuorumRegistry {
    /// Create an empty registry.
    pub fn new(config: RegistryConfig) -> Result<Self, ConfigError> {
        let owners = config.validate()?;
        info!(
            owners = owners.len(),
            threshold = config.threshold,
            "Created quorum registry"
        );
        Ok(Self {
            owners: Arc::new(owners),
            threshold: config.threshold,
            balance: 0,
            log: im::Vector::new(),
        })
    }

    /// Credit value received by the registry. Open to anyone.
    ///
    /// Returns the new balance. On the ledger the transfer into the registry
    /// account is checked first and fails with `BalanceOverflow`, so this
    /// credit never reaches the saturation bound there.
    pub fn deposit(&mut self, sender: AccountId, amount: Amount) -> Amount {
        self.balance = self.balance.saturating_add(amount);
        debug!(sender = %sender, amount, balance = self.balance, "Deposit");
        self.balance
    }

    /// Append a new pending record. The record starts with no confirmations.
    pub fn submit(
        &mut self,
        caller: AccountId,
        target: AccountId,
        value: Amount,
        payload: Vec<u8>,
    ) -> Result<TxIndex, RegistryError> {
        self.owner_slot(caller)?;

        let index = TxIndex(self.transaction_count());
        self.log.push_back(TransactionRecord::new(
            index,
            target,
            value,
            payload,
            self.owners.len(),
        ));

        info!(owner = %caller, %index, target = %target, value, "Transaction submitted");
        Ok(index)
    }

    /// Record the caller's confirmation of a pending record.
    pub fn confirm(&mut self, caller: AccountId, index: TxIndex) -> Result<(), RegistryError> {
        let slot = self.owner_slot(caller)?;
        let record = self.pending_mut(index)?;
        if !record.add_confirmation(slot) {
            return Err(RegistryError::AlreadyConfirmedByCaller);
        }

        info!(
            owner = %caller,
            %index,
            confirmations = record.confirmation_count(),
            "Transaction confirmed"
        );
        Ok(())
    }

    /// Withdraw the caller's confirmation of a pending record.
    pub fn revoke(&mut self, caller: AccountId, index: TxIndex) -> Result<(), RegistryError> {
        let slot = self.owner_slot(caller)?;
        let record = self.pending_mut(index)?;
        if !record.remove_confirmation(slot) {
            return Err(RegistryError::NotYetConfirmedByCaller);
        }

        info!(
            owner = %caller,
            %index,
            confirmations = record.confirmation_count(),
            "Confirmation revoked"
        );
        Ok(())
    }

    /// Validate an execute and apply its effects, without dispatching.
    ///
    /// On success the record is marked executed and its value debited; the
    /// caller must perform the returned dispatch and discard this state if
    /// the dispatch fails. On error nothing changes.
    pub fn begin_execute(
        &mut self,
        caller: AccountId,
        index: TxIndex,
    ) -> Result<Dispatch, RegistryError> {
        self.owner_slot(caller)?;

        let threshold = self.threshold;
        let available = self.balance;
        let record = self.pending_mut(index)?;

        let confirmations = record.confirmation_count();
        if confirmations < threshold {
            return Err(RegistryError::QuorumNotMet {
                confirmations,
                threshold,
            });
        }

        let value = record.value();
        if available < value {
            return Err(RegistryError::DispatchFailed(Box::new(
                DispatchError::InsufficientBalance {
                    available,
                    required: value,
                },
            )));
        }

        record.mark_executed();
        let dispatch = Dispatch {
            index,
            target: record.target(),
            value,
            payload: record.payload().to_vec(),
        };
        self.balance = available - value;

        info!(owner = %caller, %index, target = %dispatch.target, value, "Transaction executing");
        Ok(dispatch)
    }

    /// Execute a record that reached quorum.
    ///
    /// The record is marked executed and the value debited before the
    /// dispatch runs, so a dispatch that calls back into this registry sees
    /// the record as executed. If the dispatch fails, the registry is
    /// restored to its state before the call.
    pub fn execute<D>(
        &mut self,
        caller: AccountId,
        index: TxIndex,
        dispatcher: &mut D,
    ) -> Result<(), RegistryError>
    where
        D: Dispatcher + ?Sized,
    {
        let snapshot = self.clone();
        let dispatch = self.begin_execute(caller, index)?;

        if let Err(error) = dispatcher.invoke(dispatch.target, dispatch.value, &dispatch.payload) {
            debug!(%index, error = %error, "Dispatch failed, restoring registry");
            *self = snapshot;
            return Err(RegistryError::DispatchFailed(Box::new(error)));
        }
        Ok(())
    }

    /// Whether `owner` currently confirms record `index`.
    ///
    /// False for unknown records and for accounts outside the owner set.
    pub fn is_confirmed(&self, index: TxIndex, owner: AccountId) -> bool {
        match (self.owners.get_index_of(&owner), self.log.get(index.as_usize())) {
            (Some(slot), Some(record)) => record.is_confirmed_by(slot),
            _ => false,
        }
    }

    pub fn transaction(&self, index: TxIndex) -> Result<&TransactionRecord, RegistryError> {
        self.log
            .get(index.as_usize())
            .ok_or(RegistryError::NoSuchTransaction { index })
    }

    /// All records in index order.
    pub fn transactions(&self) -> impl Iterator<Item = &TransactionRecord> {
        self.log.iter()
    }

    pub fn transaction_count(&self) -> u64 {
        self.log.len() as u64
    }

    /// Owners in enrollment order.
    pub fn owners(&self) -> impl ExactSizeIterator<Item = AccountId> + '_ {
        self.owners.iter().copied()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    pub fn is_owner(&self, account: AccountId) -> bool {
        self.owners.contains(&account)
    }

    /// Owners currently confirming record `index`, in enrollment order.
    pub fn confirmations(&self, index: TxIndex) -> Result<Vec<AccountId>, RegistryError> {
        let record = self.transaction(index)?;
        Ok(record
            .confirmations()
            .set_slots()
            .filter_map(|slot| self.owners.get_index(slot).copied())
            .collect())
    }

    fn owner_slot(&self, caller: AccountId) -> Result<usize, RegistryError> {
        self.owners
            .get_index_of(&caller)
            .ok_or(RegistryError::NotOwner)
    }

    /// The record at `index`, if it exists and has not executed.
    fn pending_mut(&mut self, index: TxIndex) -> Result<&mut TransactionRecord, RegistryError> {
        let record = self
            .log
            .get_mut(index.as_usize())
            .ok_or(RegistryError::NoSuchTransaction { index })?;
        if record.executed() {
            return Err(RegistryError::AlreadyExecuted);
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use multisig_types::test_utils::{test_account, test_accounts};
    use tracing_test::traced_test;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<(AccountId, Amount, Vec<u8>)>,
        fail: bool,
    }

    impl Dispatcher for Recorder {
        fn invoke(
            &mut self,
            target: AccountId,
            value: Amount,
            payload: &[u8],
        ) -> Result<(), DispatchError> {
            if self.fail {
                return Err(DispatchError::Reverted("target rejected call".into()));
            }
            self.calls.push((target, value, payload.to_vec()));
            Ok(())
        }
    }

    /// Three owners, threshold two.
    fn setup() -> (QuorumRegistry, Vec<AccountId>) {
        let owners = test_accounts(3);
        let registry = QuorumRegistry::new(RegistryConfig::new(owners.clone(), 2)).unwrap();
        (registry, owners)
    }

    fn outsider() -> AccountId {
        test_account(99)
    }

    #[traced_test]
    #[test]
    fn test_submit_appends_unconfirmed_record() {
        let (mut registry, owners) = setup();
        let target = test_account(50);

        let first = registry.submit(owners[0], target, 7, vec![1, 2]).unwrap();
        let second = registry.submit(owners[1], target, 0, vec![]).unwrap();

        assert_eq!(first, TxIndex(0));
        assert_eq!(second, TxIndex(1));
        assert_eq!(registry.transaction_count(), 2);

        let record = registry.transaction(first).unwrap();
        assert_eq!(record.target(), target);
        assert_eq!(record.value(), 7);
        assert_eq!(record.payload(), &[1, 2]);
        assert!(!record.executed());
        assert_eq!(record.confirmation_count(), 0);
        assert!(logs_contain("Transaction submitted"));
    }

    #[test]
    fn test_confirm_and_revoke_are_inverses() {
        let (mut registry, owners) = setup();
        let index = registry.submit(owners[0], test_account(50), 0, vec![]).unwrap();

        registry.confirm(owners[1], index).unwrap();
        assert!(registry.is_confirmed(index, owners[1]));
        assert_eq!(registry.confirmations(index).unwrap(), vec![owners[1]]);

        registry.revoke(owners[1], index).unwrap();
        assert!(!registry.is_confirmed(index, owners[1]));
        assert_eq!(registry.transaction(index).unwrap().confirmation_count(), 0);
    }

    #[test]
    fn test_double_confirm_and_stray_revoke() {
        let (mut registry, owners) = setup();
        let index = registry.submit(owners[0], test_account(50), 0, vec![]).unwrap();

        registry.confirm(owners[0], index).unwrap();
        assert_eq!(
            registry.confirm(owners[0], index),
            Err(RegistryError::AlreadyConfirmedByCaller)
        );
        assert_eq!(
            registry.revoke(owners[2], index),
            Err(RegistryError::NotYetConfirmedByCaller)
        );
        assert_eq!(registry.transaction(index).unwrap().confirmation_count(), 1);
    }

    #[test]
    fn test_unknown_index() {
        let (mut registry, owners) = setup();
        let missing = TxIndex(0);
        let expected = Err(RegistryError::NoSuchTransaction { index: missing });

        assert_eq!(registry.confirm(owners[0], missing), expected);
        assert_eq!(registry.revoke(owners[0], missing), expected);
        assert_eq!(
            registry.execute(owners[0], missing, &mut Recorder::default()),
            expected
        );
        assert!(registry.transaction(missing).is_err());
        assert!(!registry.is_confirmed(missing, owners[0]));
    }

    #[test]
    fn test_owner_gate_precedes_other_checks() {
        let (mut registry, _) = setup();
        let stranger = outsider();

        // Index 5 does not exist; the owner check still wins.
        assert_eq!(
            registry.submit(stranger, test_account(50), 0, vec![]),
            Err(RegistryError::NotOwner)
        );
        assert_eq!(registry.confirm(stranger, TxIndex(5)), Err(RegistryError::NotOwner));
        assert_eq!(registry.revoke(stranger, TxIndex(5)), Err(RegistryError::NotOwner));
        assert_eq!(
            registry.execute(stranger, TxIndex(5), &mut Recorder::default()),
            Err(RegistryError::NotOwner)
        );
        assert_eq!(registry.transaction_count(), 0);
    }

    #[traced_test]
    #[test]
    fn test_execute_requires_quorum() {
        let (mut registry, owners) = setup();
        registry.deposit(outsider(), 100);
        let target = test_account(50);
        let index = registry.submit(owners[0], target, 40, vec![9]).unwrap();
        registry.confirm(owners[0], index).unwrap();

        let mut dispatcher = Recorder::default();
        assert_eq!(
            registry.execute(owners[0], index, &mut dispatcher),
            Err(RegistryError::QuorumNotMet {
                confirmations: 1,
                threshold: 2
            })
        );
        assert!(dispatcher.calls.is_empty());

        registry.confirm(owners[2], index).unwrap();
        registry.execute(owners[1], index, &mut dispatcher).unwrap();

        assert_eq!(dispatcher.calls, vec![(target, 40, vec![9])]);
        assert!(registry.transaction(index).unwrap().executed());
        assert_eq!(registry.balance(), 60);
    }

    #[test]
    fn test_executed_record_is_frozen() {
        let (mut registry, owners) = setup();
        let index = registry.submit(owners[0], test_account(50), 0, vec![]).unwrap();
        registry.confirm(owners[0], index).unwrap();
        registry.confirm(owners[1], index).unwrap();
        registry.execute(owners[0], index, &mut Recorder::default()).unwrap();

        let mut dispatcher = Recorder::default();
        assert_eq!(
            registry.execute(owners[0], index, &mut dispatcher),
            Err(RegistryError::AlreadyExecuted)
        );
        assert_eq!(
            registry.confirm(owners[2], index),
            Err(RegistryError::AlreadyExecuted)
        );
        assert_eq!(
            registry.revoke(owners[0], index),
            Err(RegistryError::AlreadyExecuted)
        );
        assert!(dispatcher.calls.is_empty());
        assert!(registry.is_confirmed(index, owners[0]));
    }

    #[traced_test]
    #[test]
    fn test_failed_dispatch_restores_registry() {
        let (mut registry, owners) = setup();
        registry.deposit(outsider(), 10);
        let index = registry.submit(owners[0], test_account(50), 10, vec![]).unwrap();
        registry.confirm(owners[0], index).unwrap();
        registry.confirm(owners[1], index).unwrap();

        let mut failing = Recorder {
            fail: true,
            ..Default::default()
        };
        let err = registry.execute(owners[0], index, &mut failing).unwrap_err();

        assert_eq!(
            err,
            RegistryError::DispatchFailed(Box::new(DispatchError::Reverted(
                "target rejected call".into()
            )))
        );
        assert_eq!(err.to_string(), "tx failed: reverted: target rejected call");
        assert!(!registry.transaction(index).unwrap().executed());
        assert_eq!(registry.balance(), 10);

        // Still executable once the target accepts.
        registry.execute(owners[0], index, &mut Recorder::default()).unwrap();
        assert_eq!(registry.balance(), 0);
    }

    #[test]
    fn test_insufficient_balance_changes_nothing() {
        let (mut registry, owners) = setup();
        registry.deposit(outsider(), 5);
        let index = registry.submit(owners[0], test_account(50), 6, vec![]).unwrap();
        registry.confirm(owners[0], index).unwrap();
        registry.confirm(owners[1], index).unwrap();

        let err = registry.begin_execute(owners[0], index).unwrap_err();

        assert_eq!(
            err,
            RegistryError::DispatchFailed(Box::new(DispatchError::InsufficientBalance {
                available: 5,
                required: 6
            }))
        );
        assert!(!registry.transaction(index).unwrap().executed());
        assert_eq!(registry.balance(), 5);
    }

    #[test]
    fn test_revoke_below_quorum_blocks_execute() {
        let (mut registry, owners) = setup();
        let index = registry.submit(owners[0], test_account(50), 0, vec![]).unwrap();
        registry.confirm(owners[0], index).unwrap();
        registry.confirm(owners[1], index).unwrap();
        registry.revoke(owners[1], index).unwrap();

        assert!(matches!(
            registry.execute(owners[0], index, &mut Recorder::default()),
            Err(RegistryError::QuorumNotMet { .. })
        ));
    }

    #[test]
    fn test_deposit_saturates() {
        let (mut registry, _) = setup();
        registry.deposit(outsider(), Amount::MAX);
        assert_eq!(registry.deposit(outsider(), 1), Amount::MAX);
    }

    #[test]
    fn test_accessors() {
        let (registry, owners) = setup();
        assert_eq!(registry.owners().collect::<Vec<_>>(), owners);
        assert_eq!(registry.threshold(), 2);
        assert!(registry.is_owner(owners[2]));
        assert!(!registry.is_owner(outsider()));
    }
}
