//! Deterministic fixtures for tests.

use crate::AccountId;

/// Deterministic account for test slot `n`.
pub fn test_account(n: u64) -> AccountId {
    AccountId::from_seed(&n.to_le_bytes())
}

/// `count` distinct deterministic accounts, slots `0..count`.
pub fn test_accounts(count: usize) -> Vec<AccountId> {
    (0..count as u64).map(test_account).collect()
}
