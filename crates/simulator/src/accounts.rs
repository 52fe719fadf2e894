//! Account management for simulations.
//!
//! Provides an `AccountPool` of deterministic accounts split into registry
//! owners and outsiders. Accounts are funded at genesis.

use multisig_types::{AccountId, Amount};
use std::collections::HashMap;
use tracing::info;

/// Seed offset for outsider accounts, far away from owner seeds.
const OUTSIDER_SEED_BASE: u64 = 1 << 32;

/// Which part of the pool an account belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Owner,
    Outsider,
}

/// Pool of funded accounts.
pub struct AccountPool {
    owners: Vec<AccountId>,
    outsiders: Vec<AccountId>,

    /// Usage tracking: total selections per account index per role.
    usage_counts: HashMap<Role, Vec<u64>>,
}

impl AccountPool {
    /// Derive `owners` owner accounts and `outsiders` outsider accounts.
    ///
    /// The same counts always yield the same accounts.
    pub fn generate(owners: usize, outsiders: usize) -> Self {
        info!(owners, outsiders, "Generating account pool");

        let owners: Vec<_> = (0..owners as u64).map(Self::derive).collect();
        let outsiders: Vec<_> = (0..outsiders as u64)
            .map(|n| Self::derive(OUTSIDER_SEED_BASE + n))
            .collect();

        let mut usage_counts = HashMap::new();
        usage_counts.insert(Role::Owner, vec![0; owners.len()]);
        usage_counts.insert(Role::Outsider, vec![0; outsiders.len()]);

        Self {
            owners,
            outsiders,
            usage_counts,
        }
    }

    fn derive(seed: u64) -> AccountId {
        let mut bytes = b"multisig-sim/account/".to_vec();
        bytes.extend_from_slice(&seed.to_le_bytes());
        AccountId::from_seed(&bytes)
    }

    /// Genesis balances for every account in the pool.
    pub fn genesis_balances(&self, balance: Amount) -> Vec<(AccountId, Amount)> {
        self.all().map(|account| (account, balance)).collect()
    }

    /// Pick a random owner.
    pub fn random_owner(&mut self, rng: &mut impl rand::Rng) -> Option<AccountId> {
        self.random_with_role(Role::Owner, rng)
    }

    /// Pick a random outsider.
    pub fn random_outsider(&mut self, rng: &mut impl rand::Rng) -> Option<AccountId> {
        self.random_with_role(Role::Outsider, rng)
    }

    /// Pick any account, owner or outsider.
    pub fn random_any(&mut self, rng: &mut impl rand::Rng) -> Option<AccountId> {
        let total = self.total_accounts();
        if total == 0 {
            return None;
        }
        let idx = rng.gen_range(0..total);
        if idx < self.owners.len() {
            self.record_usage(Role::Owner, idx);
            Some(self.owners[idx])
        } else {
            let idx = idx - self.owners.len();
            self.record_usage(Role::Outsider, idx);
            Some(self.outsiders[idx])
        }
    }

    fn random_with_role(&mut self, role: Role, rng: &mut impl rand::Rng) -> Option<AccountId> {
        let accounts = match role {
            Role::Owner => &self.owners,
            Role::Outsider => &self.outsiders,
        };
        if accounts.is_empty() {
            return None;
        }
        let idx = rng.gen_range(0..accounts.len());
        let account = accounts[idx];
        self.record_usage(role, idx);
        Some(account)
    }

    /// Record that an account was selected.
    fn record_usage(&mut self, role: Role, idx: usize) {
        if let Some(counts) = self.usage_counts.get_mut(&role) {
            if let Some(counter) = counts.get_mut(idx) {
                *counter += 1;
            }
        }
    }

    pub fn owners(&self) -> &[AccountId] {
        &self.owners
    }

    pub fn outsiders(&self) -> &[AccountId] {
        &self.outsiders
    }

    /// Owners first, then outsiders.
    pub fn all(&self) -> impl Iterator<Item = AccountId> + '_ {
        self.owners.iter().chain(&self.outsiders).copied()
    }

    pub fn total_accounts(&self) -> usize {
        self.owners.len() + self.outsiders.len()
    }

    /// Get usage statistics for analysis.
    pub fn usage_stats(&self) -> AccountUsageStats {
        let mut total_selections = 0u64;
        let mut max_selections = 0u64;
        let mut min_selections = u64::MAX;
        let mut account_count = 0usize;

        for counts in self.usage_counts.values() {
            for &count in counts {
                total_selections += count;
                max_selections = max_selections.max(count);
                if count > 0 {
                    min_selections = min_selections.min(count);
                }
                account_count += 1;
            }
        }

        if min_selections == u64::MAX {
            min_selections = 0;
        }

        let avg_selections = if account_count > 0 {
            total_selections as f64 / account_count as f64
        } else {
            0.0
        };

        AccountUsageStats {
            total_selections,
            avg_selections,
            max_selections,
            min_selections,
            account_count,
        }
    }
}

/// Statistics about account usage distribution.
#[derive(Clone, Debug, PartialEq)]
pub struct AccountUsageStats {
    /// Total number of account selections.
    pub total_selections: u64,
    /// Average selections per account.
    pub avg_selections: f64,
    /// Maximum selections for any account.
    pub max_selections: u64,
    /// Minimum selections for any account (excluding unused).
    pub min_selections: u64,
    /// Total number of accounts.
    pub account_count: usize,
}

impl AccountUsageStats {
    /// Calculate the skew ratio (max / avg). Higher = more uneven.
    pub fn skew_ratio(&self) -> f64 {
        if self.avg_selections > 0.0 {
            self.max_selections as f64 / self.avg_selections
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    #[test]
    fn test_account_generation() {
        let pool = AccountPool::generate(4, 3);
        assert_eq!(pool.total_accounts(), 7);

        let unique: HashSet<_> = pool.all().collect();
        assert_eq!(unique.len(), 7);
        assert!(pool.owners().iter().all(|o| !pool.outsiders().contains(o)));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = AccountPool::generate(3, 2);
        let b = AccountPool::generate(3, 2);
        assert_eq!(a.all().collect::<Vec<_>>(), b.all().collect::<Vec<_>>());
    }

    #[test]
    fn test_selection_respects_roles() {
        let mut pool = AccountPool::generate(3, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..50 {
            let owner = pool.random_owner(&mut rng).unwrap();
            assert!(pool.owners().contains(&owner));
            let outsider = pool.random_outsider(&mut rng).unwrap();
            assert!(pool.outsiders().contains(&outsider));
        }

        let stats = pool.usage_stats();
        assert_eq!(stats.total_selections, 100);
        assert_eq!(stats.account_count, 5);
        assert!(stats.skew_ratio() >= 1.0);
    }

    #[test]
    fn test_empty_role_yields_none() {
        let mut pool = AccountPool::generate(2, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(pool.random_outsider(&mut rng), None);
    }
}
