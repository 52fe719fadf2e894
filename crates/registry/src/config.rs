//! Registry construction parameters.

use indexmap::IndexSet;
use multisig_core::ConfigError;
use multisig_types::AccountId;

/// Owner set and quorum threshold of a registry.
///
/// Both are fixed for the registry's lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Owners in enrollment order. Order defines confirmation slots.
    pub owners: Vec<AccountId>,

    /// Distinct owner confirmations required to execute.
    pub threshold: usize,
}

impl RegistryConfig {
    /// Create a new registry configuration.
    pub fn new(owners: impl IntoIterator<Item = AccountId>, threshold: usize) -> Self {
        Self {
            owners: owners.into_iter().collect(),
            threshold,
        }
    }

    /// Check the configuration and build the owner set.
    ///
    /// Valid iff the owner list is non-empty, contains no duplicates, and
    /// `1 <= threshold <= owners`.
    pub fn validate(&self) -> Result<IndexSet<AccountId>, ConfigError> {
        if self.owners.is_empty() {
            return Err(ConfigError::NoOwners);
        }

        let mut owners = IndexSet::with_capacity(self.owners.len());
        for owner in &self.owners {
            if !owners.insert(*owner) {
                return Err(ConfigError::DuplicateOwner(*owner));
            }
        }

        if self.threshold == 0 || self.threshold > owners.len() {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.threshold,
                owners: owners.len(),
            });
        }

        Ok(owners)
    }
}
