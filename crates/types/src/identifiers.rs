//! Domain-specific identifier types.

use sbor::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Amount of value held by or moved between accounts.
pub type Amount = u128;

/// Account identifier (20-byte address).
///
/// Identifies both externally-owned accounts and deployed contracts. The
/// signature layer that binds an account to a key is outside this workspace;
/// here an account is only an address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, BasicSbor)]
#[sbor(transparent)]
pub struct AccountId(pub [u8; 20]);

impl AccountId {
    /// Derive an account id from arbitrary seed material.
    pub fn from_seed(seed: &[u8]) -> Self {
        Self::derive(&[b"account", seed])
    }

    /// Derive the address of a contract deployed by `deployer` at `nonce`.
    pub fn derive_contract(deployer: &AccountId, nonce: u64) -> Self {
        Self::derive(&[b"contract", &deployer.0, &nonce.to_le_bytes()])
    }

    /// First 20 bytes of the Blake3 hash of `parts`, concatenated.
    fn derive(parts: &[&[u8]]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for part in parts {
            hasher.update(part);
        }
        let mut arr = [0u8; 20];
        arr.copy_from_slice(&hasher.finalize().as_bytes()[..20]);
        Self(arr)
    }

    /// Parse from a 40-character hex string (optionally `0x`-prefixed).
    pub fn from_hex(hex: &str) -> Result<Self, HexError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        if hex.len() != 40 {
            return Err(HexError::InvalidLength {
                expected: 40,
                actual: hex.len(),
            });
        }
        let mut arr = [0u8; 20];
        hex::decode_to_slice(hex, &mut arr).map_err(|_| HexError::InvalidHex)?;
        Ok(Self(arr))
    }

    /// Full lowercase hex encoding with `0x` prefix.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Get the bytes as a slice.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountId(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AccountId {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AccountId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AccountId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Errors from parsing an account id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    #[error("Invalid hex length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("Invalid hex string")]
    InvalidHex,
}

/// Position of a transaction record in a registry log.
///
/// Indices are dense and 0-based: the n-th submitted record has index n-1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, BasicSbor)]
#[sbor(transparent)]
pub struct TxIndex(pub u64);

impl TxIndex {
    /// Position within an in-memory log.
    ///
    /// Saturates on targets where `usize` is narrower than `u64`, which always
    /// lands out of range.
    pub fn as_usize(self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

impl From<u64> for TxIndex {
    fn from(value: u64) -> Self {
        TxIndex(value)
    }
}

impl fmt::Display for TxIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tx#{}", self.0)
    }
}
