//! Errors from setting up and running simulations.

use multisig_core::ConfigError;
use multisig_engine::LedgerError;
use multisig_types::CodecError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid registry config: {0}")]
    Registry(#[from] ConfigError),

    #[error("Ledger setup failed: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Payload encoding failed: {0}")]
    Codec(#[from] CodecError),

    #[error("Invalid workload: {0}")]
    InvalidWorkload(String),

    #[error("Unknown scenario: {0}")]
    UnknownScenario(String),

    #[error("Scenario {scenario} failed: {reason}")]
    ScenarioFailed {
        scenario: &'static str,
        reason: String,
    },
}
