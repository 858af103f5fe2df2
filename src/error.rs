// src/error.rs
//! Error types for the DID registrar.
//!
//! Every fallible step of a registration run returns one of the narrow error
//! enums below. [`RegistrarError`] wraps them all so the binaries can map a
//! failure to a process exit code.

use crate::wallet::key_management::KeySuite;
use thiserror::Error;

/// Missing or malformed configuration, detected before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables are absent or empty.
    #[error("environment variables {} must be present", .0.join(", "))]
    Missing(Vec<&'static str>),

    /// A variable is present but its value cannot be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Environment variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The environment source itself could not be read.
    #[error("failed to read configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// The secure random source could not produce key material.
#[derive(Debug, Error)]
pub enum KeyGenerationError {
    #[error("secure random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    #[error("{suite} key material rejected: {reason}")]
    InvalidKeyMaterial { suite: KeySuite, reason: String },
}

/// Failures while composing a DID or its document.
#[derive(Debug, Error)]
pub enum DidError {
    #[error("invalid topic id {0:?}: expected shard.realm.num")]
    InvalidTopicId(String),

    #[error("invalid network name {0:?}: expected lowercase ASCII letters and digits")]
    InvalidNetwork(String),

    #[error("cannot encode {suite} public key: {reason}")]
    KeyEncoding { suite: KeySuite, reason: String },

    #[error("document reference {0} does not resolve to a verification method")]
    DanglingReference(String),
}

/// Failures while signing or verifying a registration envelope.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("{suite} private key must be {expected} bytes, got {actual}")]
    InvalidKeyLength {
        suite: KeySuite,
        expected: usize,
        actual: usize,
    },

    #[error("{0} keys cannot sign registration envelopes")]
    UnsupportedSuite(KeySuite),

    #[error("private key rejected: {0}")]
    KeyRejected(String),

    #[error("signature is not valid base64: {0}")]
    MalformedSignature(#[from] base64::DecodeError),

    #[error("signature does not verify against the primary public key")]
    VerificationFailed,

    #[error("document has no usable {0} verification method")]
    MissingVerificationMethod(String),

    #[error("envelope serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ledger client failures. Never retried.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ledger rejected the transaction ({status}): {detail}")]
    Rejected { status: String, detail: String },

    #[error("unexpected ledger response: {0}")]
    InvalidResponse(String),

    #[error("invalid operator credentials: {0}")]
    InvalidOperator(String),

    #[error("ledger request encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Content-addressed storage failures. Never retried.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage rejected the upload ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("storage response did not contain a root CID for {0}")]
    MissingRoot(String),

    #[error("unexpected storage response: {0}")]
    InvalidResponse(String),
}

/// Umbrella error for a registration run.
#[derive(Debug, Error)]
pub enum RegistrarError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    KeyGeneration(#[from] KeyGenerationError),

    #[error(transparent)]
    Encoding(#[from] DidError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistrarError {
    /// Process exit status for this failure.
    ///
    /// Missing configuration exits with 1, external service failures with 2
    /// and local key/encoding/signing failures with 3.
    pub fn exit_code(&self) -> u8 {
        match self {
            RegistrarError::Configuration(_) => 1,
            RegistrarError::Ledger(_) | RegistrarError::Storage(_) => 2,
            RegistrarError::KeyGeneration(_)
            | RegistrarError::Encoding(_)
            | RegistrarError::Signing(_)
            | RegistrarError::Serialization(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_lists_every_variable() {
        let err = ConfigError::Missing(vec!["MY_ACCOUNT_ID", "MY_PRIVATE_KEY"]);
        assert_eq!(
            err.to_string(),
            "environment variables MY_ACCOUNT_ID, MY_PRIVATE_KEY must be present"
        );
    }

    #[test]
    fn test_exit_codes() {
        let config = RegistrarError::from(ConfigError::Missing(vec!["WEB3_API_TOKEN"]));
        assert_eq!(config.exit_code(), 1);

        let ledger = RegistrarError::from(LedgerError::Rejected {
            status: "INSUFFICIENT_PAYER_BALANCE".into(),
            detail: String::new(),
        });
        assert_eq!(ledger.exit_code(), 2);

        let storage = RegistrarError::from(StorageError::MissingRoot("did-document.json".into()));
        assert_eq!(storage.exit_code(), 2);

        let encoding = RegistrarError::from(DidError::InvalidTopicId(String::new()));
        assert_eq!(encoding.exit_code(), 3);
    }
}
