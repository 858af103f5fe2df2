// src/models/did.rs
//! Decentralized Identifier (DID) data model implementation.
//!
//! Defines the DID Document published for a `did:hedera` identifier, following
//! the [DID Core Specification](https://www.w3.org/TR/did-core/) and the
//! Hedera DID method (v0.9), which lists keys under `publicKey`.

use crate::error::DidError;
use crate::models::ledger::TopicId;
use serde::{Deserialize, Serialize};

/// JSON-LD context of every generated document.
pub const DID_CONTEXT: &str = "https://www.w3.org/ns/did/v1";

/// Method name of the DIDs produced by this crate.
pub const DID_METHOD: &str = "hedera";

/// Fragment of the primary (Ed25519) verification method.
pub const ROOT_KEY_FRAGMENT: &str = "#did-root-key";

/// Fragment of the secondary (BLS12-381 G2) verification method.
pub const BBS_KEY_FRAGMENT: &str = "#did-root-key-bbs";

/// Separator between the key part and the topic part of the method-specific id.
pub const TOPIC_SEPARATOR: char = '_';

/// Composes a DID from its parts.
///
/// # DID Format
/// ```text
/// did:hedera:<network>:<multibase public key>_<topic id>
/// ```
///
/// `network` and `multibase_key` are interpolated verbatim; callers validate
/// them first. [`TopicId`] cannot contain a DID delimiter.
pub fn compose_did(network: &str, multibase_key: &str, topic_id: &TopicId) -> String {
    format!(
        "did:{}:{}:{}{}{}",
        DID_METHOD, network, multibase_key, TOPIC_SEPARATOR, topic_id
    )
}

/// Checks a network name before it is embedded in a DID.
///
/// Only non-empty lowercase ASCII letters and digits are accepted, so the
/// DID delimiters `:`, `_` and `#` cannot appear.
pub fn validate_network(network: &str) -> Result<(), DidError> {
    let valid = !network.is_empty()
        && network
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(DidError::InvalidNetwork(network.to_string()))
    }
}

/// Verification method types this crate can emit.
///
/// Anything else is unrepresentable, so an unsupported suite is caught when
/// the document is built rather than by a consumer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationMethodType {
    /// Ed25519 key carried as `publicKeyBase58`.
    Ed25519VerificationKey2018,
    /// Ed25519 key carried as `publicKeyMultibase`.
    Ed25519VerificationKey2020,
    /// BLS12-381 G2 key for BBS+ signatures, carried as `publicKeyBase58`.
    Bls12381G2Key2020,
}

/// Public key material of a verification method.
///
/// Serialized flattened into the method, so each variant becomes one
/// property: `publicKeyMultibase` or `publicKeyBase58`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum PublicKeyMaterial {
    #[serde(rename = "publicKeyMultibase")]
    Multibase(String),
    #[serde(rename = "publicKeyBase58")]
    Base58(String),
}

/// An embedded key descriptor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VerificationMethod {
    /// Full method id, `<did>#<fragment>`.
    pub id: String,

    #[serde(rename = "type")]
    pub method_type: VerificationMethodType,

    /// DID that controls this key; always the document's own id here.
    pub controller: String,

    #[serde(flatten)]
    pub public_key: PublicKeyMaterial,
}

/// A DID Document representing a `did:hedera` identity.
///
/// # Invariants
/// - `id` is unique per registration: it embeds a fresh primary public key
///   and a freshly created topic id
/// - every entry of `authentication` and `assertion_method` resolves to an
///   entry of `public_key` (see [`DidDocument::validate_references`])
///
/// # Reference forms
/// `authentication` uses full method ids; `assertion_method` uses bare
/// fragments, which is what JSON-LD signature suites look up.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DidDocument {
    #[serde(rename = "@context")]
    pub context: String,

    /// The complete DID string identifier.
    /// Example: "did:hedera:testnet:z6Mk..._0.0.1234"
    pub id: String,

    pub authentication: Vec<String>,

    /// Embedded verification methods.
    pub public_key: Vec<VerificationMethod>,

    pub assertion_method: Vec<String>,
}

impl DidDocument {
    /// Resolves a full (`did...#frag`) or bare (`#frag`) reference against
    /// this document's verification methods.
    pub fn resolve_reference(&self, reference: &str) -> Option<&VerificationMethod> {
        let full = if reference.starts_with('#') {
            format!("{}{}", self.id, reference)
        } else {
            reference.to_string()
        };
        self.public_key.iter().find(|method| method.id == full)
    }

    /// Checks that every authentication and assertion reference resolves.
    ///
    /// # Errors
    /// [`DidError::DanglingReference`] naming the first reference that does
    /// not resolve.
    pub fn validate_references(&self) -> Result<(), DidError> {
        self.authentication
            .iter()
            .chain(self.assertion_method.iter())
            .find(|reference| self.resolve_reference(reference).is_none())
            .map_or(Ok(()), |dangling| {
                Err(DidError::DanglingReference(dangling.clone()))
            })
    }

    /// The primary verification method, if present.
    pub fn root_key(&self) -> Option<&VerificationMethod> {
        self.resolve_reference(ROOT_KEY_FRAGMENT)
    }
}
