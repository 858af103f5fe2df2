// src/services/envelope_signer.rs
//! Registration envelope signing and verification.
//!
//! The signer turns a published document reference into the message recorded
//! on the consensus topic:
//!
//! 1. `event = base64(JSON({"DIDDocument": {id, type, cid, url}}))`
//! 2. `message = {"operation": "create", "did": ..., "event": event}`
//! 3. `signature = base64(Ed25519(private_key, bytes(message)))`
//!
//! Verifiers re-serialize `message` with the same field order and check the
//! signature over those bytes.

use crate::error::SigningError;
use crate::models::did::{DidDocument, PublicKeyMaterial, ROOT_KEY_FRAGMENT};
use crate::models::envelope::{
    DocumentPointer, Operation, RegistrationEnvelope, RegistrationEvent, RegistrationMessage,
    DID_DOCUMENT_TYPE,
};
use crate::storage::{ContentReference, DEFAULT_IPFS_GATEWAY};
use crate::utils::encoding::{decode_base58, decode_multibase, to_base64_json};
use crate::wallet::key_management::{
    KeyPair, KeySuite, ED25519_KEY_LENGTH, ED25519_PRIVATE_KEY_LENGTH,
};
use ring::signature::{Ed25519KeyPair, UnparsedPublicKey, ED25519};

/// Signs registration events for documents reachable through one gateway.
#[derive(Debug, Clone)]
pub struct EnvelopeSigner {
    gateway_url: String,
}

impl Default for EnvelopeSigner {
    fn default() -> Self {
        EnvelopeSigner::new(DEFAULT_IPFS_GATEWAY)
    }
}

impl EnvelopeSigner {
    /// # Arguments
    /// * `gateway_url` - Prefix the document URL is built from, e.g.
    ///   `https://ipfs.io/ipfs/`
    pub fn new(gateway_url: &str) -> Self {
        EnvelopeSigner {
            gateway_url: gateway_url.to_string(),
        }
    }

    /// Builds and signs the creation envelope for `did`.
    ///
    /// # Arguments
    /// * `did` - Identifier the event is recorded for
    /// * `content` - Where the DID Document was published
    /// * `primary` - Ed25519 key pair whose private key is `seed || public`
    ///
    /// # Errors
    /// - [`SigningError::UnsupportedSuite`] for a non-Ed25519 key
    /// - [`SigningError::InvalidKeyLength`] if the private key is not 64 bytes
    /// - [`SigningError::KeyRejected`] if the seed does not derive the public key
    pub fn sign_registration_event(
        &self,
        did: &str,
        content: &ContentReference,
        primary: &KeyPair,
    ) -> Result<RegistrationEnvelope, SigningError> {
        let signing_key = signing_key(primary)?;

        let event = RegistrationEvent {
            did_document: DocumentPointer {
                id: did.to_string(),
                kind: DID_DOCUMENT_TYPE.to_string(),
                cid: content.cid(),
                url: content.resolvable_url(&self.gateway_url),
            },
        };
        let message = RegistrationMessage {
            operation: Operation::Create,
            did: did.to_string(),
            event: to_base64_json(&event)?,
        };

        let signature = signing_key.sign(&message.canonical_bytes()?);
        Ok(RegistrationEnvelope {
            signature: base64::encode(signature.as_ref()),
            message,
        })
    }
}

/// [`EnvelopeSigner::sign_registration_event`] with the default gateway.
pub fn sign_registration_event(
    did: &str,
    content: &ContentReference,
    primary: &KeyPair,
) -> Result<RegistrationEnvelope, SigningError> {
    EnvelopeSigner::default().sign_registration_event(did, content, primary)
}

fn signing_key(primary: &KeyPair) -> Result<Ed25519KeyPair, SigningError> {
    if primary.suite() != KeySuite::Ed25519 {
        return Err(SigningError::UnsupportedSuite(primary.suite()));
    }
    let private_key = primary.private_key();
    if private_key.len() != ED25519_PRIVATE_KEY_LENGTH {
        return Err(SigningError::InvalidKeyLength {
            suite: KeySuite::Ed25519,
            expected: ED25519_PRIVATE_KEY_LENGTH,
            actual: private_key.len(),
        });
    }
    let (seed, public_key) = private_key.split_at(ED25519_KEY_LENGTH);
    Ed25519KeyPair::from_seed_and_public_key(seed, public_key)
        .map_err(|e| SigningError::KeyRejected(e.to_string()))
}

/// Checks a base64 Ed25519 `signature` over `message`.
///
/// # Errors
/// - [`SigningError::MalformedSignature`] if `signature` is not base64
/// - [`SigningError::VerificationFailed`] otherwise on mismatch
pub fn verify_message(
    message: &[u8],
    signature: &str,
    public_key: &[u8],
) -> Result<(), SigningError> {
    let signature = base64::decode(signature)?;
    UnparsedPublicKey::new(&ED25519, public_key)
        .verify(message, &signature)
        .map_err(|_| SigningError::VerificationFailed)
}

impl RegistrationEnvelope {
    /// Verifies the envelope signature against a raw Ed25519 public key.
    pub fn verify(&self, public_key: &[u8]) -> Result<(), SigningError> {
        verify_message(&self.message.canonical_bytes()?, &self.signature, public_key)
    }

    /// Verifies the envelope against the root key of `document`.
    ///
    /// # Errors
    /// [`SigningError::MissingVerificationMethod`] if the document has no
    /// decodable `#did-root-key`, plus the errors of [`verify_message`].
    pub fn verify_against_document(&self, document: &DidDocument) -> Result<(), SigningError> {
        let missing = || SigningError::MissingVerificationMethod(ROOT_KEY_FRAGMENT.to_string());
        let root_key = document.root_key().ok_or_else(missing)?;
        let public_key = match &root_key.public_key {
            PublicKeyMaterial::Multibase(value) => decode_multibase(value),
            PublicKeyMaterial::Base58(value) => decode_base58(value),
        }
        .map_err(|_| missing())?;
        self.verify(&public_key)
    }
}
