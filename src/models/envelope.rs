// src/models/envelope.rs
//! Registration event and signed envelope submitted to the consensus topic.
//!
//! Wire shape of a ledger message:
//! ```text
//! {"signature": "<base64>", "message": {"operation": "create", "did": "...", "event": "<base64 JSON>"}}
//! ```
//! The signature covers the exact bytes of `message` as serialized here.
//! Field order follows struct declaration order, so serialization is
//! byte-stable across calls.

use serde::{Deserialize, Serialize};

/// Value of the `type` field of a published document reference.
pub const DID_DOCUMENT_TYPE: &str = "DIDDocument";

/// Pointer to the DID Document stored in content-addressed storage.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DocumentPointer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `<root cid>/<file name>`
    pub cid: String,
    /// Gateway URL resolving `cid`.
    pub url: String,
}

/// Event payload, base64-encoded into [`RegistrationMessage::event`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEvent {
    #[serde(rename = "DIDDocument")]
    pub did_document: DocumentPointer,
}

/// DID operation recorded on the topic. Only creation is supported.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
}

/// The signed part of an envelope.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationMessage {
    pub operation: Operation,
    pub did: String,
    /// base64(JSON([`RegistrationEvent`]))
    pub event: String,
}

impl RegistrationMessage {
    /// The exact bytes the envelope signature covers.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A registration message with its detached Ed25519 signature.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct RegistrationEnvelope {
    /// base64 of the raw signature bytes.
    pub signature: String,
    pub message: RegistrationMessage,
}

impl RegistrationEnvelope {
    /// Bytes submitted as the consensus message.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
