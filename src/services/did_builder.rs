// src/services/did_builder.rs
//! DID Document construction.
//!
//! One builder serves both primary-key encodings. The strategy only changes
//! how the Ed25519 verification method carries its key; the DID itself always
//! embeds the multibase form.
//!
//! The secondary BLS12-381 G2 method always uses `publicKeyBase58`, never
//! multibase, because the BBS+ libraries that consume it only read base58.
//! The two methods of one document therefore use different encodings on
//! purpose.

use crate::error::DidError;
use crate::models::did::{
    compose_did, validate_network, DidDocument, PublicKeyMaterial, VerificationMethod,
    VerificationMethodType, BBS_KEY_FRAGMENT, DID_CONTEXT, ROOT_KEY_FRAGMENT,
};
use crate::models::ledger::TopicId;
use crate::wallet::key_management::{KeyPair, KeySuite};
use std::fmt;
use std::str::FromStr;

/// Network used when none is configured.
pub const DEFAULT_NETWORK: &str = "testnet";

/// How the primary Ed25519 key is written into its verification method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimaryKeyEncoding {
    /// `Ed25519VerificationKey2020` with `publicKeyMultibase`.
    #[default]
    Multibase,
    /// `Ed25519VerificationKey2018` with `publicKeyBase58`, for verifiers
    /// that predate multibase.
    Base58,
}

impl FromStr for PrimaryKeyEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "multibase" => Ok(PrimaryKeyEncoding::Multibase),
            "base58" => Ok(PrimaryKeyEncoding::Base58),
            other => Err(format!(
                "unknown key encoding {:?} (expected multibase or base58)",
                other
            )),
        }
    }
}

impl fmt::Display for PrimaryKeyEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimaryKeyEncoding::Multibase => f.write_str("multibase"),
            PrimaryKeyEncoding::Base58 => f.write_str("base58"),
        }
    }
}

/// Builds DID Documents for one network with one primary-key encoding.
#[derive(Debug, Clone)]
pub struct DidDocumentBuilder {
    network: String,
    encoding: PrimaryKeyEncoding,
}

impl DidDocumentBuilder {
    /// # Errors
    /// [`DidError::InvalidNetwork`] if `network` could break DID parsing.
    pub fn new(network: &str, encoding: PrimaryKeyEncoding) -> Result<Self, DidError> {
        validate_network(network)?;
        Ok(DidDocumentBuilder {
            network: network.to_string(),
            encoding,
        })
    }

    /// Assembles the document for `primary` and `secondary` anchored to
    /// `topic_id`.
    ///
    /// # Process Flow
    /// 1. Multibase-encodes the primary public key
    /// 2. Composes `did:hedera:<network>:<key>_<topic>`
    /// 3. Builds the primary method per the configured encoding and the
    ///    secondary method in base58
    /// 4. References both methods from `authentication` and `assertionMethod`
    ///
    /// # Errors
    /// [`DidError::KeyEncoding`] if a key pair has the wrong suite or a
    /// public key of the wrong length.
    pub fn build(
        &self,
        primary: &KeyPair,
        secondary: &KeyPair,
        topic_id: &TopicId,
    ) -> Result<DidDocument, DidError> {
        check_key(primary, KeySuite::Ed25519)?;
        check_key(secondary, KeySuite::Bls12381G2)?;

        let did = compose_did(&self.network, &primary.public_key_multibase(), topic_id);
        let root_id = format!("{}{}", did, ROOT_KEY_FRAGMENT);
        let bbs_id = format!("{}{}", did, BBS_KEY_FRAGMENT);

        let (method_type, public_key) = match self.encoding {
            PrimaryKeyEncoding::Multibase => (
                VerificationMethodType::Ed25519VerificationKey2020,
                PublicKeyMaterial::Multibase(primary.public_key_multibase()),
            ),
            PrimaryKeyEncoding::Base58 => (
                VerificationMethodType::Ed25519VerificationKey2018,
                PublicKeyMaterial::Base58(primary.public_key_base58()),
            ),
        };

        let root_key = VerificationMethod {
            id: root_id.clone(),
            method_type,
            controller: did.clone(),
            public_key,
        };
        let bbs_key = VerificationMethod {
            id: bbs_id.clone(),
            method_type: VerificationMethodType::Bls12381G2Key2020,
            controller: did.clone(),
            public_key: PublicKeyMaterial::Base58(secondary.public_key_base58()),
        };

        Ok(DidDocument {
            context: DID_CONTEXT.to_string(),
            id: did,
            authentication: vec![root_id, bbs_id],
            public_key: vec![root_key, bbs_key],
            assertion_method: vec![ROOT_KEY_FRAGMENT.to_string(), BBS_KEY_FRAGMENT.to_string()],
        })
    }
}

/// Convenience wrapper over [`DidDocumentBuilder`].
pub fn build_did_document(
    primary: &KeyPair,
    secondary: &KeyPair,
    network: &str,
    topic_id: &TopicId,
    encoding: PrimaryKeyEncoding,
) -> Result<DidDocument, DidError> {
    DidDocumentBuilder::new(network, encoding)?.build(primary, secondary, topic_id)
}

fn check_key(key: &KeyPair, expected: KeySuite) -> Result<(), DidError> {
    if key.suite() != expected {
        return Err(DidError::KeyEncoding {
            suite: key.suite(),
            reason: format!("expected a {} key", expected),
        });
    }
    if key.public_key().len() != expected.public_key_length() {
        return Err(DidError::KeyEncoding {
            suite: expected,
            reason: format!(
                "public key is {} bytes, expected {}",
                key.public_key().len(),
                expected.public_key_length()
            ),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::encoding::{decode_base58, decode_multibase};
    use crate::wallet::key_management::{generate_primary_key_pair, generate_secondary_key_pair};

    fn keys() -> (KeyPair, KeyPair) {
        (
            KeyPair::ed25519_from_seed(&[9u8; 32]).unwrap(),
            KeyPair::bls12381_g2_from_entropy(&[5u8; 64]).unwrap(),
        )
    }

    fn topic() -> TopicId {
        "0.0.1234".parse().unwrap()
    }

    #[test]
    fn test_did_embeds_multibase_key_and_topic() {
        let (primary, secondary) = keys();
        let doc = build_did_document(&primary, &secondary, "testnet", &topic(), PrimaryKeyEncoding::Multibase)
            .unwrap();

        let expected = format!("did:hedera:testnet:{}_0.0.1234", primary.public_key_multibase());
        assert_eq!(doc.id, expected);
        assert_eq!(doc.id.matches("0.0.1234").count(), 1);
        assert!(doc.validate_references().is_ok());
    }

    #[test]
    fn test_seeded_key_gives_known_did() {
        let (primary, secondary) = keys();
        let doc = build_did_document(&primary, &secondary, "testnet", &topic(), PrimaryKeyEncoding::Multibase)
            .unwrap();

        assert_eq!(
            doc.id,
            "did:hedera:testnet:zJ2xccRtuG43drESLYznHhLhQkLTdfepcKYbiQ9BsJVaf_0.0.1234"
        );
        assert_eq!(
            doc.authentication[0],
            "did:hedera:testnet:zJ2xccRtuG43drESLYznHhLhQkLTdfepcKYbiQ9BsJVaf_0.0.1234#did-root-key"
        );
        assert_eq!(
            primary.public_key_hex(),
            "fd1724385aa0c75b64fb78cd602fa1d991fdebf76b13c58ed702eac835e9f618"
        );
    }

    #[test]
    fn test_references_resolve_for_fresh_keys() {
        for encoding in [PrimaryKeyEncoding::Multibase, PrimaryKeyEncoding::Base58] {
            for num in [1u64, 1234, u64::MAX] {
                let topic = TopicId::new(0, 0, num);
                let primary = generate_primary_key_pair().unwrap();
                let secondary = generate_secondary_key_pair().unwrap();
                let doc = build_did_document(&primary, &secondary, "mainnet", &topic, encoding).unwrap();

                assert_eq!(doc.id.matches(&topic.to_string()).count(), 1);
                assert_eq!(doc.authentication.len(), 2);
                assert_eq!(doc.assertion_method.len(), 2);
                for reference in doc.authentication.iter().chain(doc.assertion_method.iter()) {
                    assert!(doc.resolve_reference(reference).is_some(), "{}", reference);
                }
            }
        }
    }

    #[test]
    fn test_multibase_strategy() {
        let (primary, secondary) = keys();
        let doc = build_did_document(&primary, &secondary, "testnet", &topic(), PrimaryKeyEncoding::Multibase)
            .unwrap();
        let root = doc.root_key().unwrap();

        assert_eq!(root.method_type, VerificationMethodType::Ed25519VerificationKey2020);
        match &root.public_key {
            PublicKeyMaterial::Multibase(value) => {
                assert_eq!(decode_multibase(value).unwrap(), primary.public_key())
            }
            other => panic!("expected multibase, got {:?}", other),
        }
    }

    #[test]
    fn test_base58_strategy_keeps_multibase_did() {
        let (primary, secondary) = keys();
        let doc = build_did_document(&primary, &secondary, "testnet", &topic(), PrimaryKeyEncoding::Base58)
            .unwrap();
        let root = doc.root_key().unwrap();

        assert_eq!(root.method_type, VerificationMethodType::Ed25519VerificationKey2018);
        assert_eq!(root.public_key, PublicKeyMaterial::Base58(primary.public_key_base58()));
        assert!(doc.id.contains(&primary.public_key_multibase()));
    }

    #[test]
    fn test_secondary_is_always_base58() {
        let (primary, secondary) = keys();
        for encoding in [PrimaryKeyEncoding::Multibase, PrimaryKeyEncoding::Base58] {
            let doc = build_did_document(&primary, &secondary, "testnet", &topic(), encoding).unwrap();
            let bbs = doc.resolve_reference(BBS_KEY_FRAGMENT).unwrap();
            assert_eq!(bbs.method_type, VerificationMethodType::Bls12381G2Key2020);
            match &bbs.public_key {
                PublicKeyMaterial::Base58(value) => {
                    assert_eq!(decode_base58(value).unwrap(), secondary.public_key())
                }
                other => panic!("expected base58, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_swapped_suites_rejected() {
        let (primary, secondary) = keys();
        let err = build_did_document(&secondary, &primary, "testnet", &topic(), PrimaryKeyEncoding::Multibase)
            .unwrap_err();
        assert!(matches!(err, DidError::KeyEncoding { suite: KeySuite::Bls12381G2, .. }));
    }

    #[test]
    fn test_invalid_network_rejected() {
        assert!(matches!(
            DidDocumentBuilder::new("test:net", PrimaryKeyEncoding::Multibase),
            Err(DidError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert!(matches!("".parse::<TopicId>(), Err(DidError::InvalidTopicId(_))));
    }

    #[test]
    fn test_encoding_parse() {
        assert_eq!("Base58".parse::<PrimaryKeyEncoding>().unwrap(), PrimaryKeyEncoding::Base58);
        assert_eq!("multibase".parse::<PrimaryKeyEncoding>().unwrap(), PrimaryKeyEncoding::Multibase);
        assert!("hex".parse::<PrimaryKeyEncoding>().is_err());
        assert_eq!(PrimaryKeyEncoding::default().to_string(), "multibase");
    }
}
