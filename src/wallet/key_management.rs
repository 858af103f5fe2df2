// src/wallet/key_management.rs
//! Key material generation for DID registration.
//!
//! A registration run generates two independent key pairs:
//! - an Ed25519 pair (via `ring`), the primary verification key that also
//!   signs the registration envelope
//! - a BLS12-381 G2 pair (via arkworks), the secondary key advertised for
//!   BBS+ selective-disclosure signatures
//!
//! Private keys are never persisted. They live in memory for the duration of
//! the run and are surfaced to the operator once so they can be escrowed.

use crate::error::KeyGenerationError;
use crate::utils::encoding::{encode_base58, encode_multibase};
use ark_bls12_381::{Fr, G2Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, PrimeField};
use ark_serialize::CanonicalSerialize;
use ark_std::Zero;
use rand::rngs::OsRng;
use rand::RngCore;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{Ed25519KeyPair, KeyPair as _};
use std::fmt;

/// Length of an Ed25519 seed and public key.
pub const ED25519_KEY_LENGTH: usize = 32;
/// Length of the Ed25519 private key layout used here (`seed || public`).
pub const ED25519_PRIVATE_KEY_LENGTH: usize = 64;
/// Length of a BLS12-381 secret scalar.
pub const BLS12381_PRIVATE_KEY_LENGTH: usize = 32;
/// Length of a compressed BLS12-381 G2 point.
pub const BLS12381_G2_PUBLIC_KEY_LENGTH: usize = 96;

/// Entropy drawn for a BLS scalar; twice the field size keeps the modular
/// reduction unbiased.
const BLS_ENTROPY_LENGTH: usize = 64;

/// Signature suite of a key pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySuite {
    Ed25519,
    Bls12381G2,
}

impl KeySuite {
    /// Expected public key length in bytes.
    pub fn public_key_length(self) -> usize {
        match self {
            KeySuite::Ed25519 => ED25519_KEY_LENGTH,
            KeySuite::Bls12381G2 => BLS12381_G2_PUBLIC_KEY_LENGTH,
        }
    }

    /// Expected private key length in bytes.
    pub fn private_key_length(self) -> usize {
        match self {
            KeySuite::Ed25519 => ED25519_PRIVATE_KEY_LENGTH,
            KeySuite::Bls12381G2 => BLS12381_PRIVATE_KEY_LENGTH,
        }
    }
}

impl fmt::Display for KeySuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySuite::Ed25519 => f.write_str("Ed25519"),
            KeySuite::Bls12381G2 => f.write_str("Bls12381G2"),
        }
    }
}

/// An asymmetric key pair of a named suite.
///
/// # Security Notes
/// - `Debug` output never contains the private key
/// - Nothing in this crate writes a private key to disk or to the log
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    suite: KeySuite,
    public_key: Vec<u8>,
    private_key: Vec<u8>,
}

impl KeyPair {
    /// Builds an Ed25519 key pair from a 32-byte seed.
    ///
    /// The private key is stored as `seed || public` (64 bytes), the layout
    /// NaCl-style tooling and the ledger SDKs import directly.
    pub fn ed25519_from_seed(seed: &[u8; ED25519_KEY_LENGTH]) -> Result<Self, KeyGenerationError> {
        let key_pair = Ed25519KeyPair::from_seed_unchecked(seed).map_err(|e| {
            KeyGenerationError::InvalidKeyMaterial {
                suite: KeySuite::Ed25519,
                reason: e.to_string(),
            }
        })?;
        let public_key = key_pair.public_key().as_ref().to_vec();

        let mut private_key = Vec::with_capacity(ED25519_PRIVATE_KEY_LENGTH);
        private_key.extend_from_slice(seed);
        private_key.extend_from_slice(&public_key);

        Ok(KeyPair {
            suite: KeySuite::Ed25519,
            public_key,
            private_key,
        })
    }

    /// Builds a BLS12-381 G2 key pair from uniformly random bytes.
    ///
    /// The bytes are reduced modulo the scalar field order to give the secret
    /// key; the public key is `sk * G2` in compressed form.
    ///
    /// # Errors
    /// Rejects entropy that reduces to the zero scalar.
    pub fn bls12381_g2_from_entropy(entropy: &[u8]) -> Result<Self, KeyGenerationError> {
        let secret = Fr::from_le_bytes_mod_order(entropy);
        if secret.is_zero() {
            return Err(KeyGenerationError::InvalidKeyMaterial {
                suite: KeySuite::Bls12381G2,
                reason: "secret scalar is zero".into(),
            });
        }

        let public = (G2Affine::generator() * secret).into_affine();
        let mut public_key = Vec::with_capacity(BLS12381_G2_PUBLIC_KEY_LENGTH);
        public
            .serialize_compressed(&mut public_key)
            .map_err(|e| KeyGenerationError::InvalidKeyMaterial {
                suite: KeySuite::Bls12381G2,
                reason: e.to_string(),
            })?;

        Ok(KeyPair {
            suite: KeySuite::Bls12381G2,
            public_key,
            private_key: secret.into_bigint().to_bytes_be(),
        })
    }

    pub fn suite(&self) -> KeySuite {
        self.suite
    }

    pub fn public_key(&self) -> &[u8] {
        &self.public_key
    }

    /// Raw private key bytes. Only the envelope signer and the operator report
    /// should need these.
    pub fn private_key(&self) -> &[u8] {
        &self.private_key
    }

    pub fn public_key_hex(&self) -> String {
        hex::encode(&self.public_key)
    }

    pub fn private_key_hex(&self) -> String {
        hex::encode(&self.private_key)
    }

    /// Public key as multibase base58btc (`z` prefix).
    pub fn public_key_multibase(&self) -> String {
        encode_multibase(&self.public_key)
    }

    /// Public key as bare base58btc, no multibase prefix.
    pub fn public_key_base58(&self) -> String {
        encode_base58(&self.public_key)
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("suite", &self.suite)
            .field("public_key", &self.public_key_hex())
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Generates a fresh Ed25519 primary key pair from the OS random source.
///
/// # Errors
/// Returns [`KeyGenerationError::RandomSourceUnavailable`] when the system
/// CSPRNG fails. There is no fallback source.
pub fn generate_primary_key_pair() -> Result<KeyPair, KeyGenerationError> {
    let mut seed = [0u8; ED25519_KEY_LENGTH];
    SystemRandom::new()
        .fill(&mut seed)
        .map_err(|_| KeyGenerationError::RandomSourceUnavailable("ring SystemRandom".into()))?;
    KeyPair::ed25519_from_seed(&seed)
}

/// Generates a fresh BLS12-381 G2 secondary key pair, independent of the
/// primary pair.
///
/// # Errors
/// Same semantics as [`generate_primary_key_pair`].
pub fn generate_secondary_key_pair() -> Result<KeyPair, KeyGenerationError> {
    let mut entropy = [0u8; BLS_ENTROPY_LENGTH];
    OsRng
        .try_fill_bytes(&mut entropy)
        .map_err(|e| KeyGenerationError::RandomSourceUnavailable(e.to_string()))?;
    KeyPair::bls12381_g2_from_entropy(&entropy)
}
