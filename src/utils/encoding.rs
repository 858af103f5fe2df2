// src/utils/encoding.rs
//! Encoding utilities for keys, identifiers and ledger payloads.
//!
//! Provides conversions between:
//! - raw key bytes and base58btc / multibase text
//! - serializable values and base64-wrapped JSON

use serde::{de::DeserializeOwned, Serialize};

/// Multibase prefix character for base58btc.
pub const MULTIBASE_BASE58BTC: char = 'z';

/// Encodes bytes as bare base58btc (Bitcoin alphabet, no prefix).
pub fn encode_base58(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Decodes bare base58btc text.
///
/// # Returns
/// - `Ok(Vec<u8>)` with the decoded bytes
/// - `Err(String)` describing the invalid character or length
pub fn decode_base58(data: &str) -> Result<Vec<u8>, String> {
    bs58::decode(data)
        .into_vec()
        .map_err(|e| format!("Base58 decoding failed: {}", e))
}

/// Encodes bytes as self-describing multibase base58btc (`z...`).
pub fn encode_multibase(data: &[u8]) -> String {
    let mut encoded = String::with_capacity(data.len() * 2);
    encoded.push(MULTIBASE_BASE58BTC);
    encoded.push_str(&encode_base58(data));
    encoded
}

/// Decodes multibase text. Only the base58btc alphabet is accepted.
pub fn decode_multibase(data: &str) -> Result<Vec<u8>, String> {
    let mut chars = data.chars();
    match chars.next() {
        Some(MULTIBASE_BASE58BTC) => decode_base58(chars.as_str()),
        Some(other) => Err(format!("Unsupported multibase prefix {:?}", other)),
        None => Err("Empty multibase string".to_string()),
    }
}

/// Serializes a value to JSON and wraps the UTF-8 bytes in base64.
pub fn to_base64_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(value)?;
    Ok(base64::encode(json))
}

/// Reverses [`to_base64_json`].
pub fn from_base64_json<T: DeserializeOwned>(data: &str) -> Result<T, String> {
    let bytes = base64::decode(data).map_err(|e| format!("Base64 decoding failed: {}", e))?;
    serde_json::from_slice(&bytes).map_err(|e| format!("Deserialization failed: {}", e))
}
