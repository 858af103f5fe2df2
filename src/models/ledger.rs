// src/models/ledger.rs
//! Ledger entity identifiers and transaction receipts.
//!
//! Hedera addresses topics and accounts as `shard.realm.num`, three decimal
//! numbers separated by dots. Parsing is strict: no checksum suffix, no
//! whitespace, no signs. Because only digits and dots are accepted, a parsed
//! identifier can be interpolated into a DID without escaping.

use crate::error::DidError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A `shard.realm.num` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId {
    pub shard: u64,
    pub realm: u64,
    pub num: u64,
}

impl EntityId {
    /// Parses a `shard.realm.num` string, returning `None` on any deviation.
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split('.');
        let shard = parse_component(parts.next()?)?;
        let realm = parse_component(parts.next()?)?;
        let num = parse_component(parts.next()?)?;
        if parts.next().is_some() {
            return None;
        }
        Some(EntityId { shard, realm, num })
    }
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.shard, self.realm, self.num)
    }
}

/// Identifier of a consensus topic, assigned by the ledger on creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TopicId(EntityId);

impl TopicId {
    pub fn new(shard: u64, realm: u64, num: u64) -> Self {
        TopicId(EntityId { shard, realm, num })
    }
}

impl FromStr for TopicId {
    type Err = DidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityId::parse(s)
            .map(TopicId)
            .ok_or_else(|| DidError::InvalidTopicId(s.to_string()))
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for TopicId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TopicId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifier of the operator account paying for transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId(EntityId);

impl AccountId {
    /// Parses an account id. Returns `None` for anything but `shard.realm.num`.
    pub fn parse(input: &str) -> Option<Self> {
        EntityId::parse(input.trim()).map(AccountId)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Receipt returned once a consensus message reached consensus.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptConfirmation {
    /// Ledger status code, `SUCCESS` on acceptance.
    pub status: String,
    /// Position of the message in the topic.
    pub sequence_number: u64,
    /// Transaction identifier, e.g. `0.0.2@1700000000.000000000`.
    #[serde(default)]
    pub transaction_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_id_round_trip() {
        let topic: TopicId = "0.0.1234".parse().unwrap();
        assert_eq!(topic, TopicId::new(0, 0, 1234));
        assert_eq!(topic.to_string(), "0.0.1234");
    }

    #[test]
    fn test_topic_id_rejects_malformed() {
        for bad in [
            "", "0.0", "0.0.1.2", "0.0.x", "0..1", "0.0.1234-abcde", " 0.0.1", "0.0.+1",
            "0:0:1", "0.0.1_2", "0.0.1#frag",
        ] {
            let err = bad.parse::<TopicId>().unwrap_err();
            assert!(matches!(err, DidError::InvalidTopicId(ref s) if s == bad), "{bad}");
        }
    }

    #[test]
    fn test_topic_id_serde_as_string() {
        let topic = TopicId::new(0, 0, 42);
        assert_eq!(serde_json::to_string(&topic).unwrap(), "\"0.0.42\"");
        let parsed: TopicId = serde_json::from_str("\"0.0.42\"").unwrap();
        assert_eq!(parsed, topic);
        assert!(serde_json::from_str::<TopicId>("\"nope\"").is_err());
    }

    #[test]
    fn test_account_id_trims_whitespace() {
        assert_eq!(AccountId::parse(" 0.0.2 \n").unwrap().to_string(), "0.0.2");
        assert!(AccountId::parse("alice").is_none());
    }

    #[test]
    fn test_receipt_camel_case() {
        let receipt: ReceiptConfirmation =
            serde_json::from_str(r#"{"status":"SUCCESS","sequenceNumber":3}"#).unwrap();
        assert_eq!(receipt.sequence_number, 3);
        assert_eq!(receipt.transaction_id, None);
    }
}
