// src/blockchain/hedera_client.rs
//! Hedera consensus service client implementation.
//!
//! Talks JSON over HTTP to a Hedera consensus gateway, which turns each
//! request into a consensus-service transaction paid for by the operator
//! account and returns the transaction receipt.
//!
//! # Request authentication
//! Every request body is signed with the operator's Ed25519 key. The account
//! id travels in `X-Operator-Account`, the base64 signature over the exact
//! body bytes in `X-Operator-Signature`.

use crate::blockchain::LedgerClient;
use crate::error::LedgerError;
use crate::models::ledger::{AccountId, ReceiptConfirmation, TopicId};
use crate::utils::settings::LedgerSettings;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::CONTENT_TYPE;
use ring::signature::Ed25519KeyPair;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// DER prefix of a PKCS#8-wrapped Ed25519 private key, as exported by the
/// Hedera portal and SDKs.
const ED25519_DER_PREFIX: [u8; 16] = [
    0x30, 0x2e, 0x02, 0x01, 0x00, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x04, 0x22, 0x04, 0x20,
];

/// Receipt status of an accepted transaction.
pub const STATUS_SUCCESS: &str = "SUCCESS";

pub const OPERATOR_ACCOUNT_HEADER: &str = "X-Operator-Account";
pub const OPERATOR_SIGNATURE_HEADER: &str = "X-Operator-Signature";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TransactionRequest<'a> {
    network: &'a str,
    operator_account_id: String,
    max_transaction_fee: u64,
    /// base64 of the consensus message, for submissions only.
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct TopicCreateReceipt {
    status: String,
    #[serde(default)]
    topic_id: Option<String>,
}

/// Hedera client bound to one operator account.
///
/// Constructed explicitly from [`LedgerSettings`]; there is no process-wide
/// client.
pub struct HederaClient {
    client: reqwest::Client,
    api_url: String,
    network: String,
    operator_account: AccountId,
    operator_key: Ed25519KeyPair,
    max_transaction_fee: u64,
}

impl HederaClient {
    /// Creates a new client for the operator in `settings`.
    ///
    /// # Errors
    /// Returns error if:
    /// - The operator key is not valid hex
    /// - The operator key is not a 32-byte seed, 48-byte DER or 64-byte
    ///   `seed || public` Ed25519 key
    /// - The HTTP client cannot be constructed
    pub fn new(settings: &LedgerSettings) -> Result<Self, LedgerError> {
        let operator_key = parse_operator_key(&settings.private_key)?;
        let client = reqwest::Client::builder().build()?;
        info!(
            "ledger client for operator {} on {} via {}",
            settings.account_id, settings.network, settings.api_url
        );
        Ok(Self {
            client,
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            network: settings.network.clone(),
            operator_account: settings.account_id,
            operator_key,
            max_transaction_fee: settings.max_transaction_fee,
        })
    }

    fn request(&self, message: Option<&[u8]>) -> TransactionRequest<'_> {
        TransactionRequest {
            network: &self.network,
            operator_account_id: self.operator_account.to_string(),
            max_transaction_fee: self.max_transaction_fee,
            message: message.map(base64::encode),
        }
    }

    /// Signs and posts a transaction request, returning the decoded receipt.
    async fn send_transaction<R: DeserializeOwned>(
        &self,
        path: &str,
        request: &TransactionRequest<'_>,
    ) -> Result<R, LedgerError> {
        let url = format!("{}{}", self.api_url, path);
        let body = serde_json::to_vec(request)?;
        let signature = base64::encode(self.operator_key.sign(&body));
        debug!("POST {} ({} bytes)", url, body.len());

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(OPERATOR_ACCOUNT_HEADER, self.operator_account.to_string())
            .header(OPERATOR_SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(LedgerError::Rejected {
                status: status.to_string(),
                detail: text,
            });
        }

        serde_json::from_str(&text)
            .map_err(|e| LedgerError::InvalidResponse(format!("{}: {}", e, text)))
    }
}

#[async_trait]
impl LedgerClient for HederaClient {
    async fn create_consensus_topic(&self) -> Result<TopicId, LedgerError> {
        let receipt: TopicCreateReceipt = self
            .send_transaction("/api/v1/topics", &self.request(None))
            .await?;
        ensure_success(&receipt.status, "topic create")?;

        let raw = receipt
            .topic_id
            .ok_or_else(|| LedgerError::InvalidResponse("receipt has no topicId".into()))?;
        let topic_id = raw
            .parse::<TopicId>()
            .map_err(|e| LedgerError::InvalidResponse(e.to_string()))?;
        info!("created consensus topic {}", topic_id);
        Ok(topic_id)
    }

    async fn submit_consensus_message(
        &self,
        topic_id: &TopicId,
        message: &[u8],
    ) -> Result<ReceiptConfirmation, LedgerError> {
        let path = format!("/api/v1/topics/{}/messages", topic_id);
        let receipt: ReceiptConfirmation = self
            .send_transaction(&path, &self.request(Some(message)))
            .await?;
        ensure_success(&receipt.status, "message submit")?;
        info!(
            "message reached consensus on {} at sequence {}",
            topic_id, receipt.sequence_number
        );
        Ok(receipt)
    }
}

fn ensure_success(status: &str, operation: &str) -> Result<(), LedgerError> {
    if status == STATUS_SUCCESS {
        Ok(())
    } else {
        Err(LedgerError::Rejected {
            status: status.to_string(),
            detail: format!("{} receipt", operation),
        })
    }
}

/// Decodes a hex operator key into a signing key pair.
///
/// Accepts an optional `0x` prefix and three layouts: a raw 32-byte seed,
/// the 48-byte DER form, or 64 bytes of `seed || public`.
pub fn parse_operator_key(raw: &str) -> Result<Ed25519KeyPair, LedgerError> {
    let trimmed = raw.trim();
    let hex_key = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(hex_key)
        .map_err(|e| LedgerError::InvalidOperator(format!("operator key is not hex: {}", e)))?;

    let rejected = |e: ring::error::KeyRejected| LedgerError::InvalidOperator(e.to_string());
    match bytes.len() {
        32 => Ed25519KeyPair::from_seed_unchecked(&bytes).map_err(rejected),
        48 if bytes[..16] == ED25519_DER_PREFIX => {
            Ed25519KeyPair::from_seed_unchecked(&bytes[16..]).map_err(rejected)
        }
        64 => Ed25519KeyPair::from_seed_and_public_key(&bytes[..32], &bytes[32..]).map_err(rejected),
        n => Err(LedgerError::InvalidOperator(format!(
            "unsupported operator key length {} (expected an Ed25519 key)",
            n
        ))),
    }
}
