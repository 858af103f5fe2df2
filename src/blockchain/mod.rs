// src/blockchain/mod.rs
//! Ledger access: consensus topic creation and message submission.

pub mod hedera_client;

use crate::error::LedgerError;
use crate::models::ledger::{ReceiptConfirmation, TopicId};
use async_trait::async_trait;

/// The two consensus-service operations a registration needs.
///
/// Both calls block until the ledger returns a receipt. Failures are final;
/// callers do not retry.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Creates a new consensus topic and returns its id.
    async fn create_consensus_topic(&self) -> Result<TopicId, LedgerError>;

    /// Submits `message` to `topic_id` and waits for its receipt.
    async fn submit_consensus_message(
        &self,
        topic_id: &TopicId,
        message: &[u8],
    ) -> Result<ReceiptConfirmation, LedgerError>;
}
