// src/services/operator_output.rs
//! Operator-facing progress reports.
//!
//! Reports go to stdout, separate from the `log` stream on stderr. Generated
//! private keys are shown here once so the operator can escrow them; they are
//! never written to the log.

use crate::models::ledger::TopicId;
use crate::storage::ContentReference;
use crate::wallet::key_management::KeyPair;

/// One step of a registration run worth telling the operator about.
#[derive(Debug)]
pub enum OperatorReport<'a> {
    TopicCreated(&'a TopicId),
    KeyMaterial { label: &'a str, key: &'a KeyPair },
    DocumentPublished { reference: &'a ContentReference, url: String },
    Registered { did: &'a str, topic_id: &'a TopicId },
}

/// Sink for [`OperatorReport`]s.
pub trait OperatorOutput {
    fn report(&self, report: OperatorReport<'_>);
}

/// Closing notice of a successful registration.
pub const CONSENSUS_NOTICE: &str =
    "Please allow some time for consensus before trying to resolve";

/// Prints reports to stdout.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleOutput;

impl OperatorOutput for ConsoleOutput {
    fn report(&self, report: OperatorReport<'_>) {
        println!("{}", render(&report));
    }
}

/// Text printed for a report.
pub fn render(report: &OperatorReport<'_>) -> String {
    match report {
        OperatorReport::TopicCreated(topic_id) => format!("The new topic ID is {}", topic_id),
        OperatorReport::KeyMaterial { label, key } => format!(
            "{label} private key (hex): {}\n{label} public key (hex): {}\n{label} public key (multibase): {}",
            key.private_key_hex(),
            key.public_key_hex(),
            key.public_key_multibase(),
        ),
        OperatorReport::DocumentPublished { reference, url } => format!(
            "DID Document published\n  cid: {}\n  url: {}",
            reference.cid(),
            url
        ),
        OperatorReport::Registered { did, topic_id } => format!(
            "Your DID: {}\nYour DID document has been registered on topic {}.\n{}",
            did, topic_id, CONSENSUS_NOTICE
        ),
    }
}
