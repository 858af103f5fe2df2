// src/services/registrar.rs
//! Registration orchestrator.
//!
//! Runs the full `did:hedera` creation flow against explicit ledger and
//! storage clients:
//!
//! 1. Create a consensus topic
//! 2. Generate the primary (Ed25519) and secondary (BLS12-381 G2) key pairs
//! 3. Build the DID Document
//! 4. Publish it to content-addressed storage
//! 5. Sign the registration envelope
//! 6. Submit the envelope to the topic
//!
//! Each step runs once. The first failure aborts the run and nothing is
//! retried or rolled back, so a failure after step 1 leaves an unused topic.

use crate::blockchain::LedgerClient;
use crate::error::RegistrarError;
use crate::models::did::DidDocument;
use crate::models::envelope::RegistrationEnvelope;
use crate::models::ledger::{ReceiptConfirmation, TopicId};
use crate::services::did_builder::{DidDocumentBuilder, PrimaryKeyEncoding, DEFAULT_NETWORK};
use crate::services::envelope_signer::EnvelopeSigner;
use crate::services::operator_output::{OperatorOutput, OperatorReport};
use crate::storage::{ContentReference, ContentStore, DEFAULT_IPFS_GATEWAY};
use crate::utils::settings::Settings;
use crate::wallet::key_management::{generate_primary_key_pair, generate_secondary_key_pair};
use config::Environment;
use log::info;

/// File name the DID Document is published under.
pub const DID_DOCUMENT_NAME: &str = "did-document.json";

/// Per-run parameters that are not client connections.
#[derive(Debug, Clone)]
pub struct RegistrationOptions {
    pub network: String,
    pub key_encoding: PrimaryKeyEncoding,
    pub gateway_url: String,
    pub document_name: String,
}

impl Default for RegistrationOptions {
    fn default() -> Self {
        RegistrationOptions {
            network: DEFAULT_NETWORK.to_string(),
            key_encoding: PrimaryKeyEncoding::default(),
            gateway_url: DEFAULT_IPFS_GATEWAY.to_string(),
            document_name: DID_DOCUMENT_NAME.to_string(),
        }
    }
}

impl RegistrationOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        RegistrationOptions {
            network: settings.ledger.network.clone(),
            key_encoding: settings.key_encoding,
            gateway_url: settings.storage.gateway_url.clone(),
            document_name: DID_DOCUMENT_NAME.to_string(),
        }
    }
}

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub did: String,
    pub topic_id: TopicId,
    pub document: DidDocument,
    pub content: ContentReference,
    pub envelope: RegistrationEnvelope,
    pub receipt: ReceiptConfirmation,
}

/// Registers DIDs through one ledger client and one content store.
pub struct Registrar<L, S> {
    ledger: L,
    storage: S,
    options: RegistrationOptions,
}

impl<L: LedgerClient, S: ContentStore> Registrar<L, S> {
    pub fn new(ledger: L, storage: S, options: RegistrationOptions) -> Self {
        Registrar {
            ledger,
            storage,
            options,
        }
    }

    /// Runs one registration.
    ///
    /// # Arguments
    /// * `output` - Receives the topic id, both key pairs, the document
    ///   location and the final DID
    ///
    /// # Errors
    /// The first failing step's error, wrapped in [`RegistrarError`].
    pub async fn register(
        &self,
        output: &dyn OperatorOutput,
    ) -> Result<RegistrationOutcome, RegistrarError> {
        let builder = DidDocumentBuilder::new(&self.options.network, self.options.key_encoding)?;
        let signer = EnvelopeSigner::new(&self.options.gateway_url);

        let topic_id = self.ledger.create_consensus_topic().await?;
        info!("created topic {}", topic_id);
        output.report(OperatorReport::TopicCreated(&topic_id));

        let primary = generate_primary_key_pair()?;
        output.report(OperatorReport::KeyMaterial {
            label: "Primary",
            key: &primary,
        });
        let secondary = generate_secondary_key_pair()?;
        output.report(OperatorReport::KeyMaterial {
            label: "Secondary",
            key: &secondary,
        });

        let document = builder.build(&primary, &secondary, &topic_id)?;
        document.validate_references()?;
        info!("built document for {}", document.id);

        let content = self
            .storage
            .publish(&serde_json::to_vec(&document)?, &self.options.document_name)
            .await?;
        output.report(OperatorReport::DocumentPublished {
            reference: &content,
            url: content.resolvable_url(&self.options.gateway_url),
        });

        let envelope = signer.sign_registration_event(&document.id, &content, &primary)?;
        let receipt = self
            .ledger
            .submit_consensus_message(&topic_id, &envelope.to_bytes()?)
            .await?;
        info!(
            "registration accepted at sequence number {}",
            receipt.sequence_number
        );
        output.report(OperatorReport::Registered {
            did: &document.id,
            topic_id: &topic_id,
        });

        Ok(RegistrationOutcome {
            did: document.id.clone(),
            topic_id,
            document,
            content,
            envelope,
            receipt,
        })
    }
}

/// Loads settings from `environment`, connects the clients and registers one
/// DID.
///
/// Settings are validated before `connect` is called, so incomplete
/// configuration never reaches the ledger.
pub async fn run<L, S, F>(
    environment: Environment,
    connect: F,
    output: &dyn OperatorOutput,
) -> Result<RegistrationOutcome, RegistrarError>
where
    L: LedgerClient,
    S: ContentStore,
    F: FnOnce(&Settings) -> Result<(L, S), RegistrarError>,
{
    let settings = Settings::load(environment)?;
    let (ledger, storage) = connect(&settings)?;
    Registrar::new(ledger, storage, RegistrationOptions::from_settings(&settings))
        .register(output)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, LedgerError, StorageError};
    use crate::utils::encoding::from_base64_json;
    use crate::models::envelope::RegistrationEvent;
    use crate::utils::settings::tests::{environment, COMPLETE};
    use async_trait::async_trait;
    use std::cell::RefCell;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Calls {
        ledger: AtomicUsize,
        storage: AtomicUsize,
        submitted: Mutex<Vec<Vec<u8>>>,
        published: Mutex<Vec<Vec<u8>>>,
    }

    struct MockLedger {
        calls: Arc<Calls>,
        fail_create: bool,
    }

    #[async_trait]
    impl LedgerClient for MockLedger {
        async fn create_consensus_topic(&self) -> Result<TopicId, LedgerError> {
            self.calls.ledger.fetch_add(1, Ordering::SeqCst);
            if self.fail_create {
                return Err(LedgerError::Rejected {
                    status: "INSUFFICIENT_PAYER_BALANCE".into(),
                    detail: String::new(),
                });
            }
            Ok(TopicId::new(0, 0, 1234))
        }

        async fn submit_consensus_message(
            &self,
            _topic_id: &TopicId,
            message: &[u8],
        ) -> Result<ReceiptConfirmation, LedgerError> {
            self.calls.ledger.fetch_add(1, Ordering::SeqCst);
            self.calls.submitted.lock().unwrap().push(message.to_vec());
            Ok(ReceiptConfirmation {
                status: "SUCCESS".into(),
                sequence_number: 1,
                transaction_id: None,
            })
        }
    }

    struct MockStorage {
        calls: Arc<Calls>,
        fail: bool,
    }

    #[async_trait]
    impl ContentStore for MockStorage {
        async fn publish(&self, bytes: &[u8], name: &str) -> Result<ContentReference, StorageError> {
            self.calls.storage.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Rejected {
                    status: 401,
                    detail: "bad token".into(),
                });
            }
            self.calls.published.lock().unwrap().push(bytes.to_vec());
            Ok(ContentReference {
                root_cid: "bafyroot".into(),
                name: name.to_string(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingOutput(RefCell<Vec<String>>);

    impl OperatorOutput for RecordingOutput {
        fn report(&self, report: OperatorReport<'_>) {
            self.0
                .borrow_mut()
                .push(crate::services::operator_output::render(&report));
        }
    }

    fn registrar(calls: &Arc<Calls>, fail_create: bool, fail_storage: bool) -> Registrar<MockLedger, MockStorage> {
        Registrar::new(
            MockLedger {
                calls: calls.clone(),
                fail_create,
            },
            MockStorage {
                calls: calls.clone(),
                fail: fail_storage,
            },
            RegistrationOptions::default(),
        )
    }

    #[tokio::test]
    async fn test_happy_path() {
        let calls = Arc::new(Calls::default());
        let output = RecordingOutput::default();
        let outcome = registrar(&calls, false, false).register(&output).await.unwrap();

        assert_eq!(calls.ledger.load(Ordering::SeqCst), 2);
        assert_eq!(calls.storage.load(Ordering::SeqCst), 1);
        assert!(outcome.did.starts_with("did:hedera:testnet:z"));
        assert!(outcome.did.ends_with("_0.0.1234"));
        assert_eq!(outcome.content.cid(), "bafyroot/did-document.json");

        // The published bytes are the document, and the submitted bytes are
        // an envelope that verifies against it.
        let published = calls.published.lock().unwrap()[0].clone();
        let document: DidDocument = serde_json::from_slice(&published).unwrap();
        assert_eq!(document, outcome.document);

        let submitted = calls.submitted.lock().unwrap()[0].clone();
        let envelope = RegistrationEnvelope::from_bytes(&submitted).unwrap();
        assert!(envelope.verify_against_document(&document).is_ok());

        let event: RegistrationEvent = from_base64_json(&envelope.message.event).unwrap();
        assert_eq!(event.did_document.url, "https://ipfs.io/ipfs/bafyroot/did-document.json");
        assert_eq!(event.did_document.id, outcome.did);

        let reports = output.0.borrow();
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0], "The new topic ID is 0.0.1234");
        assert!(reports[4].contains(&outcome.did));
    }

    #[tokio::test]
    async fn test_storage_failure_stops_before_submit() {
        let calls = Arc::new(Calls::default());
        let err = registrar(&calls, false, true)
            .register(&RecordingOutput::default())
            .await
            .unwrap_err();

        assert!(matches!(err, RegistrarError::Storage(StorageError::Rejected { status: 401, .. })));
        assert_eq!(err.exit_code(), 2);
        assert_eq!(calls.ledger.load(Ordering::SeqCst), 1);
        assert!(calls.submitted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_topic_failure_stops_run() {
        let calls = Arc::new(Calls::default());
        let output = RecordingOutput::default();
        let err = registrar(&calls, true, false).register(&output).await.unwrap_err();

        assert!(matches!(err, RegistrarError::Ledger(_)));
        assert_eq!(calls.storage.load(Ordering::SeqCst), 0);
        assert!(output.0.borrow().is_empty());
    }

    #[test]
    fn test_invalid_network_fails_before_ledger() {
        let calls = Arc::new(Calls::default());
        let mut registrar = registrar(&calls, false, false);
        registrar.options.network = "Test:Net".into();

        let err = tokio_test::block_on(registrar.register(&RecordingOutput::default())).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(calls.ledger.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_credentials_make_no_ledger_calls() {
        for dropped in ["MY_ACCOUNT_ID", "MY_PRIVATE_KEY"] {
            let vars: Vec<_> = COMPLETE.iter().copied().filter(|(k, _)| *k != dropped).collect();
            let calls = Arc::new(Calls::default());
            let connected = AtomicUsize::new(0);

            let result = run(
                environment(&vars),
                |_settings| {
                    connected.fetch_add(1, Ordering::SeqCst);
                    Ok((
                        MockLedger { calls: calls.clone(), fail_create: false },
                        MockStorage { calls: calls.clone(), fail: false },
                    ))
                },
                &RecordingOutput::default(),
            )
            .await;

            match result {
                Err(RegistrarError::Configuration(ConfigError::Missing(keys))) => {
                    assert_eq!(keys, vec![dropped])
                }
                other => panic!("expected missing {}, got {:?}", dropped, other.map(|o| o.did)),
            }
            assert_eq!(connected.load(Ordering::SeqCst), 0);
            assert_eq!(calls.ledger.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_invalid_configuration_exits_before_connecting() {
        let mut bad_key = COMPLETE.to_vec();
        bad_key[1] = ("MY_PRIVATE_KEY", "not-a-hex-key");
        let mut bad_network = COMPLETE.to_vec();
        bad_network.push(("HEDERA_NETWORK", "Mainnet"));

        for (vars, key) in [(bad_key, "MY_PRIVATE_KEY"), (bad_network, "HEDERA_NETWORK")] {
            let calls = Arc::new(Calls::default());
            let connected = AtomicUsize::new(0);

            let err = run(
                environment(&vars),
                |_settings| {
                    connected.fetch_add(1, Ordering::SeqCst);
                    Ok((
                        MockLedger { calls: calls.clone(), fail_create: false },
                        MockStorage { calls: calls.clone(), fail: false },
                    ))
                },
                &RecordingOutput::default(),
            )
            .await
            .unwrap_err();

            assert!(
                matches!(err, RegistrarError::Configuration(ConfigError::Invalid { key: k, .. }) if k == key),
                "{:?}",
                err
            );
            assert_eq!(err.exit_code(), 1);
            assert_eq!(connected.load(Ordering::SeqCst), 0);
            assert_eq!(calls.ledger.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_run_uses_configured_options() {
        let mut vars = COMPLETE.to_vec();
        vars.push(("HEDERA_NETWORK", "mainnet"));
        vars.push(("PRIMARY_KEY_ENCODING", "base58"));
        vars.push(("IPFS_GATEWAY_URL", "https://dweb.link/ipfs/"));
        let calls = Arc::new(Calls::default());

        let outcome = run(
            environment(&vars),
            |settings| {
                assert_eq!(settings.storage.token, "token-123");
                Ok((
                    MockLedger { calls: calls.clone(), fail_create: false },
                    MockStorage { calls: calls.clone(), fail: false },
                ))
            },
            &RecordingOutput::default(),
        )
        .await
        .unwrap();

        assert!(outcome.did.starts_with("did:hedera:mainnet:z"));
        assert!(matches!(
            outcome.document.root_key().unwrap().public_key,
            crate::models::did::PublicKeyMaterial::Base58(_)
        ));
        let event: RegistrationEvent = from_base64_json(&outcome.envelope.message.event).unwrap();
        assert!(event.did_document.url.starts_with("https://dweb.link/ipfs/"));
    }
}
