// src/main.rs

//! # DID Registrar - Main Entry Point
//!
//! Registers one `did:hedera` identifier and exits. Takes no arguments; all
//! configuration comes from the environment (see [`did_registrar::utils::settings`]).
//!
//! ## Exit Codes
//! - `0`: registration accepted by the ledger
//! - `1`: missing or invalid configuration (no network call was made)
//! - `2`: the ledger or the storage service failed
//! - `3`: local key generation, encoding or signing failure

use config::Environment;
use did_registrar::blockchain::hedera_client::HederaClient;
use did_registrar::services::operator_output::ConsoleOutput;
use did_registrar::services::registrar::run;
use did_registrar::storage::ipfs_client::IpfsStorage;
use dotenv::dotenv;
use log::{error, info};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load environment variables from .env file
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = run(
        Environment::default(),
        |settings| {
            let ledger = HederaClient::new(&settings.ledger)?;
            let storage = IpfsStorage::new(&settings.storage.api_url, &settings.storage.token)?;
            Ok((ledger, storage))
        },
        &ConsoleOutput,
    )
    .await;

    match result {
        Ok(outcome) => {
            info!(
                "{} registered on topic {} (sequence number {})",
                outcome.did, outcome.topic_id, outcome.receipt.sequence_number
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code();
            error!("{:#}", anyhow::Error::new(err).context("DID registration failed"));
            ExitCode::from(code)
        }
    }
}
