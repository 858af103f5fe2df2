// src/bin/make_topic.rs

//! Creates one consensus topic with the configured operator and prints its id.
//!
//! Needs only `MY_ACCOUNT_ID` and `MY_PRIVATE_KEY`.

use config::Environment;
use did_registrar::blockchain::hedera_client::HederaClient;
use did_registrar::blockchain::LedgerClient;
use did_registrar::error::RegistrarError;
use did_registrar::models::ledger::TopicId;
use did_registrar::services::operator_output::{ConsoleOutput, OperatorOutput, OperatorReport};
use did_registrar::utils::settings::Settings;
use dotenv::dotenv;
use log::error;
use std::process::ExitCode;

async fn make_topic() -> Result<TopicId, RegistrarError> {
    let settings = Settings::load_ledger(Environment::default())?;
    let client = HederaClient::new(&settings)?;
    Ok(client.create_consensus_topic().await?)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match make_topic().await {
        Ok(topic_id) => {
            ConsoleOutput.report(OperatorReport::TopicCreated(&topic_id));
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code();
            error!("{:#}", anyhow::Error::new(err).context("topic creation failed"));
            ExitCode::from(code)
        }
    }
}
