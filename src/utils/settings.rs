// src/utils/settings.rs
//! Runtime configuration read from the process environment.
//!
//! ## Environment Variables
//! - `MY_ACCOUNT_ID`: ledger operator account (`shard.realm.num`), required
//! - `MY_PRIVATE_KEY`: ledger operator Ed25519 key (hex), required
//! - `WEB3_API_TOKEN`: storage API token, required for registration
//! - `HEDERA_NETWORK`: (Optional) network name (default: testnet)
//! - `LEDGER_API_URL`: (Optional) consensus gateway URL (default: http://localhost:8080)
//! - `LEDGER_MAX_FEE_TINYBARS`: (Optional) max fee per transaction (default: 1 hbar)
//! - `IPFS_API_URL`: (Optional) IPFS HTTP API URL (default: http://localhost:5001)
//! - `IPFS_GATEWAY_URL`: (Optional) gateway prefix for document URLs (default: https://ipfs.io/ipfs/)
//! - `PRIMARY_KEY_ENCODING`: (Optional) `multibase` or `base58` (default: multibase)
//!
//! Settings are validated eagerly, before any client is constructed: the
//! operator key must decode and the network name must be usable in a DID.

use crate::blockchain::hedera_client::parse_operator_key;
use crate::error::ConfigError;
use crate::models::did::validate_network;
use crate::models::ledger::AccountId;
use crate::services::did_builder::{PrimaryKeyEncoding, DEFAULT_NETWORK};
use crate::storage::DEFAULT_IPFS_GATEWAY;
use config::{Config, Environment};
use serde::Deserialize;
use std::fmt;

pub const ACCOUNT_ID_VAR: &str = "MY_ACCOUNT_ID";
pub const PRIVATE_KEY_VAR: &str = "MY_PRIVATE_KEY";
pub const STORAGE_TOKEN_VAR: &str = "WEB3_API_TOKEN";
pub const NETWORK_VAR: &str = "HEDERA_NETWORK";

pub const DEFAULT_LEDGER_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_IPFS_API_URL: &str = "http://localhost:5001";
/// One hbar, in tinybars.
pub const DEFAULT_MAX_TRANSACTION_FEE: u64 = 100_000_000;

/// Environment values as read, before validation. Keys are the lowercased
/// variable names.
#[derive(Deserialize, Default, Debug)]
struct RawSettings {
    my_account_id: Option<String>,
    my_private_key: Option<String>,
    web3_api_token: Option<String>,
    hedera_network: Option<String>,
    ledger_api_url: Option<String>,
    ledger_max_fee_tinybars: Option<String>,
    ipfs_api_url: Option<String>,
    ipfs_gateway_url: Option<String>,
    primary_key_encoding: Option<String>,
}

/// Ledger operator and endpoint configuration.
#[derive(Clone)]
pub struct LedgerSettings {
    pub account_id: AccountId,
    /// Hex-encoded operator key. Decoded by the ledger client.
    pub private_key: String,
    pub network: String,
    pub api_url: String,
    pub max_transaction_fee: u64,
}

impl fmt::Debug for LedgerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LedgerSettings")
            .field("account_id", &self.account_id)
            .field("private_key", &"<redacted>")
            .field("network", &self.network)
            .field("api_url", &self.api_url)
            .field("max_transaction_fee", &self.max_transaction_fee)
            .finish()
    }
}

/// Content-addressed storage configuration.
#[derive(Clone)]
pub struct StorageSettings {
    pub api_url: String,
    pub token: String,
    pub gateway_url: String,
}

impl fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageSettings")
            .field("api_url", &self.api_url)
            .field("token", &"<redacted>")
            .field("gateway_url", &self.gateway_url)
            .finish()
    }
}

/// Everything a registration run needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub ledger: LedgerSettings,
    pub storage: StorageSettings,
    pub key_encoding: PrimaryKeyEncoding,
}

impl Settings {
    /// Reads the full registration settings from `source`.
    ///
    /// # Errors
    /// - [`ConfigError::Missing`] listing every absent required variable
    /// - [`ConfigError::Invalid`] for the first malformed value
    pub fn load(source: Environment) -> Result<Self, ConfigError> {
        let mut raw = read_raw(source)?;
        let mut missing = Vec::new();
        let account_id = required(raw.my_account_id.take(), ACCOUNT_ID_VAR, &mut missing);
        let private_key = required(raw.my_private_key.take(), PRIVATE_KEY_VAR, &mut missing);
        let token = required(raw.web3_api_token.take(), STORAGE_TOKEN_VAR, &mut missing);

        match (account_id, private_key, token) {
            (Some(account_id), Some(private_key), Some(token)) => {
                let ledger = ledger_settings(&mut raw, &account_id, private_key)?;
                let key_encoding = match raw.primary_key_encoding.as_deref().map(str::trim) {
                    None | Some("") => PrimaryKeyEncoding::default(),
                    Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                        key: "PRIMARY_KEY_ENCODING",
                        reason,
                    })?,
                };
                Ok(Settings {
                    ledger,
                    storage: StorageSettings {
                        api_url: or_default(raw.ipfs_api_url, DEFAULT_IPFS_API_URL),
                        token,
                        gateway_url: or_default(raw.ipfs_gateway_url, DEFAULT_IPFS_GATEWAY),
                    },
                    key_encoding,
                })
            }
            _ => Err(ConfigError::Missing(missing)),
        }
    }

    /// Reads only the ledger settings, for tools that never touch storage.
    pub fn load_ledger(source: Environment) -> Result<LedgerSettings, ConfigError> {
        let mut raw = read_raw(source)?;
        let mut missing = Vec::new();
        let account_id = required(raw.my_account_id.take(), ACCOUNT_ID_VAR, &mut missing);
        let private_key = required(raw.my_private_key.take(), PRIVATE_KEY_VAR, &mut missing);

        match (account_id, private_key) {
            (Some(account_id), Some(private_key)) => {
                ledger_settings(&mut raw, &account_id, private_key)
            }
            _ => Err(ConfigError::Missing(missing)),
        }
    }

}

fn read_raw(source: Environment) -> Result<RawSettings, ConfigError> {
    let raw = Config::builder()
        .add_source(source.ignore_empty(true))
        .build()?
        .try_deserialize::<RawSettings>()?;
    Ok(raw)
}

fn required(
    value: Option<String>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Some(v),
        _ => {
            missing.push(key);
            None
        }
    }
}

fn or_default(value: Option<String>, default: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn ledger_settings(
    raw: &mut RawSettings,
    account_id: &str,
    private_key: String,
) -> Result<LedgerSettings, ConfigError> {
    let account_id = AccountId::parse(account_id).ok_or_else(|| ConfigError::Invalid {
        key: ACCOUNT_ID_VAR,
        reason: format!("{:?} is not shard.realm.num", account_id),
    })?;

    parse_operator_key(&private_key).map_err(|e| ConfigError::Invalid {
        key: PRIVATE_KEY_VAR,
        reason: e.to_string(),
    })?;

    let network = or_default(raw.hedera_network.take(), DEFAULT_NETWORK);
    validate_network(&network).map_err(|e| ConfigError::Invalid {
        key: NETWORK_VAR,
        reason: e.to_string(),
    })?;

    let max_transaction_fee = match raw.ledger_max_fee_tinybars.take() {
        None => DEFAULT_MAX_TRANSACTION_FEE,
        Some(value) => value.trim().parse().map_err(|e| ConfigError::Invalid {
            key: "LEDGER_MAX_FEE_TINYBARS",
            reason: format!("{}", e),
        })?,
    };

    Ok(LedgerSettings {
        account_id,
        private_key,
        network,
        api_url: or_default(raw.ledger_api_url.take(), DEFAULT_LEDGER_API_URL),
        max_transaction_fee,
    })
}
