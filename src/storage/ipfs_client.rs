// src/storage/ipfs_client.rs
//! IPFS storage client for publishing DID Documents.
//!
//! Talks to any node or pinning service exposing the IPFS HTTP API:
//! - files are added with `wrap-with-directory`, so the document stays
//!   reachable as `<root cid>/<file name>`
//! - files are pinned on upload
//! - requests carry the storage token as a bearer credential
//!
//! # Security Considerations
//! - All stored data is public (IPFS is a public network)
//! - Only the DID Document is uploaded here; key material never is

use crate::error::StorageError;
use crate::storage::{ContentReference, ContentStore};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

/// One line of the newline-delimited JSON returned by `/api/v0/add`.
#[derive(Deserialize, Debug)]
struct AddEntry {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Hash")]
    hash: String,
}

/// IPFS HTTP API client with bearer authentication.
#[derive(Clone)]
pub struct IpfsStorage {
    client: reqwest::Client,
    /// Base URL of the API, e.g. `http://localhost:5001`
    api_url: String,
    token: String,
}

impl IpfsStorage {
    /// Creates a client for the API at `api_url`.
    ///
    /// # Arguments
    /// * `api_url` - Base URL of the IPFS HTTP API (trailing slash optional)
    /// * `token` - Bearer token of the storage account
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be constructed
    pub fn new(api_url: &str, token: &str) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder().build()?;
        Ok(IpfsStorage {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Stores raw binary data in IPFS under `name`.
    ///
    /// # Returns
    /// `Result<ContentReference, StorageError>` where:
    /// - `Ok(reference)` carries the wrapping directory CID and the file name
    /// - `Err` carries the transport error, the rejection, or a malformed reply
    pub async fn store_data(&self, data: &[u8], name: &str) -> Result<ContentReference, StorageError> {
        let url = format!("{}/api/v0/add", self.api_url);
        debug!("uploading {} bytes to {} as {}", data.len(), url, name);

        let part = Part::bytes(data.to_vec()).file_name(name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .query(&[("wrap-with-directory", "true"), ("pin", "true")])
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                detail: body,
            });
        }

        let reference = parse_add_response(&body, name)?;
        info!("published {} as {}", name, reference.cid());
        Ok(reference)
    }
}

#[async_trait]
impl ContentStore for IpfsStorage {
    async fn publish(&self, bytes: &[u8], name: &str) -> Result<ContentReference, StorageError> {
        self.store_data(bytes, name).await
    }
}

/// Extracts the wrapping directory CID from an `/api/v0/add` reply.
///
/// The reply has one entry per added path; the directory entry has an empty
/// name.
fn parse_add_response(body: &str, name: &str) -> Result<ContentReference, StorageError> {
    let mut root = None;
    let mut file_seen = false;

    for line in body.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let entry: AddEntry = serde_json::from_str(line)
            .map_err(|e| StorageError::InvalidResponse(format!("{}: {}", e, line)))?;
        if entry.name.is_empty() {
            root = Some(entry.hash);
        } else if entry.name == name {
            file_seen = true;
        }
    }

    if !file_seen {
        return Err(StorageError::InvalidResponse(format!(
            "{} missing from add response",
            name
        )));
    }

    root.map(|root_cid| ContentReference {
        root_cid,
        name: name.to_string(),
    })
    .ok_or_else(|| StorageError::MissingRoot(name.to_string()))
}
