// src/storage/mod.rs
//! Content-addressed storage for published DID Documents.

pub mod ipfs_client;

use crate::error::StorageError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default public gateway used to build resolvable document URLs.
pub const DEFAULT_IPFS_GATEWAY: &str = "https://ipfs.io/ipfs/";

/// Location of a published file: the root CID of its wrapping directory plus
/// the file name inside it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ContentReference {
    pub root_cid: String,
    pub name: String,
}

impl ContentReference {
    /// `<root cid>/<name>`, the path recorded in the registration event.
    pub fn cid(&self) -> String {
        format!("{}/{}", self.root_cid, self.name)
    }

    /// Gateway URL for the file. `gateway` is used as a plain prefix.
    pub fn resolvable_url(&self, gateway: &str) -> String {
        format!("{}{}", gateway, self.cid())
    }
}

/// A content-addressed store that can publish named files.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Publishes `bytes` under `name` and returns where they can be found.
    async fn publish(&self, bytes: &[u8], name: &str) -> Result<ContentReference, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_paths() {
        let reference = ContentReference {
            root_cid: "bafybeigdyrzt".into(),
            name: "did-document.json".into(),
        };
        assert_eq!(reference.cid(), "bafybeigdyrzt/did-document.json");
        assert_eq!(
            reference.resolvable_url(DEFAULT_IPFS_GATEWAY),
            "https://ipfs.io/ipfs/bafybeigdyrzt/did-document.json"
        );
    }
}
