// src/lib.rs

//! # Hedera DID Registrar
//!
//! Registers a `did:hedera` identifier anchored to a fresh consensus topic.
//!
//! ## Architecture Overview
//! 1. **Blockchain Layer**: `HederaClient` creates topics and submits messages
//! 2. **Storage Layer**: IPFS for the published DID Document
//! 3. **Wallet Layer**: Ed25519 and BLS12-381 G2 key generation
//! 4. **Services Layer**: document builder, envelope signer and registrar
//!
//! Errors are collected in [`error`]; configuration lives in
//! [`utils::settings`].

pub mod blockchain;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
pub mod wallet;
