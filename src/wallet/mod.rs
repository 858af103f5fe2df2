// src/wallet/mod.rs
//! Key material for newly registered identities.

pub mod key_management;
