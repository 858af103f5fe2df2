// src/models/mod.rs
//! Data structures shared across the registrar.

pub mod did;
pub mod envelope;
pub mod ledger;
