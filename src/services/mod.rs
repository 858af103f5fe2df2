// src/services/mod.rs
//! Registration logic: document building, envelope signing and the
//! orchestrator that drives the external clients.

pub mod did_builder;
pub mod envelope_signer;
pub mod operator_output;
pub mod registrar;
