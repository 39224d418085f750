// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

pub mod client;
pub mod config;
pub mod proofs;
pub mod types;

// Re-export main entry points
pub use client::EthClient;
pub use config::{Config, ExtraSlot, TokenConfig};
pub use proofs::{
    LoadResult, MappingLayout, ProofAssembler, ProofBundle, ProofError, ProofResult, ProofStore,
    ResultSet,
};
