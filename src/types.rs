// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// `eth_getProof` response (EIP-1186)
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProofResponse {
    pub address: String,
    /// Trie nodes from the state root to the account leaf, root first
    pub account_proof: Vec<String>,
    pub balance: String,
    pub code_hash: String,
    pub nonce: String,
    pub storage_hash: String,
    pub storage_proof: Vec<StorageEntry>,
}

/// Per-slot entry of an `eth_getProof` response
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StorageEntry {
    pub key: String,
    pub value: String,
    /// Trie nodes from the storage root to the slot leaf, root first
    pub proof: Vec<String>,
}

/// `eth_getBlockByNumber` header fields consumed by the encoder.
///
/// `baseFeePerGas` and `withdrawalsRoot` are required: the fixed header
/// encoding is only valid for blocks that carry both, so earlier-format
/// headers fail here instead of encoding wrongly.
#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RpcBlock {
    pub hash: String,
    pub parent_hash: String,
    pub sha3_uncles: String,
    pub miner: String,
    pub state_root: String,
    pub transactions_root: String,
    pub receipts_root: String,
    pub logs_bloom: String,
    pub difficulty: String,
    pub number: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub timestamp: String,
    pub extra_data: String,
    pub mix_hash: String,
    pub nonce: String,
    pub base_fee_per_gas: String,
    pub withdrawals_root: String,
}
