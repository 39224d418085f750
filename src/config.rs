// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use anyhow::{Context, Result};
use ethereum_types::H160;
use url::Url;

use crate::proofs::evm::parse_address;

/// Pinned historical block all reads are taken at
pub const DEFAULT_BLOCK_NUMBER: u64 = 4_196_648;

const DEFAULT_VOTER: &str = "0x6D603081563784dB3f83ef1F65Cc389D94365Ac9";
const DEFAULT_OUT_PATH: &str = "proofs.json";

/// The token-specific slot declared alongside the balance slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraSlot {
    /// Staked-token exchange rate, read at a fixed slot
    ExchangeRate(u64),
    /// Delegation balance mapping keyed by the voter
    DelegationBalance(u64),
    /// Two-level representatives mapping keyed by (voter, chain id)
    Representatives(u64),
}

/// Declared storage layout of one target contract
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// Logical name keying the bundle in the result document
    pub name: String,
    pub address: String,
    pub balance_slot: Option<u64>,
    pub extra: Option<ExtraSlot>,
}

impl TokenConfig {
    fn new(name: &str, address: &str, balance_slot: Option<u64>, extra: Option<ExtraSlot>) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
            balance_slot,
            extra,
        }
    }
}

/// Run configuration: the RPC endpoint comes from the environment, the
/// remaining surface is the declared per-contract layout.
#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_url: Url,
    pub out_path: PathBuf,
    pub block_number: u64,
    pub voter: H160,
    pub proposal_creator: H160,
    /// Inner key of the two-level representatives mapping
    pub representative_chain_id: u64,
    /// Governed tokens, in persisted order
    pub tokens: Vec<TokenConfig>,
    pub governance: TokenConfig,
}

impl Config {
    /// Build the configuration from the environment and built-in defaults
    pub fn from_env() -> Result<Self> {
        let rpc_url = std::env::var("RPC_URL").context("RPC_URL must be set")?;
        let rpc_url = Url::parse(&rpc_url).context("RPC_URL is not a valid URL")?;
        let out_path = std::env::var("PROOFS_OUT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_OUT_PATH));

        let voter = parse_address(DEFAULT_VOTER)?;

        Ok(Self {
            rpc_url,
            out_path,
            block_number: DEFAULT_BLOCK_NUMBER,
            voter,
            proposal_creator: voter,
            representative_chain_id: 31337,
            tokens: vec![
                TokenConfig::new(
                    "VOTING_TOKEN",
                    "0x64033B2270fd9D6bbFc35736d2aC812942cE75fE",
                    Some(0),
                    None,
                ),
                TokenConfig::new(
                    "WRAPPED_TOKEN",
                    "0x7d9EB767eEc260d1bCe8C518276a894aE5535F04",
                    Some(52),
                    Some(ExtraSlot::DelegationBalance(64)),
                ),
                TokenConfig::new(
                    "STAKED_TOKEN",
                    "0xA4FDAbdE9eF3045F0dcF9221bab436B784B7e42D",
                    Some(0),
                    Some(ExtraSlot::ExchangeRate(81)),
                ),
            ],
            governance: TokenConfig::new(
                "REPRESENTATIVES",
                "0x84b3FE5eD74caC496BcB58d448A7c83c523F6E0E",
                None,
                Some(ExtraSlot::Representatives(9)),
            ),
        })
    }
}
