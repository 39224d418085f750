// Copyright 2022-2024 Protocol Labs
// SPDX-License-Identifier: MIT

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::time::Duration;
use url::Url;

use crate::types::{ProofResponse, RpcBlock};

/// Request timeout of the RPC client
const DEFAULT_REQ_TIMEOUT: Duration = Duration::from_secs(250);

/// A simple Ethereum JSON-RPC client
#[derive(Clone)]
pub struct EthClient {
    http_client: reqwest::Client,
    url: Url,
    bearer_token: Option<String>,
}

impl EthClient {
    /// Creates a new client that sends requests to `url`
    pub fn new(url: Url, bearer_token: Option<&str>) -> Self {
        Self {
            http_client: reqwest::Client::default(),
            url,
            bearer_token: bearer_token.map(String::from),
        }
    }

    /// Account and storage proofs for `address` at a pinned block
    pub async fn get_proof(
        &self,
        address: &str,
        storage_keys: &[String],
        block_number: u64,
    ) -> Result<ProofResponse> {
        let r = self
            .request::<ProofResponse>(
                "eth_getProof",
                json!([address, storage_keys, block_tag(block_number)]),
            )
            .await?;
        tracing::debug!("received eth_getProof response: {r:?}");
        Ok(r)
    }

    /// Header of the pinned block, without transaction bodies
    pub async fn get_block_by_number(&self, block_number: u64) -> Result<RpcBlock> {
        let r = self
            .request::<RpcBlock>("eth_getBlockByNumber", json!([block_tag(block_number), false]))
            .await?;
        tracing::debug!("received eth_getBlockByNumber response: {r:?}");
        Ok(r)
    }

    /// Raw 32-byte value of `slot` at a pinned block
    pub async fn get_storage_at(
        &self,
        address: &str,
        slot: &str,
        block_number: u64,
    ) -> Result<String> {
        let r = self
            .request::<String>(
                "eth_getStorageAt",
                json!([address, slot, block_tag(block_number)]),
            )
            .await?;
        tracing::debug!("received eth_getStorageAt response: {r:?}");
        Ok(r)
    }

    /// Read-only contract call at a pinned block
    pub async fn call(&self, to: &str, data: &str, block_number: u64) -> Result<String> {
        let r = self
            .request::<String>(
                "eth_call",
                json!([{ "to": to, "data": data }, block_tag(block_number)]),
            )
            .await?;
        tracing::debug!("received eth_call response: {r:?}");
        Ok(r)
    }

    /// Make a generic RPC request
    pub async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let request_body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });

        tracing::debug!("{} request: {}", method, request_body);

        let mut builder = self.http_client.post(self.url.as_str()).json(&request_body);
        builder = builder.timeout(DEFAULT_REQ_TIMEOUT);

        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let response_body = response.text().await?;
        tracing::debug!("{} raw response: {}", method, response_body);

        // Parse the JSON-RPC response
        let value: serde_json::Value = serde_json::from_str(&response_body)?;

        if let Some(result) = value.get("result") {
            let data: T = serde_json::from_value(result.clone())?;
            Ok(data)
        } else if let Some(error) = value.get("error") {
            let error_msg = error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");
            anyhow::bail!("{} RPC error: {}", method, error_msg);
        } else {
            anyhow::bail!("{} response has neither result nor error", method);
        }
    }
}

/// Hex block tag for a pinned historical block number
pub fn block_tag(block_number: u64) -> String {
    format!("0x{block_number:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tags_are_compact_hex() {
        assert_eq!(block_tag(4_196_648), "0x400928");
        assert_eq!(block_tag(0), "0x0");
    }
}
