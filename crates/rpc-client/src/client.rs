//! Raw JSON-RPC client for EVM nodes.
//!
//! [`RpcClient`] speaks plain JSON-RPC 2.0 over HTTP(S) rather than wrapping
//! `alloy`'s provider abstraction, because the stress-test pipeline needs two
//! things `alloy::providers::Provider` doesn't give directly: (1) posting an
//! arbitrary JSON array of heterogeneous requests in one HTTP call and getting
//! back the matching array of responses (`batch`), and (2) the non-standard
//! `txpool_status` method. Single-shot calls (`estimate_gas`, `gas_price`, …)
//! are implemented against the same raw transport for consistency.
//!
//! # Example
//!
//! ```ignore
//! use rpc_client::RpcClient;
//!
//! let client = RpcClient::new("http://127.0.0.1:8545")?;
//! let chain_id = client.chain_id().await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, Bytes, TxHash, U256};
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{Result, RpcError};
use crate::types::{
    BlockHeader, CallRequest, JsonRpcRequest, JsonRpcResponse, TransactionReceipt, TxPoolStatus,
};

// ═══════════════════════════════════════════════════════════════════════════════
// RPC CLIENT
// ═══════════════════════════════════════════════════════════════════════════════

/// A raw JSON-RPC client for a single EVM node endpoint.
///
/// One pool per target URL; requests share keep-alive connections via the
/// underlying `reqwest::Client`. No explicit rate limiting is applied —
/// callers (the batcher, the collector) are responsible for bounding
/// concurrency themselves.
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: reqwest::Client,
    rpc_url: String,
    request_id: std::sync::Arc<AtomicU64>,
    #[allow(dead_code)]
    config: ClientConfig,
}

impl RpcClient {
    /// Create a new client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(rpc_url: impl Into<String>) -> Result<Self> {
        Self::with_config(rpc_url, ClientConfig::default())
    }

    /// Create a new client with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be constructed.
    pub fn with_config(rpc_url: impl Into<String>, config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RpcError::Connection(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            request_id: std::sync::Arc::new(AtomicU64::new(1)),
            config,
        })
    }

    /// The endpoint URL this client talks to.
    #[must_use]
    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // SINGLE-SHOT METHODS
    // ───────────────────────────────────────────────────────────────────────────

    /// `eth_estimateGas`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self, call))]
    pub async fn estimate_gas(&self, call: &CallRequest) -> Result<U256> {
        self.call("eth_estimateGas", (call, "latest")).await
    }

    /// `eth_gasPrice`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self))]
    pub async fn gas_price(&self) -> Result<U256> {
        self.call("eth_gasPrice", ()).await
    }

    /// `eth_getTransactionCount` at the `"pending"` block tag, i.e. the next
    /// nonce this address may use.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self))]
    pub async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        let hex: String = self.call("eth_getTransactionCount", (address, "pending")).await?;
        Ok(parse_hex_u64(&hex))
    }

    /// `eth_chainId`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self))]
    pub async fn chain_id(&self) -> Result<u64> {
        let hex: String = self.call("eth_chainId", ()).await?;
        Ok(parse_hex_u64(&hex))
    }

    /// `eth_getBalance` at the `"latest"` block tag.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: Address) -> Result<U256> {
        self.call("eth_getBalance", (address, "latest")).await
    }

    /// `eth_call` at the `"latest"` block tag. Used for read-only contract
    /// calls such as ERC-20 `balanceOf`.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self, call))]
    pub async fn eth_call(&self, call: &CallRequest) -> Result<Bytes> {
        let hex: String = self.call("eth_call", (call, "latest")).await?;
        let trimmed = hex.strip_prefix("0x").unwrap_or(&hex);
        let bytes = hex::decode(trimmed)
            .map_err(|e| RpcError::InvalidResponse(format!("eth_call returned non-hex data: {e}")))?;
        Ok(Bytes::from(bytes))
    }

    /// `eth_getBlockByNumber`, with the full-transaction-objects flag set to
    /// `false` (only the count of transactions is needed by the collector).
    ///
    /// # Errors
    ///
    /// Returns an error on network failure, or `Ok(None)` if the block doesn't exist yet.
    #[instrument(skip(self))]
    pub async fn get_block_by_number(&self, number: u64) -> Result<Option<BlockHeader>> {
        let tag = format!("0x{number:x}");
        self.call_optional("eth_getBlockByNumber", (tag, false)).await
    }

    /// `eth_sendRawTransaction`. Returns the transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self, raw_tx))]
    pub async fn send_raw_transaction(&self, raw_tx: &Bytes) -> Result<TxHash> {
        let hex = format!("0x{}", hex::encode(raw_tx.as_ref()));
        self.call("eth_sendRawTransaction", [hex]).await
    }

    /// `eth_getTransactionReceipt`. Returns `None` if the transaction has not
    /// yet been mined.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self))]
    pub async fn get_transaction_receipt(&self, hash: TxHash) -> Result<Option<TransactionReceipt>> {
        self.call_optional("eth_getTransactionReceipt", [hash]).await
    }

    /// Waits for a transaction receipt, polling every 500ms up to `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::Timeout`] if no receipt appears before the deadline,
    /// or a network/RPC error if polling itself fails.
    #[instrument(skip(self))]
    pub async fn wait_for_transaction(
        &self,
        hash: TxHash,
        timeout: std::time::Duration,
    ) -> Result<TransactionReceipt> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(receipt) = self.get_transaction_receipt(hash).await? {
                return Ok(receipt);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(RpcError::Timeout);
            }
            tokio::time::sleep(std::time::Duration::from_millis(500)).await;
        }
    }

    /// Non-standard `txpool_status`. Callers should treat
    /// [`RpcError::MethodNotSupported`] as transient and fall back to
    /// timeout-only pacing.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the node returns a JSON-RPC error.
    #[instrument(skip(self))]
    pub async fn txpool_status(&self) -> Result<TxPoolStatus> {
        self.call("txpool_status", ()).await
    }

    // ───────────────────────────────────────────────────────────────────────────
    // BATCHED REQUESTS
    // ───────────────────────────────────────────────────────────────────────────

    /// Allocate the next `count` ids from this client's monotonically
    /// increasing request-id counter, for batch callers that need to build
    /// requests up front.
    pub fn next_ids(&self, count: usize) -> Vec<u64> {
        (0..count).map(|_| self.next_id()).collect()
    }

    /// Build a batch-ready `eth_sendRawTransaction` request with an explicit id.
    #[must_use]
    pub fn send_raw_transaction_request(id: u64, raw_tx: &Bytes) -> JsonRpcRequest<serde_json::Value> {
        let hex = format!("0x{}", hex::encode(raw_tx.as_ref()));
        JsonRpcRequest::new("eth_sendRawTransaction", serde_json::json!([hex]), id)
    }

    /// Build a batch-ready `eth_getTransactionReceipt` request with an explicit id.
    #[must_use]
    pub fn get_transaction_receipt_request(id: u64, hash: TxHash) -> JsonRpcRequest<serde_json::Value> {
        JsonRpcRequest::new("eth_getTransactionReceipt", serde_json::json!([hash]), id)
    }

    /// Post a single JSON array of heterogeneous requests and return the
    /// responses re-ordered to match the request order by `id`.
    ///
    /// Property checked: `|responses| == |requests|`, and the response at
    /// position `k` in the returned `Vec` corresponds to `requests[k]`'s id —
    /// regardless of what order the server happened to emit them in.
    ///
    /// # Errors
    ///
    /// Returns [`RpcError::BatchMismatch`] if the server dropped or
    /// duplicated ids; a network/serialization error on transport failure.
    #[instrument(skip(self, requests), fields(batch_size = requests.len()))]
    pub async fn batch(
        &self,
        requests: &[JsonRpcRequest<serde_json::Value>],
    ) -> Result<Vec<JsonRpcResponse<serde_json::Value>>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.rpc_url)
            .json(requests)
            .send()
            .await?;

        let raw: Vec<JsonRpcResponse<serde_json::Value>> = response.json().await?;

        if raw.len() != requests.len() {
            warn!(
                sent = requests.len(),
                received = raw.len(),
                "batch response length mismatch"
            );
            return Err(RpcError::BatchMismatch {
                sent: requests.len(),
                received: raw.len(),
            });
        }

        let mut by_id: HashMap<u64, JsonRpcResponse<serde_json::Value>> =
            raw.into_iter().map(|r| (r.id, r)).collect();

        let mut ordered = Vec::with_capacity(requests.len());
        for request in requests {
            let response = by_id.remove(&request.id).ok_or(RpcError::BatchMismatch {
                sent: requests.len(),
                received: ordered.len(),
            })?;
            ordered.push(response);
        }

        debug!(batch_size = ordered.len(), "batch completed");
        Ok(ordered)
    }

    // ───────────────────────────────────────────────────────────────────────────
    // INTERNAL HELPERS
    // ───────────────────────────────────────────────────────────────────────────

    async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        self.call_optional(method, params)
            .await?
            .ok_or_else(|| RpcError::InvalidResponse(format!("missing result for {method}")))
    }

    async fn call_optional<P, R>(&self, method: &str, params: P) -> Result<Option<R>>
    where
        P: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let id = self.next_id();
        let request = JsonRpcRequest::new(method, params, id);

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await?;

        let body: JsonRpcResponse<R> = response.json().await?;

        if let Some(error) = body.error {
            return Err(error.into_error(method));
        }

        Ok(body.result)
    }
}

fn parse_hex_u64(s: &str) -> u64 {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(trimmed, 16).unwrap_or(0)
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn client_creation() {
        let client = RpcClient::new("https://example.com/rpc").expect("client creation failed");
        assert_eq!(client.rpc_url(), "https://example.com/rpc");
    }

    #[tokio::test]
    async fn chain_id_parses_hex_result() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({"method": "eth_chainId"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": "0x1"
            })))
            .mount(&mock_server)
            .await;

        let client = RpcClient::new(mock_server.uri()).expect("client creation failed");
        assert_eq!(client.chain_id().await.expect("chain_id failed"), 1);
    }

    #[tokio::test]
    async fn rpc_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": {"code": -32601, "message": "Method not found"}
            })))
            .mount(&mock_server)
            .await;

        let client = RpcClient::new(mock_server.uri()).expect("client creation failed");
        let err = client.txpool_status().await.unwrap_err();
        assert!(err.is_method_not_supported());
    }

    #[tokio::test]
    async fn batch_reorders_out_of_order_responses() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"jsonrpc": "2.0", "id": 2, "result": "0xbbb"},
                {"jsonrpc": "2.0", "id": 1, "result": "0xaaa"},
            ])))
            .mount(&mock_server)
            .await;

        let client = RpcClient::new(mock_server.uri()).expect("client creation failed");
        let requests = vec![
            JsonRpcRequest::new("eth_getTransactionReceipt", serde_json::json!(["0xaaa"]), 1),
            JsonRpcRequest::new("eth_getTransactionReceipt", serde_json::json!(["0xbbb"]), 2),
        ];

        let responses = client.batch(&requests).await.expect("batch failed");
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, 1);
        assert_eq!(responses[1].id, 2);
    }

    #[tokio::test]
    async fn batch_detects_length_mismatch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"jsonrpc": "2.0", "id": 1, "result": "0xaaa"},
            ])))
            .mount(&mock_server)
            .await;

        let client = RpcClient::new(mock_server.uri()).expect("client creation failed");
        let requests = vec![
            JsonRpcRequest::new("eth_getTransactionReceipt", serde_json::json!(["0xaaa"]), 1),
            JsonRpcRequest::new("eth_getTransactionReceipt", serde_json::json!(["0xbbb"]), 2),
        ];

        let err = client.batch(&requests).await.unwrap_err();
        assert!(matches!(err, RpcError::BatchMismatch { sent: 2, received: 1 }));
    }

    #[tokio::test]
    async fn empty_batch_returns_empty() {
        let client = RpcClient::new("https://example.com/rpc").expect("client creation failed");
        let responses = client.batch(&[]).await.expect("batch failed");
        assert!(responses.is_empty());
    }
}
