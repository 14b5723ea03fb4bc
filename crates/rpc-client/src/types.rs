//! Request/response envelope and domain types for the JSON-RPC methods this
//! crate speaks: `eth_estimateGas`, `eth_gasPrice`, `eth_getTransactionCount`,
//! `eth_chainId`, `eth_sendRawTransaction`, `eth_getTransactionReceipt`,
//! `eth_getBlockByNumber`, and the non-standard `txpool_status`.

use alloy::primitives::{Address, Bytes, TxHash, U256};
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// JSON-RPC ENVELOPE
// ═══════════════════════════════════════════════════════════════════════════════

/// A single JSON-RPC 2.0 request.
#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<P: Serialize> {
    /// Always `"2.0"`.
    pub jsonrpc: &'static str,
    /// RPC method name, e.g. `"eth_sendRawTransaction"`.
    pub method: String,
    /// Positional parameters.
    pub params: P,
    /// Request id, echoed back by the server so batched responses can be
    /// correlated with the request that produced them.
    pub id: u64,
}

impl<P: Serialize> JsonRpcRequest<P> {
    /// Build a new request with the given method, params, and id.
    pub fn new(method: impl Into<String>, params: P, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// A single JSON-RPC 2.0 response.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse<T> {
    /// Echoed request id; used to correlate batch responses with requests.
    pub id: u64,
    /// The result payload, present on success.
    #[serde(default)]
    pub result: Option<T>,
    /// The error payload, present on failure.
    #[serde(default)]
    pub error: Option<crate::error::RpcErrorDetail>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DOMAIN TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Minimal call description used for `eth_estimateGas`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    /// Sender address.
    pub from: Address,
    /// Recipient address (`None` for contract creation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<Address>,
    /// Native value to transfer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    /// Calldata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

/// Result of `txpool_status`: pending and queued transaction counts.
///
/// Nodes disagree on whether these are returned as JSON numbers or as hex
/// strings (`"0x0"`); this type accepts both, treating the hex-string form
/// as canonical since it matches the broader `eth_*` convention of encoding
/// quantities as hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxPoolStatus {
    /// Number of transactions ready for inclusion.
    pub pending: u64,
    /// Number of transactions waiting on a nonce gap.
    pub queued: u64,
}

impl TxPoolStatus {
    /// `true` once both `pending` and `queued` have drained to zero.
    #[must_use]
    pub const fn is_drained(&self) -> bool {
        self.pending == 0 && self.queued == 0
    }
}

impl<'de> Deserialize<'de> for TxPoolStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            pending: serde_json::Value,
            queued: serde_json::Value,
        }

        let raw = Raw::deserialize(deserializer)?;
        Ok(Self {
            pending: parse_quantity(&raw.pending),
            queued: parse_quantity(&raw.queued),
        })
    }
}

/// Parse a JSON-RPC "quantity" that may appear as a hex string or a number.
fn parse_quantity(value: &serde_json::Value) -> u64 {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.strip_prefix("0x").unwrap_or(s);
            u64::from_str_radix(trimmed, 16).unwrap_or(0)
        }
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

/// A minimal view of `eth_getBlockByNumber`'s result — just the fields the
/// collector needs to compute throughput and gas utilization.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockHeader {
    /// Block number (hex string).
    pub number: String,
    /// Block timestamp, Unix seconds (hex string).
    pub timestamp: String,
    /// Gas used by the block (hex string).
    pub gas_used: String,
    /// Gas limit of the block (hex string).
    pub gas_limit: String,
    /// Transaction hashes or objects included in the block; only the count matters here.
    #[serde(default)]
    pub transactions: Vec<serde_json::Value>,
}

impl BlockHeader {
    /// Parsed block number.
    #[must_use]
    pub fn number_u64(&self) -> u64 {
        parse_hex_u64(&self.number)
    }

    /// Parsed Unix timestamp.
    #[must_use]
    pub fn timestamp_u64(&self) -> u64 {
        parse_hex_u64(&self.timestamp)
    }

    /// Parsed gas used.
    #[must_use]
    pub fn gas_used_u64(&self) -> u64 {
        parse_hex_u64(&self.gas_used)
    }

    /// Parsed gas limit.
    #[must_use]
    pub fn gas_limit_u64(&self) -> u64 {
        parse_hex_u64(&self.gas_limit)
    }

    /// Number of transactions in the block.
    #[must_use]
    pub fn tx_count(&self) -> usize {
        self.transactions.len()
    }
}

fn parse_hex_u64(s: &str) -> u64 {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    u64::from_str_radix(trimmed, 16).unwrap_or(0)
}

/// A minimal view of `eth_getTransactionReceipt`'s result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    /// Transaction hash.
    pub transaction_hash: TxHash,
    /// Block number the transaction was included in (hex string).
    pub block_number: String,
    /// Execution status: `"0x1"` success, `"0x0"` failure.
    pub status: String,
    /// Address of the contract created by this transaction, if it was a
    /// contract-creation transaction.
    #[serde(default)]
    pub contract_address: Option<Address>,
}

impl TransactionReceipt {
    /// Parsed block number.
    #[must_use]
    pub fn block_number_u64(&self) -> u64 {
        parse_hex_u64(&self.block_number)
    }

    /// `true` if the transaction executed successfully (`status == "0x1"`).
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == "0x1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txpool_status_accepts_hex_strings() {
        let json = r#"{"pending": "0x5", "queued": "0x0"}"#;
        let status: TxPoolStatus = serde_json::from_str(json).expect("parse failed");
        assert_eq!(status.pending, 5);
        assert_eq!(status.queued, 0);
        assert!(!status.is_drained());
    }

    #[test]
    fn txpool_status_accepts_numbers() {
        let json = r#"{"pending": 0, "queued": 0}"#;
        let status: TxPoolStatus = serde_json::from_str(json).expect("parse failed");
        assert!(status.is_drained());
    }

    #[test]
    fn block_header_parses_hex_fields() {
        let json = r#"{
            "number": "0x10",
            "timestamp": "0x64d9f000",
            "gasUsed": "0x5208",
            "gasLimit": "0x1c9c380",
            "transactions": ["0xaaa", "0xbbb"]
        }"#;
        let header: BlockHeader = serde_json::from_str(json).expect("parse failed");
        assert_eq!(header.number_u64(), 16);
        assert_eq!(header.gas_used_u64(), 21_000);
        assert_eq!(header.tx_count(), 2);
    }

    #[test]
    fn receipt_status_detection() {
        let json = r#"{
            "transactionHash": "0x0000000000000000000000000000000000000000000000000000000000000001",
            "blockNumber": "0x1",
            "status": "0x0"
        }"#;
        let receipt: TransactionReceipt = serde_json::from_str(json).expect("parse failed");
        assert!(!receipt.succeeded());
        assert_eq!(receipt.block_number_u64(), 1);
    }
}
