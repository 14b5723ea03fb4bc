//! Raw JSON-RPC client for EVM-compatible nodes.
//!
//! This crate provides [`RpcClient`], a thin JSON-RPC 2.0 transport used by
//! the higher layers of the stress-testing pipeline to talk to a target
//! chain's node directly, without going through `alloy`'s `Provider`
//! abstraction.
//!
//! # Crate Relationships
//!
//! This is a **low-level crate** in the evmstorm stack:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Orchestration (evmstorm)                                │
//! │  └─ runs the batcher and collector against a target node │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Domain crates (accounts, distributor, workload)          │
//! │  └─ use RpcClient for nonces, balances, gas estimation    │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  RPC Layer (rpc-client) ◄── YOU ARE HERE                  │
//! │  └─ Direct JSON-RPC access, single-shot and batched       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use rpc_client::RpcClient;
//!
//! let client = RpcClient::new("http://127.0.0.1:8545")?;
//! let chain_id = client.chain_id().await?;
//! let nonce = client.get_transaction_count(address).await?;
//! ```
//!
//! # Why Not `alloy::providers::Provider`?
//!
//! `Provider` is the right abstraction for application code that issues calls
//! one at a time. This crate exists because the batcher (see the `evmstorm`
//! binary) needs to post one HTTP request containing N independent
//! `eth_sendRawTransaction` calls and get back N responses it can correlate
//! by id — a shape `Provider` doesn't expose. `alloy` is still used
//! throughout for primitives (`Address`, `U256`, `TxHash`, `Bytes`); only the
//! transport is replaced.
//!
//! # Error Handling
//!
//! All operations return [`Result<T>`](error::Result). Errors are categorized
//! for easy handling:
//!
//! ```ignore
//! match client.txpool_status().await {
//!     Ok(status) => { /* success */ }
//!     Err(e) if e.is_method_not_supported() => {
//!         // Fall back to timeout-only pacing
//!     }
//!     Err(e) if e.is_retryable() => {
//!         // Retry after backoff
//!     }
//!     Err(e) => {
//!         // Propagate
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`client`] - The main [`RpcClient`] implementation
//! - [`config`] - Configuration options via [`ClientConfig`]
//! - [`types`] - Request/response types for the JSON-RPC methods this crate speaks
//! - [`error`] - Error types with detailed context

#![warn(missing_docs)]

// ═══════════════════════════════════════════════════════════════════════════════
// MODULES
// ═══════════════════════════════════════════════════════════════════════════════

pub mod client;
pub mod config;
pub mod error;
pub mod types;

// ═══════════════════════════════════════════════════════════════════════════════
// RE-EXPORTS
// ═══════════════════════════════════════════════════════════════════════════════

pub use client::RpcClient;
pub use config::ClientConfig;
pub use error::{Result, RpcError};
pub use types::{
    BlockHeader, CallRequest, JsonRpcRequest, JsonRpcResponse, TransactionReceipt, TxPoolStatus,
};

/// Re-exports of the most commonly used items, for `use rpc_client::prelude::*;`.
pub mod prelude {
    pub use crate::client::RpcClient;
    pub use crate::config::ClientConfig;
    pub use crate::error::{Result, RpcError};
    pub use crate::types::{
        BlockHeader, CallRequest, JsonRpcRequest, JsonRpcResponse, TransactionReceipt, TxPoolStatus,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// CRATE INFO
// ═══════════════════════════════════════════════════════════════════════════════

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns the crate version string.
#[must_use]
pub const fn version() -> &'static str {
    VERSION
}

// ═══════════════════════════════════════════════════════════════════════════════
// TESTS
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!version().is_empty());
        assert!(version().starts_with("0."));
    }

    #[test]
    fn exports_are_available() {
        let _: fn() -> Result<RpcClient> = || RpcClient::new("http://localhost");
        let _: ClientConfig = ClientConfig::default();
    }
}
