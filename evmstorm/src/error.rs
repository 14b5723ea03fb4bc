//! Top-level error types for the evmstorm run.
//!
//! Library crates each carry their own `#[non_exhaustive]` error enum
//! (`rpc_client::RpcError`, `accounts::AccountError`, …); this module adds
//! only the errors that belong to orchestration itself and folds everything
//! else in via `#[from]`. `main` surfaces the result through
//! `anyhow::Result<()>` with `.context(...)` at each boundary.

use alloy::primitives::TxHash;
use thiserror::Error;

/// Result type alias using [`RunError`].
pub type Result<T> = std::result::Result<T, RunError>;

/// Errors that can abort a run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RunError {
    /// A transaction was mined but reverted (`status == 0x0`). Fatal per
    /// the source's semantics: the collector stops rather than report
    /// statistics built on a run that didn't execute cleanly.
    #[error("transaction {0} reverted on-chain")]
    TransactionExecutionFailed(TxHash),

    /// Pre-funding failed (native or token).
    #[error(transparent)]
    Distributor(#[from] distributor::DistributorError),

    /// Workload construction/initialization failed.
    #[error(transparent)]
    Workload(#[from] workload::WorkloadError),

    /// Account derivation, signing, or nonce-fetch failed.
    #[error(transparent)]
    Account(#[from] accounts::AccountError),

    /// A required RPC call failed outside the tolerant batcher/collector paths.
    #[error(transparent)]
    Rpc(#[from] rpc_client::RpcError),

    /// CLI configuration was invalid before any network I/O happened.
    #[error("invalid configuration: {0}")]
    Config(String),
}
