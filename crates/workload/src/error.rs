//! Error types for workload construction.

use thiserror::Error;

/// Result type alias using [`WorkloadError`].
pub type Result<T> = std::result::Result<T, WorkloadError>;

/// Errors that can occur initializing or constructing a workload's transactions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WorkloadError {
    /// A contract-requiring method was called before [`initialize`] ran, or
    /// a gas estimate was requested before [`estimate_base_tx`]/[`gas_price`].
    ///
    /// [`initialize`]: crate::Workload::initialize
    /// [`estimate_base_tx`]: crate::Workload::estimate_base_tx
    /// [`gas_price`]: crate::Workload::gas_price
    #[error("workload runtime not initialized: {0}")]
    RuntimeNotInitialized(&'static str),

    /// There were no ready accounts to construct transactions against.
    #[error("no ready accounts available for construction")]
    NoReadyAccounts,

    /// Deploying the mode's contract failed.
    #[error("contract deployment failed: {0}")]
    DeploymentFailed(String),

    /// Signing a constructed transaction failed.
    #[error("transaction signing failed: {0}")]
    Account(#[from] accounts::AccountError),

    /// An RPC call failed during initialization or gas estimation.
    #[error("RPC call failed: {0}")]
    Rpc(#[from] rpc_client::RpcError),
}
