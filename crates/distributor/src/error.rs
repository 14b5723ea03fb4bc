//! Error types for pre-run funding.

use thiserror::Error;

/// Result type alias using [`DistributorError`].
pub type Result<T> = std::result::Result<T, DistributorError>;

/// Errors that can occur while pre-funding sub-accounts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DistributorError {
    /// The root account cannot cover even a single sub-account's shortfall
    /// plus the estimated cost of the distribution transaction itself.
    #[error(
        "insufficient funds: root balance {root_balance} cannot cover any of {shortfall_count} \
         outstanding shortfalls (distribution tx cost ~{distribution_cost})"
    )]
    InsufficientFunds {
        /// The root account's balance at the time funding was attempted.
        root_balance: alloy::primitives::U256,
        /// Estimated gas cost of one distribution transaction, in wei.
        distribution_cost: alloy::primitives::U256,
        /// Number of sub-accounts that had a non-zero shortfall.
        shortfall_count: usize,
    },

    /// A distribution transfer's gas estimate came back unusable (zero or
    /// overflowing the funding arithmetic).
    #[error("distribution gas estimate was unusable: {0}")]
    UnusableGasEstimate(String),

    /// An RPC call failed while checking balances or submitting a transfer.
    #[error("RPC call failed during distribution: {0}")]
    Rpc(#[from] rpc_client::RpcError),

    /// Signing a distribution transaction failed.
    #[error("signing a distribution transaction failed: {0}")]
    Account(#[from] accounts::AccountError),

    /// A distribution transaction was mined but reverted.
    #[error("distribution transaction to account {index} reverted")]
    TransferReverted {
        /// The sub-account index that failed to receive funding.
        index: u32,
    },
}
