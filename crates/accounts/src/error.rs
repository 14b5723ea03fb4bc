//! Error types for key derivation, signing, and nonce tracking.
//!
//! - [`AccountError`] - The primary error type for all operations in this crate
//!
//! # Error Philosophy
//!
//! These errors are designed to be:
//! - **Actionable**: Each variant tells you what went wrong
//! - **Convertible**: Easy to fold into the binary's top-level error type
//! - **Specific**: Derivation, signing, and RPC failures are distinguished so
//!   callers (the engine) can decide what's fatal and what's skippable.

use thiserror::Error;

/// Result type alias using [`AccountError`].
pub type Result<T> = std::result::Result<T, AccountError>;

/// Errors that can occur deriving accounts, signing transactions, or
/// tracking nonces.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Derivation | `InvalidMnemonic`, `DerivationFailed` | Bad phrase or index |
/// | Signing | `SigningFailed` | Key/transaction mismatch |
/// | Nonce | `NonceSourceUnavailable` | RPC error fetching a starting nonce |
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AccountError {
    /// The supplied BIP-39 mnemonic phrase could not be parsed.
    #[error("invalid mnemonic phrase: {0}")]
    InvalidMnemonic(String),

    /// BIP-32 derivation failed for the given index.
    #[error("key derivation failed at index {index}: {reason}")]
    DerivationFailed {
        /// The derivation index that failed.
        index: u32,
        /// The underlying reason.
        reason: String,
    },

    /// Signing a transaction with the account's key failed.
    #[error("transaction signing failed: {0}")]
    SigningFailed(String),

    /// Fetching the starting nonce for an account from the chain failed.
    #[error("nonce source unavailable for account {index}: {source}")]
    NonceSourceUnavailable {
        /// The account index whose nonce fetch failed.
        index: u32,
        /// The underlying RPC error.
        #[source]
        source: rpc_client::RpcError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = AccountError::DerivationFailed {
            index: 3,
            reason: "bad seed".into(),
        };
        assert!(err.to_string().contains('3'));
    }
}
