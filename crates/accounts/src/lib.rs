//! BIP-39/BIP-32 account derivation, EIP-155 signing, and nonce tracking.
//!
//! This crate provides the accounts the stress-testing harness drives
//! transactions from: a single root mnemonic derives the funder account
//! (index 0) and K sub-accounts (indices 1..=K) along `m/44'/60'/0'/0/i`.
//! Each account tracks its own nonce locally and can sign legacy (EIP-155)
//! transactions without another round trip to the node.
//!
//! # Quick Start
//!
//! ```ignore
//! use accounts::AccountSet;
//!
//! let set = AccountSet::derive(mnemonic, k)?;
//! set.init_nonces(&rpc_client, &ready_indices).await?;
//!
//! let raw_tx = set.root().sign_legacy(chain_id, nonce, gas_price, gas_limit, to, value, input)?;
//! ```
//!
//! # Modules
//!
//! - [`keys`] - BIP-39 → BIP-32 derivation via `alloy-signer-local`
//! - [`account`] - [`Account`], a single derived keypair with a nonce counter
//! - [`set`] - [`AccountSet`], the root + sub-account collection
//! - [`error`] - Error types with detailed context

#![warn(missing_docs)]

pub mod account;
pub mod error;
pub mod keys;
pub mod set;

pub use account::Account;
pub use error::{AccountError, Result};
pub use set::AccountSet;

/// Re-exports of the most commonly used items, for `use accounts::prelude::*;`.
pub mod prelude {
    pub use crate::account::Account;
    pub use crate::error::{AccountError, Result};
    pub use crate::set::AccountSet;
}
