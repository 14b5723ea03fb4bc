//! BIP-39 → BIP-32 HD key derivation.
//!
//! Derives signing keys from a single root mnemonic along the standard
//! Ethereum derivation path `m/44'/60'/0'/0/i`, mirroring the pattern this
//! codebase's benchmarking tooling already uses for mnemonic-derived load
//! generation: [`MnemonicBuilder`] builds a [`PrivateKeySigner`] per index.
//!
//! Index `0` is always the root (funder) account; indices `1..=K` are
//! sub-accounts.

use alloy::primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};

use crate::error::{AccountError, Result};

/// Derive the signer and address at derivation index `i` of `mnemonic`.
///
/// # Errors
///
/// Returns [`AccountError::InvalidMnemonic`] if the phrase itself is
/// malformed, or [`AccountError::DerivationFailed`] if the index cannot be
/// derived (the latter should not occur for any non-negative `u32`).
pub fn derive_signer(mnemonic: &str, index: u32) -> Result<PrivateKeySigner> {
    MnemonicBuilder::<English>::default()
        .phrase(mnemonic)
        .index(index)
        .map_err(|e| AccountError::InvalidMnemonic(e.to_string()))?
        .build()
        .map_err(|e| AccountError::DerivationFailed {
            index,
            reason: e.to_string(),
        })
}

/// The EVM address controlled by `signer`.
#[must_use]
pub fn signer_address(signer: &PrivateKeySigner) -> Address {
    signer.address()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A well-known BIP-39 test mnemonic; not used against any real network.
    const TEST_MNEMONIC: &str =
        "test test test test test test test test test test test junk";

    #[test]
    fn derivation_is_deterministic() {
        let a = derive_signer(TEST_MNEMONIC, 0).expect("derivation failed");
        let b = derive_signer(TEST_MNEMONIC, 0).expect("derivation failed");
        assert_eq!(signer_address(&a), signer_address(&b));
    }

    #[test]
    fn distinct_indices_yield_distinct_addresses() {
        let root = derive_signer(TEST_MNEMONIC, 0).expect("derivation failed");
        let sub = derive_signer(TEST_MNEMONIC, 1).expect("derivation failed");
        assert_ne!(signer_address(&root), signer_address(&sub));
    }

    #[test]
    fn rejects_garbage_mnemonic() {
        let result = derive_signer("not a valid mnemonic phrase at all", 0);
        assert!(result.is_err());
    }
}
