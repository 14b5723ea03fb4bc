//! A single derived account: keypair, cached address, and its nonce counter.
//!
//! Nonces are tracked locally rather than queried per-transaction — at the
//! throughput this harness targets, round-tripping to the node for every
//! nonce would serialize what should be independent signing work. Each
//! account's nonce is seeded once from `eth_getTransactionCount(addr,
//! "pending")` and then incremented locally for every transaction
//! constructed against it; see `workload`'s construction policies.

use std::sync::atomic::{AtomicU64, Ordering};

use alloy::primitives::{Address, Bytes, TxKind, U256};
use alloy_consensus::{SignableTransaction, TxLegacy};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use tracing::debug;

use crate::error::{AccountError, Result};
use crate::keys::{derive_signer, signer_address};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// A mnemonic-derived account: its signer, cached address, derivation index,
/// and a locally tracked nonce.
///
/// Invariant: the nonce is monotonic non-decreasing within a run. Every
/// successful call to [`sign_legacy`](Self::sign_legacy) increments it by
/// exactly one.
#[derive(Debug)]
pub struct Account {
    index: u32,
    signer: PrivateKeySigner,
    address: Address,
    nonce: AtomicU64,
}

impl Account {
    /// Derive the account at `index` of `mnemonic`.
    ///
    /// # Errors
    ///
    /// Returns an error if the mnemonic is invalid or the index cannot be derived.
    pub fn derive(mnemonic: &str, index: u32) -> Result<Self> {
        let signer = derive_signer(mnemonic, index)?;
        let address = signer_address(&signer);
        Ok(Self {
            index,
            signer,
            address,
            nonce: AtomicU64::new(0),
        })
    }

    /// This account's derivation index. `0` is always the root/funder.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// This account's EVM address.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// `true` if this is the root (funder) account.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.index == 0
    }

    /// Read the current nonce without incrementing it.
    #[must_use]
    pub fn peek_nonce(&self) -> u64 {
        self.nonce.load(Ordering::SeqCst)
    }

    /// Overwrite the nonce, typically after fetching the on-chain starting
    /// value.
    pub fn set_nonce(&self, nonce: u64) {
        self.nonce.store(nonce, Ordering::SeqCst);
        debug!(index = self.index, %self.address, nonce, "account nonce set");
    }

    /// Atomically read the current nonce and increment it.
    pub fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst)
    }

    /// Sign a legacy (EIP-155) transaction from this account, returning the
    /// raw RLP-encoded, signed transaction bytes ready for
    /// `eth_sendRawTransaction`.
    ///
    /// The nonce is *not* read from the account here — callers pass the
    /// exact nonce they intend to use (normally obtained via
    /// [`next_nonce`](Self::next_nonce)) so construction and signing stay
    /// decoupled and order-preserving.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::SigningFailed`] if the underlying signer
    /// rejects the transaction.
    #[allow(clippy::too_many_arguments)]
    pub fn sign_legacy(
        &self,
        chain_id: u64,
        nonce: u64,
        gas_price: u128,
        gas_limit: u64,
        to: TxKind,
        value: U256,
        input: Bytes,
    ) -> Result<Bytes> {
        let mut tx = TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price,
            gas_limit,
            to,
            value,
            input,
        };

        let signature = self
            .signer
            .sign_transaction_sync(&mut tx)
            .map_err(|e| AccountError::SigningFailed(e.to_string()))?;

        let signed = tx.into_signed(signature);
        let mut payload = Vec::new();
        signed.eip2718_encode(&mut payload);
        Ok(Bytes::from(payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    #[test]
    fn nonce_starts_at_zero_and_increments() {
        let account = Account::derive(TEST_MNEMONIC, 0).expect("derive failed");
        assert_eq!(account.peek_nonce(), 0);
        assert_eq!(account.next_nonce(), 0);
        assert_eq!(account.next_nonce(), 1);
        assert_eq!(account.peek_nonce(), 2);
    }

    #[test]
    fn set_nonce_overrides() {
        let account = Account::derive(TEST_MNEMONIC, 1).expect("derive failed");
        account.set_nonce(42);
        assert_eq!(account.peek_nonce(), 42);
        assert_eq!(account.next_nonce(), 42);
        assert_eq!(account.peek_nonce(), 43);
    }

    #[test]
    fn signing_produces_nonempty_payload() {
        let account = Account::derive(TEST_MNEMONIC, 0).expect("derive failed");
        let raw = account
            .sign_legacy(
                1,
                0,
                1_000_000_000,
                21_000,
                TxKind::Call(Address::repeat_byte(0xAB)),
                U256::from(100),
                Bytes::new(),
            )
            .expect("signing failed");
        assert!(!raw.is_empty());
    }

    #[test]
    fn root_is_index_zero() {
        let root = Account::derive(TEST_MNEMONIC, 0).expect("derive failed");
        let sub = Account::derive(TEST_MNEMONIC, 1).expect("derive failed");
        assert!(root.is_root());
        assert!(!sub.is_root());
    }
}
