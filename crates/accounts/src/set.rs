//! The root account plus its K sub-accounts, indexed by BIP-44 derivation index.

use futures::future::join_all;
use tracing::{instrument, warn};

use crate::account::Account;
use crate::error::{AccountError, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT SET
// ═══════════════════════════════════════════════════════════════════════════════

/// All accounts derived for a run: index `0` is the root (funder), indices
/// `1..=k` are sub-accounts.
#[derive(Debug)]
pub struct AccountSet {
    accounts: Vec<Account>,
}

impl AccountSet {
    /// Derive the root account plus `k` sub-accounts from `mnemonic`.
    ///
    /// # Errors
    ///
    /// Returns an error if any index fails to derive.
    pub fn derive(mnemonic: &str, k: u32) -> Result<Self> {
        let accounts = (0..=k)
            .map(|i| Account::derive(mnemonic, i))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { accounts })
    }

    /// The root (funder) account, always at index 0.
    #[must_use]
    pub fn root(&self) -> &Account {
        &self.accounts[0]
    }

    /// All sub-accounts, indices `1..=k`, in ascending index order.
    #[must_use]
    pub fn sub_accounts(&self) -> &[Account] {
        &self.accounts[1..]
    }

    /// Look up an account by derivation index.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<&Account> {
        self.accounts.get(index as usize)
    }

    /// Total accounts, including root (`k + 1`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// `true` if this set has no sub-accounts (root only).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.len() <= 1
    }

    /// Seed every named account's nonce from its on-chain `"pending"`
    /// transaction count, fetched concurrently (one request per account).
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::NonceSourceUnavailable`] for the first
    /// account whose fetch fails; other in-flight fetches are allowed to
    /// complete but their results are discarded.
    #[instrument(skip(self, client, indices), fields(count = indices.len()))]
    pub async fn init_nonces(&self, client: &rpc_client::RpcClient, indices: &[u32]) -> Result<()> {
        let fetches = indices.iter().map(|&index| {
            let client = client.clone();
            async move {
                let account = self
                    .get(index)
                    .expect("index passed to init_nonces must exist in this set");
                let nonce = client
                    .get_transaction_count(account.address())
                    .await
                    .map_err(|source| AccountError::NonceSourceUnavailable { index, source })?;
                account.set_nonce(nonce);
                Ok::<(), AccountError>(())
            }
        });

        for result in join_all(fetches).await {
            if let Err(e) = result {
                warn!(error = %e, "nonce fetch failed");
                return Err(e);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    #[test]
    fn derives_root_plus_k_sub_accounts() {
        let set = AccountSet::derive(TEST_MNEMONIC, 5).expect("derive failed");
        assert_eq!(set.len(), 6);
        assert_eq!(set.sub_accounts().len(), 5);
        assert!(set.root().is_root());
        assert!(set.sub_accounts().iter().all(|a| !a.is_root()));
    }

    #[test]
    fn indices_are_distinct_addresses() {
        let set = AccountSet::derive(TEST_MNEMONIC, 3).expect("derive failed");
        let mut addresses: Vec<_> = (0..=3).map(|i| set.get(i).unwrap().address()).collect();
        addresses.sort();
        addresses.dedup();
        assert_eq!(addresses.len(), 4);
    }

    #[test]
    fn zero_sub_accounts_is_root_only() {
        let set = AccountSet::derive(TEST_MNEMONIC, 0).expect("derive failed");
        assert_eq!(set.len(), 1);
        assert!(set.is_empty());
    }
}
