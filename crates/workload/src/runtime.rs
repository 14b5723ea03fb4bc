//! Mode-specific runtimes implementing the common workload contract:
//! `initialize` → `estimate_base_tx` → `gas_price` → `construct_transactions`.
//!
//! Every mode round-robins over the ready sub-accounts so construction
//! doesn't favor any one account, and so the workload tolerates fewer ready
//! accounts than sub-accounts requested (see the native distributor's
//! partial-funding behavior).

use alloy::primitives::{Address, Bytes, TxKind, U256};
use async_trait::async_trait;
use rpc_client::{CallRequest, RpcClient};
use tracing::{info, instrument};

use accounts::AccountSet;

use crate::contracts::{self, ERC20_DEPLOY_BYTECODE_HEX, ERC721_DEPLOY_BYTECODE_HEX};
use crate::error::{Result, WorkloadError};

/// 10⁻⁴ native units, expressed in wei assuming 18-decimal native value —
/// the EOA mode's fixed per-transfer value.
const EOA_TRANSFER_VALUE_WEI: u128 = 100_000_000_000_000; // 10^14 = 10^-4 * 10^18

/// Gas estimate safety margin applied to ERC-20/ERC-721 calls (1.5x).
const CONTRACT_GAS_MARGIN_NUM: u64 = 3;
const CONTRACT_GAS_MARGIN_DEN: u64 = 2;

/// Common contract every workload mode implements.
#[async_trait]
pub trait Workload: std::fmt::Debug + Send + Sync {
    /// Deploy or otherwise prepare any contract this mode needs. A no-op for EOA.
    async fn initialize(&mut self, client: &RpcClient, deployer: &accounts::Account, chain_id: u64) -> Result<()>;

    /// Estimate and cache the base gas limit (G) for this mode's transaction shape.
    async fn estimate_base_tx(&mut self, client: &RpcClient, from: Address) -> Result<()>;

    /// Fetch and cache the current gas price (P).
    async fn fetch_gas_price(&mut self, client: &RpcClient) -> Result<()>;

    /// Per-transaction intrinsic native value (V). Zero for ERC-20/ERC-721.
    fn value(&self) -> U256;

    /// The base gas limit (G) cached by `estimate_base_tx`, if it has run.
    /// The native distributor needs this to size `R` before any transaction
    /// is constructed.
    fn gas_limit(&self) -> Option<u64>;

    /// The gas price (P) cached by `fetch_gas_price`, if it has run.
    fn gas_price(&self) -> Option<U256>;

    /// The deployed contract this mode transacts against, if any.
    /// `None` for EOA; `Some` for ERC-20/ERC-721 once `initialize` has run.
    fn token_contract(&self) -> Option<Address> {
        None
    }

    /// Build `n` signed, round-robin transactions over `ready` account indices.
    fn construct_transactions(
        &self,
        accounts: &AccountSet,
        ready: &[u32],
        n: u64,
        chain_id: u64,
    ) -> Result<Vec<Bytes>>;

    /// A short human-readable description of the run about to start.
    fn start_message(&self) -> String;
}

fn require(value: Option<u64>, what: &'static str) -> Result<u64> {
    value.ok_or(WorkloadError::RuntimeNotInitialized(what))
}

fn require_u256(value: Option<U256>, what: &'static str) -> Result<U256> {
    value.ok_or(WorkloadError::RuntimeNotInitialized(what))
}

// ═══════════════════════════════════════════════════════════════════════════════
// EOA WORKLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// Native value transfers, round-robin sender → next-account receiver.
#[derive(Debug, Default)]
pub struct EoaWorkload {
    gas_limit: Option<u64>,
    gas_price: Option<U256>,
}

#[async_trait]
impl Workload for EoaWorkload {
    async fn initialize(&mut self, _client: &RpcClient, _deployer: &accounts::Account, _chain_id: u64) -> Result<()> {
        Ok(())
    }

    #[instrument(skip(self, client))]
    async fn estimate_base_tx(&mut self, client: &RpcClient, from: Address) -> Result<()> {
        let gas = client
            .estimate_gas(&CallRequest {
                from,
                to: Some(from),
                value: Some(U256::from(EOA_TRANSFER_VALUE_WEI)),
                data: None,
            })
            .await?;
        self.gas_limit = Some(gas.to::<u64>());
        Ok(())
    }

    async fn fetch_gas_price(&mut self, client: &RpcClient) -> Result<()> {
        self.gas_price = Some(client.gas_price().await?);
        Ok(())
    }

    fn value(&self) -> U256 {
        U256::from(EOA_TRANSFER_VALUE_WEI)
    }

    fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    fn gas_price(&self) -> Option<U256> {
        self.gas_price
    }

    fn construct_transactions(
        &self,
        accounts: &AccountSet,
        ready: &[u32],
        n: u64,
        chain_id: u64,
    ) -> Result<Vec<Bytes>> {
        if ready.is_empty() {
            return Err(WorkloadError::NoReadyAccounts);
        }
        let gas_limit = require(self.gas_limit, "estimate_base_tx")?;
        let gas_price = require_u256(self.gas_price, "fetch_gas_price")?;
        let value = self.value();
        let k = ready.len();

        let mut raw_txs = Vec::with_capacity(n as usize);
        for i in 0..n as usize {
            let sender_index = ready[i % k];
            let receiver_index = ready[(i + 1) % k];
            let sender = accounts
                .get(sender_index)
                .expect("ready index must exist in the account set");
            let receiver = accounts
                .get(receiver_index)
                .expect("ready index must exist in the account set");

            let nonce = sender.next_nonce();
            let raw_tx = sender.sign_legacy(
                chain_id,
                nonce,
                gas_price.to::<u128>(),
                gas_limit,
                TxKind::Call(receiver.address()),
                value,
                Bytes::new(),
            )?;
            raw_txs.push(raw_tx);
        }
        Ok(raw_txs)
    }

    fn start_message(&self) -> String {
        "submitting native EOA transfers, round-robin across sub-accounts".into()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERC-20 WORKLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// ERC-20 `transfer` calls of a fixed amount (1 token), round-robin.
#[derive(Debug, Default)]
pub struct Erc20Workload {
    token_contract: Option<Address>,
    gas_limit: Option<u64>,
    gas_price: Option<U256>,
}

#[async_trait]
impl Workload for Erc20Workload {
    #[instrument(skip(self, client, deployer))]
    async fn initialize(&mut self, client: &RpcClient, deployer: &accounts::Account, chain_id: u64) -> Result<()> {
        let gas_price = client.gas_price().await?;
        let bytecode = contracts::deploy_bytecode(ERC20_DEPLOY_BYTECODE_HEX);
        let nonce = deployer.next_nonce();
        let raw_tx = deployer.sign_legacy(
            chain_id,
            nonce,
            gas_price.to::<u128>(),
            500_000,
            TxKind::Create,
            U256::ZERO,
            bytecode,
        )?;

        let hash = client.send_raw_transaction(&raw_tx).await?;
        let receipt = client
            .wait_for_transaction(hash, std::time::Duration::from_secs(30))
            .await?;

        let address = receipt
            .contract_address
            .ok_or_else(|| WorkloadError::DeploymentFailed("receipt missing contract address".into()))?;

        info!(%address, "ERC-20 token contract deployed");
        self.token_contract = Some(address);
        Ok(())
    }

    async fn estimate_base_tx(&mut self, client: &RpcClient, from: Address) -> Result<()> {
        let token = self
            .token_contract
            .ok_or(WorkloadError::RuntimeNotInitialized("initialize"))?;
        let calldata = contracts::encode_transfer(from, U256::from(1));
        let gas = client
            .estimate_gas(&CallRequest {
                from,
                to: Some(token),
                value: None,
                data: Some(calldata),
            })
            .await?;
        let scaled = gas.to::<u64>() * CONTRACT_GAS_MARGIN_NUM / CONTRACT_GAS_MARGIN_DEN;
        self.gas_limit = Some(scaled);
        Ok(())
    }

    async fn fetch_gas_price(&mut self, client: &RpcClient) -> Result<()> {
        let price = client.gas_price().await?;
        self.gas_price = Some(price * U256::from(CONTRACT_GAS_MARGIN_NUM) / U256::from(CONTRACT_GAS_MARGIN_DEN));
        Ok(())
    }

    fn value(&self) -> U256 {
        U256::ZERO
    }

    fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    fn gas_price(&self) -> Option<U256> {
        self.gas_price
    }

    fn token_contract(&self) -> Option<Address> {
        self.token_contract
    }

    fn construct_transactions(
        &self,
        accounts: &AccountSet,
        ready: &[u32],
        n: u64,
        chain_id: u64,
    ) -> Result<Vec<Bytes>> {
        if ready.is_empty() {
            return Err(WorkloadError::NoReadyAccounts);
        }
        let token = self
            .token_contract
            .ok_or(WorkloadError::RuntimeNotInitialized("initialize"))?;
        let gas_limit = require(self.gas_limit, "estimate_base_tx")?;
        let gas_price = require_u256(self.gas_price, "fetch_gas_price")?;
        let k = ready.len();

        let mut raw_txs = Vec::with_capacity(n as usize);
        for i in 0..n as usize {
            let sender_index = ready[i % k];
            let receiver_index = ready[(i + 1) % k];
            let sender = accounts
                .get(sender_index)
                .expect("ready index must exist in the account set");
            let receiver = accounts
                .get(receiver_index)
                .expect("ready index must exist in the account set");

            let calldata = contracts::encode_transfer(receiver.address(), U256::from(1));
            let nonce = sender.next_nonce();
            let raw_tx = sender.sign_legacy(
                chain_id,
                nonce,
                gas_price.to::<u128>(),
                gas_limit,
                TxKind::Call(token),
                U256::ZERO,
                calldata,
            )?;
            raw_txs.push(raw_tx);
        }
        Ok(raw_txs)
    }

    fn start_message(&self) -> String {
        "submitting ERC-20 transfers of 1 token, round-robin across sub-accounts".into()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ERC-721 WORKLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// `createNFT(tokenURI)` mint calls, one sender per transaction, no receiver needed.
#[derive(Debug, Default)]
pub struct Erc721Workload {
    nft_contract: Option<Address>,
    gas_limit: Option<u64>,
    gas_price: Option<U256>,
    token_uri: String,
}

impl Erc721Workload {
    /// Create a workload that mints with a fixed, static token URI.
    #[must_use]
    pub fn new(token_uri: impl Into<String>) -> Self {
        Self {
            token_uri: token_uri.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Workload for Erc721Workload {
    #[instrument(skip(self, client, deployer))]
    async fn initialize(&mut self, client: &RpcClient, deployer: &accounts::Account, chain_id: u64) -> Result<()> {
        let gas_price = client.gas_price().await?;
        let bytecode = contracts::deploy_bytecode(ERC721_DEPLOY_BYTECODE_HEX);
        let nonce = deployer.next_nonce();
        let raw_tx = deployer.sign_legacy(
            chain_id,
            nonce,
            gas_price.to::<u128>(),
            500_000,
            TxKind::Create,
            U256::ZERO,
            bytecode,
        )?;

        let hash = client.send_raw_transaction(&raw_tx).await?;
        let receipt = client
            .wait_for_transaction(hash, std::time::Duration::from_secs(30))
            .await?;

        let address = receipt
            .contract_address
            .ok_or_else(|| WorkloadError::DeploymentFailed("receipt missing contract address".into()))?;

        info!(%address, "ERC-721 mint contract deployed");
        self.nft_contract = Some(address);
        Ok(())
    }

    async fn estimate_base_tx(&mut self, client: &RpcClient, from: Address) -> Result<()> {
        let contract = self
            .nft_contract
            .ok_or(WorkloadError::RuntimeNotInitialized("initialize"))?;
        let calldata = contracts::encode_create_nft(&self.token_uri);
        let gas = client
            .estimate_gas(&CallRequest {
                from,
                to: Some(contract),
                value: None,
                data: Some(calldata),
            })
            .await?;
        let scaled = gas.to::<u64>() * CONTRACT_GAS_MARGIN_NUM / CONTRACT_GAS_MARGIN_DEN;
        self.gas_limit = Some(scaled);
        Ok(())
    }

    async fn fetch_gas_price(&mut self, client: &RpcClient) -> Result<()> {
        let price = client.gas_price().await?;
        self.gas_price = Some(price * U256::from(CONTRACT_GAS_MARGIN_NUM) / U256::from(CONTRACT_GAS_MARGIN_DEN));
        Ok(())
    }

    fn value(&self) -> U256 {
        U256::ZERO
    }

    fn gas_limit(&self) -> Option<u64> {
        self.gas_limit
    }

    fn gas_price(&self) -> Option<U256> {
        self.gas_price
    }

    fn token_contract(&self) -> Option<Address> {
        self.nft_contract
    }

    fn construct_transactions(
        &self,
        accounts: &AccountSet,
        ready: &[u32],
        n: u64,
        chain_id: u64,
    ) -> Result<Vec<Bytes>> {
        if ready.is_empty() {
            return Err(WorkloadError::NoReadyAccounts);
        }
        let contract = self
            .nft_contract
            .ok_or(WorkloadError::RuntimeNotInitialized("initialize"))?;
        let gas_limit = require(self.gas_limit, "estimate_base_tx")?;
        let gas_price = require_u256(self.gas_price, "fetch_gas_price")?;
        let k = ready.len();

        let calldata = contracts::encode_create_nft(&self.token_uri);
        let mut raw_txs = Vec::with_capacity(n as usize);
        for i in 0..n as usize {
            let sender_index = ready[i % k];
            let sender = accounts
                .get(sender_index)
                .expect("ready index must exist in the account set");

            let nonce = sender.next_nonce();
            let raw_tx = sender.sign_legacy(
                chain_id,
                nonce,
                gas_price.to::<u128>(),
                gas_limit,
                TxKind::Call(contract),
                U256::ZERO,
                calldata.clone(),
            )?;
            raw_txs.push(raw_tx);
        }
        Ok(raw_txs)
    }

    fn start_message(&self) -> String {
        "submitting ERC-721 createNFT mints, one per sub-account in round-robin".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_MNEMONIC: &str = "test test test test test test test test test test test junk";

    #[test]
    fn eoa_construct_requires_initialization() {
        let accounts = AccountSet::derive(TEST_MNEMONIC, 3).expect("derive failed");
        let workload = EoaWorkload::default();
        let ready = [1, 2, 3];
        let err = workload.construct_transactions(&accounts, &ready, 10, 1).unwrap_err();
        assert!(matches!(err, WorkloadError::RuntimeNotInitialized(_)));
    }

    #[test]
    fn eoa_construct_round_robins_and_signs() {
        let accounts = AccountSet::derive(TEST_MNEMONIC, 3).expect("derive failed");
        let mut workload = EoaWorkload::default();
        workload.gas_limit = Some(21_000);
        workload.gas_price = Some(U256::from(1_000_000_000u64));

        let ready = [1, 2, 3];
        let raw_txs = workload
            .construct_transactions(&accounts, &ready, 7, 1)
            .expect("construction failed");

        assert_eq!(raw_txs.len(), 7);
        assert!(raw_txs.iter().all(|tx| !tx.is_empty()));

        // nonce monotonicity: account 1 is used at i=0,3,6 -> 3 increments
        assert_eq!(accounts.get(1).unwrap().peek_nonce(), 3);
        assert_eq!(accounts.get(2).unwrap().peek_nonce(), 2);
        assert_eq!(accounts.get(3).unwrap().peek_nonce(), 2);
    }

    #[test]
    fn erc20_construct_requires_token_contract() {
        let accounts = AccountSet::derive(TEST_MNEMONIC, 2).expect("derive failed");
        let mut workload = Erc20Workload::default();
        workload.gas_limit = Some(60_000);
        workload.gas_price = Some(U256::from(1_000_000_000u64));

        let ready = [1, 2];
        let err = workload.construct_transactions(&accounts, &ready, 4, 1).unwrap_err();
        assert!(matches!(err, WorkloadError::RuntimeNotInitialized(_)));
    }

    #[test]
    fn empty_ready_list_errors() {
        let accounts = AccountSet::derive(TEST_MNEMONIC, 2).expect("derive failed");
        let mut workload = EoaWorkload::default();
        workload.gas_limit = Some(21_000);
        workload.gas_price = Some(U256::from(1_000_000_000u64));

        let err = workload.construct_transactions(&accounts, &[], 4, 1).unwrap_err();
        assert!(matches!(err, WorkloadError::NoReadyAccounts));
    }
}
