//! ERC-20 token pre-funding of sub-accounts.
//!
//! Only invoked in ERC-20 workload mode, after [`crate::native::fund_native`]
//! succeeds. Uses the same min-heap-by-shortfall strategy as the native
//! distributor, but against integer token balances on an already-deployed
//! contract, with the root's token balance as the funding budget.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use alloy::primitives::{Address, TxKind, U256};
use alloy::sol;
use alloy::sol_types::SolCall;
use rpc_client::{CallRequest, RpcClient};
use tracing::{info, instrument, warn};

use accounts::AccountSet;

use crate::error::{DistributorError, Result};

sol! {
    /// Minimal ERC-20 surface this distributor needs to read and move balances.
    interface IFundingToken {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

/// Top up every account in `ready` so it holds at least `ceil(n / |ready|)`
/// tokens of `token_contract`, funding from the root account's balance.
///
/// Returns the subset of `ready` that ended up sufficiently funded with
/// tokens — this may be smaller than `ready` if the root's token balance
/// can't cover everyone.
///
/// # Errors
///
/// Returns [`DistributorError::InsufficientFunds`] if the root holds no
/// tokens at all to distribute, or an RPC/account error on transport or
/// signing failure.
#[instrument(skip(accounts, client), fields(n, ready_count = ready.len()))]
pub async fn fund_tokens(
    accounts: &AccountSet,
    client: &RpcClient,
    token_contract: Address,
    n: u64,
    ready: &[u32],
    gas_price: U256,
    gas_limit: u64,
) -> Result<Vec<u32>> {
    if ready.is_empty() {
        return Ok(Vec::new());
    }

    // Ceiling division: each ready account needs enough tokens to send
    // its share of the N total transactions.
    #[allow(clippy::cast_possible_truncation)]
    let required_per_account = n.div_ceil(ready.len() as u64);
    let required = U256::from(required_per_account);

    let mut funded: Vec<u32> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(U256, u32)>> = BinaryHeap::new();

    for &index in ready {
        let account = accounts.get(index).expect("ready index must exist in the account set");
        let balance = token_balance(client, token_contract, account.address()).await?;
        if balance >= required {
            funded.push(index);
        } else {
            heap.push(Reverse((required - balance, index)));
        }
    }

    let had_shortfalls = !heap.is_empty();
    let root = accounts.root();
    let mut root_token_balance = token_balance(client, token_contract, root.address()).await?;

    if root_token_balance == U256::ZERO && had_shortfalls {
        return Err(DistributorError::InsufficientFunds {
            root_balance: root_token_balance,
            distribution_cost: U256::ZERO,
            shortfall_count: heap.len(),
        });
    }

    let chain_id = client.chain_id().await?;

    while let Some(&Reverse((shortfall, index))) = heap.peek() {
        if shortfall > root_token_balance {
            break;
        }
        heap.pop();

        let account = accounts.get(index).expect("heap index must exist in the account set");
        let calldata = IFundingToken::transferCall {
            to: account.address(),
            amount: shortfall,
        }
        .abi_encode();

        let nonce = root.next_nonce();
        let raw_tx = root.sign_legacy(
            chain_id,
            nonce,
            gas_price.to::<u128>(),
            gas_limit,
            TxKind::Call(token_contract),
            U256::ZERO,
            alloy::primitives::Bytes::from(calldata),
        )?;

        let hash = client.send_raw_transaction(&raw_tx).await?;
        let receipt = client
            .wait_for_transaction(hash, std::time::Duration::from_secs(30))
            .await?;

        if !receipt.succeeded() {
            warn!(index, %hash, "token distribution transfer reverted");
            return Err(DistributorError::TransferReverted { index });
        }

        root_token_balance -= shortfall;
        funded.push(index);
    }

    info!(
        funded = funded.len(),
        unfunded = heap.len(),
        required_per_account,
        "token funding plan applied"
    );

    funded.sort_unstable();
    Ok(funded)
}

async fn token_balance(client: &RpcClient, token: Address, holder: Address) -> Result<U256> {
    let calldata = IFundingToken::balanceOfCall { account: holder }.abi_encode();
    let result = client
        .eth_call(&CallRequest {
            from: holder,
            to: Some(token),
            value: None,
            data: Some(alloy::primitives::Bytes::from(calldata)),
        })
        .await?;

    if result.is_empty() {
        return Ok(U256::ZERO);
    }
    Ok(U256::from_be_slice(&result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ceiling_division_rounds_up() {
        assert_eq!(10u64.div_ceil(3), 4);
        assert_eq!(9u64.div_ceil(3), 3);
        assert_eq!(1u64.div_ceil(5), 1);
    }

    #[test]
    fn heap_prefers_smallest_shortfall() {
        let mut heap: BinaryHeap<Reverse<(U256, u32)>> = BinaryHeap::new();
        heap.push(Reverse((U256::from(50u64), 2)));
        heap.push(Reverse((U256::from(10u64), 1)));

        let Reverse((shortfall, index)) = heap.pop().expect("heap should not be empty");
        assert_eq!(shortfall, U256::from(10u64));
        assert_eq!(index, 1);
    }
}
