//! Native-value pre-funding of sub-accounts.
//!
//! Computes how much native value every sub-account needs to sustain the
//! full workload of N transactions, then tops up from the root account
//! using a min-heap keyed by shortfall — smallest shortfalls funded first —
//! so a root that can't cover every sub-account still maximizes how many
//! get to participate.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use alloy::primitives::{TxKind, U256};
use rpc_client::{CallRequest, RpcClient};
use tracing::{info, instrument, warn};

use accounts::AccountSet;

use crate::error::{DistributorError, Result};

/// Pre-fund every sub-account with enough native value to sustain `n`
/// transactions at `gas_price`/`gas_limit`/`value_per_tx`.
///
/// Precondition: the root account's nonce must already be seeded (typically
/// via [`AccountSet::init_nonces`] called with index `0` before this runs).
///
/// Returns the sorted list of sub-account indices that ended up
/// sufficiently funded — pre-funded accounts plus newly funded ones.
///
/// # Errors
///
/// Returns [`DistributorError::InsufficientFunds`] if the root cannot cover
/// even the smallest outstanding shortfall plus the cost of funding it.
#[instrument(skip(accounts, client), fields(n, gas_limit))]
pub async fn fund_native(
    accounts: &AccountSet,
    client: &RpcClient,
    n: u64,
    gas_price: U256,
    gas_limit: u64,
    value_per_tx: U256,
) -> Result<Vec<u32>> {
    let sub_accounts = accounts.sub_accounts();
    if sub_accounts.is_empty() {
        return Ok(Vec::new());
    }

    // Required balance R = N * (gasPrice * gasLimit + V).
    let required = U256::from(n)
        .checked_mul(
            gas_price
                .checked_mul(U256::from(gas_limit))
                .and_then(|base| base.checked_add(value_per_tx))
                .ok_or_else(|| {
                    DistributorError::UnusableGasEstimate("gas cost overflowed U256".into())
                })?,
        )
        .ok_or_else(|| DistributorError::UnusableGasEstimate("required balance overflowed U256".into()))?;

    // D: estimated cost of one native distribution transaction.
    let first = &sub_accounts[0];
    let distribution_gas_units = client
        .estimate_gas(&CallRequest {
            from: accounts.root().address(),
            to: Some(first.address()),
            value: Some(required),
            data: None,
        })
        .await?;
    let distribution_cost = distribution_gas_units
        .checked_mul(gas_price)
        .ok_or_else(|| DistributorError::UnusableGasEstimate("distribution cost overflowed U256".into()))?;

    // Classify every sub-account as ready or short.
    let mut ready: Vec<u32> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(U256, u32)>> = BinaryHeap::new();
    for account in sub_accounts {
        let balance = client.get_balance(account.address()).await?;
        if balance >= required {
            ready.push(account.index());
        } else {
            heap.push(Reverse((required - balance, account.index())));
        }
    }

    let had_shortfalls = !heap.is_empty();
    let mut root_balance = client.get_balance(accounts.root().address()).await?;
    let mut fundable: Vec<(u32, U256)> = Vec::new();

    while let Some(&Reverse((shortfall, index))) = heap.peek() {
        if root_balance <= distribution_cost {
            break;
        }
        let available_for_shortfall = root_balance - distribution_cost;
        if shortfall > available_for_shortfall {
            break;
        }
        heap.pop();
        root_balance -= shortfall;
        fundable.push((index, shortfall));
    }

    if fundable.is_empty() && had_shortfalls {
        return Err(DistributorError::InsufficientFunds {
            root_balance,
            distribution_cost,
            shortfall_count: heap.len(),
        });
    }

    info!(
        pre_funded = ready.len(),
        newly_funded = fundable.len(),
        unfunded = heap.len(),
        "native funding plan computed"
    );

    let chain_id = client.chain_id().await?;
    let root = accounts.root();

    for (index, shortfall) in &fundable {
        let account = accounts
            .get(*index)
            .expect("fundable index must exist in the account set");
        let nonce = root.next_nonce();
        let raw_tx = root.sign_legacy(
            chain_id,
            nonce,
            gas_price.to::<u128>(),
            gas_limit,
            TxKind::Call(account.address()),
            *shortfall,
            alloy::primitives::Bytes::new(),
        )?;

        let hash = client.send_raw_transaction(&raw_tx).await?;
        let receipt = client
            .wait_for_transaction(hash, std::time::Duration::from_secs(30))
            .await?;

        if !receipt.succeeded() {
            warn!(index, %hash, "distribution transfer reverted");
            return Err(DistributorError::TransferReverted { index: *index });
        }

        ready.push(*index);
    }

    ready.sort_unstable();
    Ok(ready)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_balance_arithmetic() {
        let n = 100u64;
        let gas_price = U256::from(20_000_000_000u128);
        let gas_limit = 21_000u64;
        let value_per_tx = U256::from(100u64);

        let required = U256::from(n)
            * (gas_price * U256::from(gas_limit) + value_per_tx);

        assert_eq!(
            required,
            U256::from(n) * (gas_price * U256::from(gas_limit) + value_per_tx)
        );
        assert!(required > U256::ZERO);
    }

    #[test]
    fn heap_orders_by_shortfall_ascending() {
        let mut heap: BinaryHeap<Reverse<(U256, u32)>> = BinaryHeap::new();
        heap.push(Reverse((U256::from(300u64), 3)));
        heap.push(Reverse((U256::from(100u64), 1)));
        heap.push(Reverse((U256::from(200u64), 2)));

        let Reverse((shortfall, index)) = heap.pop().expect("heap should not be empty");
        assert_eq!(shortfall, U256::from(100u64));
        assert_eq!(index, 1);
    }
}
