//! The run orchestrator: wires the distributor, workload runtime, batcher,
//! and collector into a single pipeline — pre-fund, construct + sign,
//! submit, collect, report.
//!
//! Sequence: fetch the root's starting nonce → initialize the workload
//! (deploy a contract if the mode needs one) → estimate gas/price → pre-fund
//! native value (and tokens, in ERC-20 mode) → fetch starting nonces for the
//! accounts that ended up ready → construct and sign `n` transactions →
//! submit them batched → wait for inclusion → reconstruct block statistics.
//!
//! A failure in pre-funding aborts the whole run (there is no workload to
//! measure without funded accounts); failures from the batcher and
//! collector onward are tallied into [`RunOutcome::errors`] and the run
//! still produces whatever report it can.

use alloy::primitives::{Address, U256};
use rpc_client::RpcClient;
use tracing::{info, instrument, warn};

use accounts::AccountSet;

use crate::batcher;
use crate::collector::{self, RunReport};
use crate::config::{Args, Mode};
use crate::error::{Result, RunError};
use crate::observer::ProgressObserver;

/// The full result of a run: whatever report could be assembled, plus every
/// non-fatal error encountered along the way (a reverted transaction is
/// fatal instead and surfaces as `Err` — see
/// [`RunError::TransactionExecutionFailed`]).
#[derive(Debug)]
pub struct RunOutcome {
    /// The throughput/utilization report, possibly empty if nothing was included.
    pub report: RunReport,
    /// Messages for batches, receipts, or individual transactions that failed
    /// without aborting the run.
    pub errors: Vec<String>,
    /// How many raw transactions the batcher successfully submitted.
    pub submitted: usize,
    /// How many sub-accounts ended up ready to transact (post pre-funding).
    pub ready_accounts: usize,
}

/// Run the full pipeline for one invocation of `evmstorm`.
///
/// # Errors
///
/// Returns an error for anything fatal: invalid config, pre-funding that
/// couldn't cover any account, an uninitialized workload runtime, or a
/// transaction that reverted on-chain.
#[instrument(skip(args, observer), fields(mode = %args.mode, n = args.transactions, k = args.sub_accounts, batch = args.batch))]
pub async fn run(args: &Args, observer: &dyn ProgressObserver) -> Result<RunOutcome> {
    if args.transactions == 0 {
        info!("transactions = 0, nothing to submit");
        return Ok(RunOutcome {
            report: RunReport {
                average_tps: 0,
                min_tps: 0,
                max_tps: 0,
                blocks: Vec::new(),
            },
            errors: Vec::new(),
            submitted: 0,
            ready_accounts: 0,
        });
    }

    let client = RpcClient::new(&args.json_rpc)?;
    let chain_id = client.chain_id().await?;
    let k = args.effective_sub_accounts();

    let account_set = AccountSet::derive(&args.mnemonic, k)?;
    account_set.init_nonces(&client, &[0]).await?;

    let mut workload = workload::for_mode(args.mode.into());
    info!(message = %workload.start_message(), "starting workload");

    workload.initialize(&client, account_set.root(), chain_id).await?;
    workload.estimate_base_tx(&client, account_set.root().address()).await?;
    workload.fetch_gas_price(&client).await?;

    let gas_limit = workload
        .gas_limit()
        .ok_or(RunError::Workload(workload::WorkloadError::RuntimeNotInitialized("estimate_base_tx")))?;
    let gas_price = workload
        .gas_price()
        .ok_or(RunError::Workload(workload::WorkloadError::RuntimeNotInitialized("fetch_gas_price")))?;
    let value = workload.value();

    let ready = distributor::fund_native(&account_set, &client, args.transactions, gas_price, gas_limit, value).await?;
    info!(ready = ready.len(), requested = k, "native pre-funding complete");

    let ready = if let Some(token_contract) = workload.token_contract() {
        fund_tokens_if_applicable(&account_set, &client, token_contract, args, &ready, gas_price, gas_limit).await?
    } else {
        ready
    };

    account_set.init_nonces(&client, &ready).await?;

    let raw_txs = workload.construct_transactions(&account_set, &ready, args.transactions, chain_id)?;
    info!(constructed = raw_txs.len(), "transactions constructed and signed");

    let submission = batcher::submit_all(&client, &raw_txs, args.batch, observer).await;
    let mut errors = submission.errors;

    collector::wait_for_mempool_drain(&client, submission.hashes.len()).await;

    let (mut found, outstanding) =
        collector::gather_receipts_batched(&client, &submission.hashes, args.transactions, args.batch, observer).await?;

    if !outstanding.is_empty() {
        warn!(outstanding = outstanding.len(), "falling back to individual receipt waits");
    }
    collector::gather_receipts_individually(&client, &outstanding, &mut found, &mut errors).await?;

    let report = collector::build_report(&client, &found).await?;

    Ok(RunOutcome {
        report,
        errors,
        submitted: submission.hashes.len(),
        ready_accounts: ready.len(),
    })
}

/// Tokens are only distributed in ERC-20 mode; ERC-721's `token_contract`
/// (the NFT collection) has nothing to pre-fund sub-accounts with, so other
/// modes pass `ready` through unchanged.
async fn fund_tokens_if_applicable(
    account_set: &AccountSet,
    client: &RpcClient,
    token_contract: Address,
    args: &Args,
    ready: &[u32],
    gas_price: U256,
    gas_limit: u64,
) -> Result<Vec<u32>> {
    if args.mode != Mode::Erc20 {
        return Ok(ready.to_vec());
    }
    let funded =
        distributor::fund_tokens(account_set, client, token_contract, args.transactions, ready, gas_price, gas_limit).await?;
    info!(funded = funded.len(), "token pre-funding complete");
    Ok(funded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            json_rpc: "http://127.0.0.1:8545".into(),
            mnemonic: "test test test test test test test test test test test junk".into(),
            sub_accounts: 10,
            transactions: 0,
            mode: Mode::Eoa,
            output: None,
            batch: 20,
            log_level: "info".into(),
            json_logs: false,
        }
    }

    #[tokio::test]
    async fn zero_transactions_short_circuits_without_network() {
        let args = base_args();
        let outcome = run(&args, &crate::observer::NoopObserver).await.expect("run failed");
        assert_eq!(outcome.submitted, 0);
        assert_eq!(outcome.report.average_tps, 0);
        assert!(outcome.report.blocks.is_empty());
    }
}
