//! Receipt collection, TPS measurement, and report construction.
//!
//! Five phases: wait for the mempool to drain, batch-fetch receipts with a
//! bounded sweep budget, fall back to individual per-hash waits for whatever
//! is still outstanding, reconstruct block statistics from the receipts
//! gathered, and emit the final report.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use alloy::primitives::TxHash;
use rpc_client::{BlockHeader, RpcClient};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::{Result, RunError};
use crate::observer::ProgressObserver;

/// Per-block statistics in the final report.
#[derive(Debug, Clone, Serialize)]
pub struct BlockReport {
    /// Block number.
    #[serde(rename = "blockNum")]
    pub block_num: u64,
    /// Block timestamp, Unix seconds.
    #[serde(rename = "createdAt")]
    pub created_at: u64,
    /// Number of transactions included in the block.
    #[serde(rename = "numTxs")]
    pub num_txs: usize,
    /// Gas used, as a hex string.
    #[serde(rename = "gasUsed")]
    pub gas_used: String,
    /// Gas limit, as a hex string.
    #[serde(rename = "gasLimit")]
    pub gas_limit: String,
    /// Gas utilization percentage, two decimal places of precision.
    #[serde(rename = "gasUtilization")]
    pub gas_utilization: f64,
}

/// The full run report, matching the output JSON schema.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Average transactions-per-second across observed blocks, rounded up.
    #[serde(rename = "averageTPS")]
    pub average_tps: u64,
    /// Minimum observed transactions-per-second across observed blocks.
    #[serde(rename = "minTPS")]
    pub min_tps: u64,
    /// Maximum observed transactions-per-second across observed blocks.
    #[serde(rename = "maxTPS")]
    pub max_tps: u64,
    /// Per-block statistics, sorted by block number.
    pub blocks: Vec<BlockReport>,
}

/// Poll `txpool_status` every 2 seconds until both queues drain, or until
/// `max(5s, submitted_count * 500ms)` has elapsed. A node that doesn't
/// support `txpool_status` is treated as already drained.
#[instrument(skip(client))]
pub async fn wait_for_mempool_drain(client: &RpcClient, submitted_count: usize) {
    let timeout = Duration::from_secs(5).max(Duration::from_millis(submitted_count as u64 * 500));
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        match client.txpool_status().await {
            Ok(status) if status.is_drained() => {
                info!("mempool drained");
                return;
            }
            Ok(status) => {
                info!(pending = status.pending, queued = status.queued, "mempool still draining");
            }
            Err(e) if e.is_method_not_supported() => {
                warn!("node does not support txpool_status, relying on timeout only");
            }
            Err(e) => {
                warn!(error = %e, "txpool_status poll failed, treating as transient");
            }
        }

        if tokio::time::Instant::now() >= deadline {
            warn!("mempool drain timed out, proceeding to receipt collection anyway");
            return;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
    }
}

/// Receipts gathered so far, keyed by transaction hash.
type ReceiptMap = HashMap<TxHash, rpc_client::TransactionReceipt>;

/// Batch-fetch receipts for `hashes` with a bounded sweep budget of
/// `ceil(2.5% * n)` iterations (minimum 1). Returns the receipts found and
/// the set of hashes still outstanding.
///
/// # Errors
///
/// Returns [`RunError::TransactionExecutionFailed`] the moment any receipt
/// reports `status == 0x0` — a reverted transaction aborts the run.
#[instrument(skip(client, hashes, observer), fields(count = hashes.len(), n))]
pub async fn gather_receipts_batched(
    client: &RpcClient,
    hashes: &[TxHash],
    n: u64,
    batch_size: usize,
    observer: &dyn ProgressObserver,
) -> Result<(ReceiptMap, Vec<TxHash>)> {
    let mut found: ReceiptMap = HashMap::new();
    let mut outstanding: Vec<TxHash> = hashes.to_vec();

    #[allow(clippy::cast_precision_loss, clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let sweep_budget = ((n as f64) * 0.025).ceil().max(1.0) as usize;

    for sweep in 0..sweep_budget {
        if outstanding.is_empty() {
            break;
        }

        for chunk in outstanding.clone().chunks(batch_size.max(1)) {
            let ids = client.next_ids(chunk.len());
            let requests: Vec<_> = ids
                .into_iter()
                .zip(chunk.iter())
                .map(|(id, hash)| RpcClient::get_transaction_receipt_request(id, *hash))
                .collect();

            let responses = match client.batch(&requests).await {
                Ok(responses) => responses,
                Err(e) => {
                    warn!(error = %e, sweep, "receipt sweep batch failed, retrying next sweep");
                    continue;
                }
            };

            for (hash, response) in chunk.iter().zip(responses.into_iter()) {
                let Some(value) = response.result.filter(|v| !v.is_null()) else {
                    continue;
                };
                let receipt: rpc_client::TransactionReceipt = serde_json::from_value(value)
                    .map_err(|e| RunError::Rpc(rpc_client::RpcError::from(e)))?;

                if !receipt.succeeded() {
                    return Err(RunError::TransactionExecutionFailed(*hash));
                }
                found.insert(*hash, receipt);
            }
        }

        outstanding.retain(|h| !found.contains_key(h));
        observer.on_item_completed("receipts", hashes.len(), found.len());

        if outstanding.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    info!(
        found = found.len(),
        outstanding = outstanding.len(),
        sweep_budget,
        "batched receipt gathering complete"
    );
    Ok((found, outstanding))
}

/// Individual fallback for hashes still outstanding after the batched
/// budget: a 30-second `waitForTransaction` deadline per hash.
#[instrument(skip(client, outstanding, found))]
pub async fn gather_receipts_individually(
    client: &RpcClient,
    outstanding: &[TxHash],
    found: &mut ReceiptMap,
    errors: &mut Vec<String>,
) -> Result<()> {
    for &hash in outstanding {
        match client.wait_for_transaction(hash, Duration::from_secs(30)).await {
            Ok(receipt) => {
                if !receipt.succeeded() {
                    return Err(RunError::TransactionExecutionFailed(hash));
                }
                found.insert(hash, receipt);
            }
            Err(e) => {
                warn!(error = %e, %hash, "individual receipt fallback failed");
                errors.push(format!("receipt for {hash} unavailable: {e}"));
            }
        }
    }
    Ok(())
}

/// Reconstruct per-block statistics and the run-level TPS summary from the
/// receipts gathered.
///
/// # Errors
///
/// Returns an error if a referenced block cannot be fetched.
#[instrument(skip(client, receipts))]
pub async fn build_report(client: &RpcClient, receipts: &ReceiptMap) -> Result<RunReport> {
    let block_numbers: HashSet<u64> = receipts.values().map(rpc_client::TransactionReceipt::block_number_u64).collect();

    if block_numbers.is_empty() {
        return Ok(RunReport {
            average_tps: 0,
            min_tps: 0,
            max_tps: 0,
            blocks: Vec::new(),
        });
    }

    let mut tx_counts: HashMap<u64, usize> = HashMap::new();
    for receipt in receipts.values() {
        *tx_counts.entry(receipt.block_number_u64()).or_insert(0) += 1;
    }

    let mut header_cache: HashMap<u64, BlockHeader> = HashMap::new();
    for &number in &block_numbers {
        fetch_and_cache(client, number, &mut header_cache).await?;
        if number > 0 {
            fetch_and_cache(client, number - 1, &mut header_cache).await?;
        }
    }

    let mut blocks = Vec::new();
    let mut total_included: u64 = 0;
    let mut total_block_time: u64 = 0;
    let mut tps_samples: Vec<u64> = Vec::new();

    let mut sorted_numbers: Vec<u64> = block_numbers.into_iter().collect();
    sorted_numbers.sort_unstable();

    for number in sorted_numbers {
        let Some(header) = header_cache.get(&number) else {
            continue;
        };
        let num_txs = *tx_counts.get(&number).unwrap_or(&0);
        total_included += num_txs as u64;

        let block_time = header_cache.get(&number.saturating_sub(1)).map_or(0, |parent| {
            header.timestamp_u64().abs_diff(parent.timestamp_u64())
        });

        let gas_used = header.gas_used_u64();
        let gas_limit = header.gas_limit_u64();
        #[allow(clippy::cast_precision_loss)]
        let gas_utilization = if gas_limit == 0 {
            0.0
        } else {
            (gas_used as f64 * 10000.0 / gas_limit as f64).round() / 100.0
        };

        if block_time > 0 {
            total_block_time += block_time;
            tps_samples.push(num_txs as u64 / block_time);
        }

        blocks.push(BlockReport {
            block_num: number,
            created_at: header.timestamp_u64(),
            num_txs,
            gas_used: format!("0x{gas_used:x}"),
            gas_limit: format!("0x{gas_limit:x}"),
            gas_utilization,
        });
    }

    let average_tps = if total_block_time == 0 {
        0
    } else {
        total_included.div_ceil(total_block_time)
    };
    let min_tps = tps_samples.iter().copied().min().unwrap_or(0);
    let max_tps = tps_samples.iter().copied().max().unwrap_or(0);

    Ok(RunReport {
        average_tps,
        min_tps,
        max_tps,
        blocks,
    })
}

async fn fetch_and_cache(client: &RpcClient, number: u64, cache: &mut HashMap<u64, BlockHeader>) -> Result<()> {
    if cache.contains_key(&number) {
        return Ok(());
    }
    if let Some(header) = client.get_block_by_number(number).await? {
        cache.insert(number, header);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(number: u64, timestamp: u64, gas_used: u64, gas_limit: u64, tx_count: usize) -> BlockHeader {
        serde_json::from_value(serde_json::json!({
            "number": format!("0x{number:x}"),
            "timestamp": format!("0x{timestamp:x}"),
            "gasUsed": format!("0x{gas_used:x}"),
            "gasLimit": format!("0x{gas_limit:x}"),
            "transactions": vec!["0x0"; tx_count],
        }))
        .expect("header must parse")
    }

    #[tokio::test]
    async fn empty_receipts_yield_zeroed_report() {
        let client = RpcClient::new("https://example.com/rpc").expect("client creation failed");
        let receipts: ReceiptMap = HashMap::new();
        let report = build_report(&client, &receipts).await.expect("build_report failed");
        assert_eq!(report.average_tps, 0);
        assert!(report.blocks.is_empty());
    }

    #[test]
    fn gas_utilization_is_a_percentage() {
        let h = header(10, 1_700_000_000, 10_500, 21_000, 1);
        assert_eq!(h.gas_used_u64(), 10_500);
        assert_eq!(h.gas_limit_u64(), 21_000);
    }
}
