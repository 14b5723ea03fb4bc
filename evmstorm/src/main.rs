//! evmstorm — stress-testing harness for EVM-compatible JSON-RPC nodes.
//!
//! Given a funded root mnemonic, a transaction count, a sub-account count,
//! a batch size, and a workload mode, this binary pre-funds sub-accounts,
//! constructs and signs that many transactions, submits them at maximum
//! JSON-RPC throughput, waits for inclusion, and reports throughput and
//! gas-utilization statistics.
//!
//! # Usage
//!
//! ```bash
//! evmstorm --json-rpc http://127.0.0.1:8545 --mnemonic "..." --transactions 2000
//! evmstorm --help
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

mod batcher;
mod collector;
mod config;
mod engine;
mod error;
mod observer;

use collector::RunReport;
use config::Args;
use engine::RunOutcome;
use observer::NoopObserver;

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN ENTRY POINT
// ═══════════════════════════════════════════════════════════════════════════════

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.json_logs)?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        json_rpc = %args.json_rpc,
        mode = %args.mode,
        transactions = args.transactions,
        sub_accounts = args.sub_accounts,
        batch = args.batch,
        "starting evmstorm"
    );

    args.validate().context("invalid configuration")?;

    let observer = NoopObserver;
    let outcome = tokio::select! {
        result = engine::run(&args, &observer) => result.context("run failed")?,
        () = shutdown_signal() => {
            warn!("shutdown signal received before the run completed, exiting");
            std::process::exit(130);
        }
    };

    print_report(&outcome);

    if let Some(path) = &args.output {
        write_output(path, &outcome.report)?;
    }

    if !outcome.errors.is_empty() {
        warn!(count = outcome.errors.len(), "run completed with non-fatal errors");
        for message in &outcome.errors {
            warn!(%message, "non-fatal error");
        }
    }

    info!(
        submitted = outcome.submitted,
        ready_accounts = outcome.ready_accounts,
        blocks = outcome.report.blocks.len(),
        average_tps = outcome.report.average_tps,
        "evmstorm run complete"
    );

    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// REPORTING
// ═══════════════════════════════════════════════════════════════════════════════

/// Print the per-block utilization table and the summary row to stdout.
fn print_report(outcome: &RunOutcome) {
    if outcome.report.blocks.is_empty() {
        println!("no stat data");
        return;
    }

    println!("{:>12} {:>12} {:>8} {:>14} {:>14} {:>10}", "block", "createdAt", "numTxs", "gasUsed", "gasLimit", "util %");
    for block in &outcome.report.blocks {
        println!(
            "{:>12} {:>12} {:>8} {:>14} {:>14} {:>9.2}%",
            block.block_num, block.created_at, block.num_txs, block.gas_used, block.gas_limit, block.gas_utilization
        );
    }

    let avg_utilization = if outcome.report.blocks.is_empty() {
        0.0
    } else {
        outcome.report.blocks.iter().map(|b| b.gas_utilization).sum::<f64>() / outcome.report.blocks.len() as f64
    };

    println!();
    println!(
        "avgTPS={} minTPS={} maxTPS={} blocks={} avgUtilization={avg_utilization:.2}%",
        outcome.report.average_tps,
        outcome.report.min_tps,
        outcome.report.max_tps,
        outcome.report.blocks.len()
    );
}

/// Write the result JSON report to `path`.
///
/// Only written if at least one block was observed — a report with no
/// blocks means nothing was included, so there is nothing meaningful to
/// persist.
fn write_output(path: &str, report: &RunReport) -> Result<()> {
    if report.blocks.is_empty() {
        warn!(%path, "no blocks observed, skipping output file");
        return Ok(());
    }
    let json = serde_json::to_vec_pretty(report).context("failed to serialize report")?;
    std::fs::write(path, json).with_context(|| format!("failed to write output to {path}"))?;
    info!(%path, "report written");
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// INITIALIZATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Initialize the tracing subscriber for logging.
fn init_logging(level: &str, json: bool) -> Result<()> {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to init logging: {e}"))?;
    }

    Ok(())
}

/// Resolve once SIGINT or (on Unix) SIGTERM is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => error!(error = %e, "failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collector::BlockReport;

    fn report_with_one_block() -> RunReport {
        RunReport {
            average_tps: 5,
            min_tps: 5,
            max_tps: 5,
            blocks: vec![BlockReport {
                block_num: 10,
                created_at: 1_700_000_000,
                num_txs: 25,
                gas_used: "0x5208".into(),
                gas_limit: "0x1c9c380".into(),
                gas_utilization: 0.01,
            }],
        }
    }

    #[test]
    fn write_output_round_trips_through_json() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("report.json");
        let report = report_with_one_block();

        write_output(path.to_str().expect("path must be utf-8"), &report).expect("write_output failed");

        let contents = std::fs::read_to_string(&path).expect("report file must exist");
        let parsed: serde_json::Value = serde_json::from_str(&contents).expect("report must be valid json");
        assert_eq!(parsed["averageTPS"], 5);
        assert_eq!(parsed["blocks"][0]["blockNum"], 10);
    }

    #[test]
    fn write_output_skips_file_when_no_blocks_observed() {
        let dir = tempfile::tempdir().expect("tempdir failed");
        let path = dir.path().join("report.json");
        let report = RunReport {
            average_tps: 0,
            min_tps: 0,
            max_tps: 0,
            blocks: Vec::new(),
        };

        write_output(path.to_str().expect("path must be utf-8"), &report).expect("write_output failed");

        assert!(!path.exists());
    }
}
