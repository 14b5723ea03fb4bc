//! CLI argument parsing and validation.
//!
//! Every flag also reads from an `EVMSTORM_*` environment variable fallback,
//! so the harness can run unattended in CI without a wrapper script.

use clap::{Parser, ValueEnum};

use crate::error::{Result, RunError};

// ═══════════════════════════════════════════════════════════════════════════════
// CLI ARGUMENTS
// ═══════════════════════════════════════════════════════════════════════════════

/// evmstorm - stress-testing harness for EVM-compatible JSON-RPC nodes.
#[derive(Parser, Debug)]
#[command(name = "evmstorm")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Target node's JSON-RPC endpoint.
    #[arg(long = "json-rpc", env = "EVMSTORM_JSON_RPC")]
    pub json_rpc: String,

    /// BIP-39 mnemonic the root account and all sub-accounts derive from.
    #[arg(long, env = "EVMSTORM_MNEMONIC")]
    pub mnemonic: String,

    /// Number of sub-accounts (K) to derive and fund.
    #[arg(long = "sub-accounts", env = "EVMSTORM_SUB_ACCOUNTS", default_value_t = 10)]
    pub sub_accounts: u32,

    /// Number of transactions (N) to construct and submit.
    #[arg(long = "transactions", env = "EVMSTORM_TRANSACTIONS", default_value_t = 2000)]
    pub transactions: u64,

    /// Workload mode.
    #[arg(long, env = "EVMSTORM_MODE", value_enum, default_value_t = Mode::Eoa)]
    pub mode: Mode,

    /// Path to write the result JSON report to.
    #[arg(long, env = "EVMSTORM_OUTPUT")]
    pub output: Option<String>,

    /// Batch size (B) for RPC pipelining.
    #[arg(long = "batch", env = "EVMSTORM_BATCH", default_value_t = 20)]
    pub batch: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log-level", env = "EVMSTORM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Output logs as JSON instead of human-readable text.
    #[arg(long = "json-logs", env = "EVMSTORM_JSON_LOGS")]
    pub json_logs: bool,
}

/// Clap-facing workload mode selector; converts into [`workload::WorkloadMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Native value transfers.
    Eoa,
    /// ERC-20 token transfers.
    Erc20,
    /// ERC-721 mint calls.
    Erc721,
}

impl From<Mode> for workload::WorkloadMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Eoa => Self::Eoa,
            Mode::Erc20 => Self::Erc20,
            Mode::Erc721 => Self::Erc721,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Eoa => "EOA",
            Self::Erc20 => "ERC20",
            Self::Erc721 => "ERC721",
        };
        write!(f, "{s}")
    }
}

impl Args {
    /// Validate argument combinations that clap's declarative parsing can't express.
    ///
    /// # Errors
    ///
    /// Returns [`RunError::Config`] if `batch` is zero, or if `sub-accounts`
    /// is zero while `transactions` is non-zero (there would be no account
    /// to send from).
    pub fn validate(&self) -> Result<()> {
        if self.batch == 0 {
            return Err(RunError::Config("--batch must be at least 1".into()));
        }
        if self.sub_accounts == 0 && self.transactions > 0 {
            return Err(RunError::Config(
                "--sub-accounts must be at least 1 when --transactions is non-zero".into(),
            ));
        }
        Ok(())
    }

    /// The number of sub-accounts actually worth deriving: never more than
    /// needed to cover `transactions`, per the "N < K" boundary behavior.
    #[must_use]
    pub fn effective_sub_accounts(&self) -> u32 {
        let capped = self.transactions.min(u64::from(self.sub_accounts));
        u32::try_from(capped).unwrap_or(self.sub_accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args {
            json_rpc: "http://127.0.0.1:8545".into(),
            mnemonic: "test test test test test test test test test test test junk".into(),
            sub_accounts: 10,
            transactions: 2000,
            mode: Mode::Eoa,
            output: None,
            batch: 20,
            log_level: "info".into(),
            json_logs: false,
        }
    }

    #[test]
    fn validate_accepts_defaults() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_batch() {
        let mut args = base_args();
        args.batch = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_sub_accounts_with_transactions() {
        let mut args = base_args();
        args.sub_accounts = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn effective_sub_accounts_caps_at_transaction_count() {
        let mut args = base_args();
        args.sub_accounts = 100;
        args.transactions = 5;
        assert_eq!(args.effective_sub_accounts(), 5);
    }

    #[test]
    fn effective_sub_accounts_uncapped_when_k_is_smaller() {
        let args = base_args();
        assert_eq!(args.effective_sub_accounts(), 10);
    }
}
