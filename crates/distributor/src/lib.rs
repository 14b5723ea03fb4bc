//! Pre-run account funding: native value and ERC-20 tokens.
//!
//! Both distributors share one strategy: classify every sub-account as
//! already-funded or short, push the shortfalls into a min-heap keyed
//! ascending, and greedily fund from the root's budget until either the
//! heap drains or the budget runs out. This maximizes the count of
//! sub-accounts that can participate when the root can't cover everyone —
//! see [`native::fund_native`] and [`token::fund_tokens`].
//!
//! A failure here aborts the run (unlike batcher/collector failures, which
//! are tallied but tolerated): without funded accounts there is no workload
//! to measure.
//!
//! # Modules
//!
//! - [`native`] - native-value funding, always run first
//! - [`token`] - ERC-20 token funding, run after native funding in token mode
//! - [`error`] - Error types with detailed context

#![warn(missing_docs)]

pub mod error;
pub mod native;
pub mod token;

pub use error::{DistributorError, Result};
pub use native::fund_native;
pub use token::fund_tokens;
