//! Mode-specific transaction construction: EOA, ERC-20, and ERC-721.
//!
//! Every mode implements the same [`Workload`] contract — initialize
//! (deploy if needed), estimate gas, fetch gas price, then construct `n`
//! signed raw transactions round-robin over the ready sub-accounts — so the
//! engine (see the `evmstorm` binary) can drive any of them identically.
//!
//! # Modules
//!
//! - [`mode`] - [`WorkloadMode`], the EOA/ERC20/ERC721 selector
//! - [`runtime`] - [`Workload`] trait and its three implementations
//! - [`contracts`] - `sol!` ABI bindings and deployment artifacts
//! - [`error`] - Error types with detailed context

#![warn(missing_docs)]

pub mod contracts;
pub mod error;
pub mod mode;
pub mod runtime;

pub use error::{Result, WorkloadError};
pub use mode::WorkloadMode;
pub use runtime::{Erc20Workload, Erc721Workload, EoaWorkload, Workload};

/// Construct the runtime for a given mode.
///
/// ERC-721 mints use a fixed placeholder token URI; callers who need a
/// different one should construct [`Erc721Workload::new`] directly.
#[must_use]
pub fn for_mode(mode: WorkloadMode) -> Box<dyn Workload> {
    match mode {
        WorkloadMode::Eoa => Box::new(EoaWorkload::default()),
        WorkloadMode::Erc20 => Box::new(Erc20Workload::default()),
        WorkloadMode::Erc721 => Box::new(Erc721Workload::new("ipfs://evmstorm/placeholder")),
    }
}
