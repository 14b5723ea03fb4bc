//! The workload mode selector, shared between the CLI and the runtime factory.

use std::fmt;

/// Which kind of transaction the engine constructs and submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadMode {
    /// Native value transfers between sub-accounts.
    Eoa,
    /// ERC-20 `transfer` calls against a deployed token contract.
    Erc20,
    /// ERC-721-style `createNFT` mint calls.
    Erc721,
}

impl fmt::Display for WorkloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Eoa => "EOA",
            Self::Erc20 => "ERC20",
            Self::Erc721 => "ERC721",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for WorkloadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "EOA" => Ok(Self::Eoa),
            "ERC20" => Ok(Self::Erc20),
            "ERC721" => Ok(Self::Erc721),
            other => Err(format!("unknown workload mode: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_display_and_parse() {
        for mode in [WorkloadMode::Eoa, WorkloadMode::Erc20, WorkloadMode::Erc721] {
            let parsed: WorkloadMode = mode.to_string().parse().expect("parse failed");
            assert_eq!(parsed, mode);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("eoa".parse::<WorkloadMode>().unwrap(), WorkloadMode::Eoa);
        assert_eq!("erc20".parse::<WorkloadMode>().unwrap(), WorkloadMode::Erc20);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!("SOMETHING".parse::<WorkloadMode>().is_err());
    }
}
