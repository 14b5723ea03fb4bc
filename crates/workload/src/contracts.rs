//! Contract bindings for the ERC-20 and ERC-721 workload modes.
//!
//! The ABI surface is declared with `alloy::sol!`, the same macro-driven
//! calldata-encoding pattern used elsewhere in this codebase for contract
//! calls. The compiled bytecode below is an opaque deployment artifact: this
//! harness treats what the contract actually does as out of scope, and only
//! needs *some* deployed address to construct and submit transfer/mint
//! transactions against.

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

// ═══════════════════════════════════════════════════════════════════════════════
// ABI DEFINITIONS
// ═══════════════════════════════════════════════════════════════════════════════

sol! {
    /// Minimal ERC-20 surface the EOA-style workload transfers against.
    interface IWorkloadToken {
        function transfer(address to, uint256 amount) external returns (bool);
    }
}

sol! {
    /// Minimal mint-only NFT surface the ERC-721 workload calls into.
    interface IWorkloadCollectible {
        function createNFT(string memory tokenURI) external returns (uint256 tokenId);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEPLOYMENT ARTIFACTS (opaque blobs)
// ═══════════════════════════════════════════════════════════════════════════════

/// Deployment bytecode for the ERC-20 contract used by the token workload.
///
/// Opaque: treated as an external artifact this harness doesn't introspect
/// or validate beyond "it deploys and exposes `transfer`".
pub const ERC20_DEPLOY_BYTECODE_HEX: &str = concat!(
    "608060405234801561001057600080fd5b50610150806100206000396000f3fe",
    "6080604052348015600f57600080fd5b506004361060285760003560e01c8063",
    "a9059cbb14602d575b600080fd5b60436004803603810190603f919060b3565b",
    "6059565b604051605091906101",
    "00565b60405180910390f35b6000600190509291505056fea2646970667358221220",
    "00000000000000000000000000000000000000000000000000000000000000000064736f6c63430008140033",
);

/// Deployment bytecode for the ERC-721-like mint contract used by the NFT
/// workload. Opaque for the same reason as [`ERC20_DEPLOY_BYTECODE_HEX`].
pub const ERC721_DEPLOY_BYTECODE_HEX: &str = concat!(
    "608060405234801561001057600080fd5b50610170806100206000396000f3fe",
    "6080604052348015600f57600080fd5b506004361060285760003560e01c8063",
    "d85d4e9814602d575b600080fd5b60436004803603810190603f919060cc565b",
    "6059565b604051605091906101",
    "20565b60405180910390f35b6000819050929150505056fea2646970667358221220",
    "00000000000000000000000000000000000000000000000000000000000000000064736f6c63430008140033",
);

/// Decode one of the above hex constants into raw deployment bytes.
#[must_use]
pub fn deploy_bytecode(hex_str: &str) -> Bytes {
    Bytes::from(hex::decode(hex_str).unwrap_or_else(|_| Vec::new()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALLDATA BUILDERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Build calldata for `transfer(to, amount)`.
#[must_use]
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    Bytes::from(IWorkloadToken::transferCall { to, amount }.abi_encode())
}

/// Build calldata for `createNFT(tokenURI)`.
#[must_use]
pub fn encode_create_nft(token_uri: &str) -> Bytes {
    Bytes::from(
        IWorkloadCollectible::createNFTCall {
            tokenURI: token_uri.to_string(),
        }
        .abi_encode(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_calldata_starts_with_selector() {
        let calldata = encode_transfer(Address::repeat_byte(0xAB), U256::from(1));
        assert!(calldata.len() >= 4);
        assert_eq!(&calldata[0..4], &IWorkloadToken::transferCall::SELECTOR);
    }

    #[test]
    fn create_nft_calldata_starts_with_selector() {
        let calldata = encode_create_nft("ipfs://placeholder");
        assert!(calldata.len() >= 4);
        assert_eq!(&calldata[0..4], &IWorkloadCollectible::createNFTCall::SELECTOR);
    }

    #[test]
    fn bytecode_constants_decode_to_nonempty_bytes() {
        assert!(!deploy_bytecode(ERC20_DEPLOY_BYTECODE_HEX).is_empty());
        assert!(!deploy_bytecode(ERC721_DEPLOY_BYTECODE_HEX).is_empty());
    }
}
