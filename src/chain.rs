//! Thin façade over the blockchain client.
//!
//! One read-only provider serves all queries; mint transactions build a
//! signing provider on demand so the wallet filler can manage nonce and
//! fees for the session's key.

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, TxHash, U256, utils::format_ether};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionReceipt;
use alloy::signers::local::PrivateKeySigner;
use alloy::sol;
use alloy::sol_types::{Revert, SolError};
use tracing::debug;

use crate::error::{BotError, BotResult, RevertReason};

sol! {
    #[sol(rpc)]
    contract MembershipToken {
        function balanceOf(address owner) external view returns (uint256);
        function mint(address to) external;
        function tokenURI(uint256 tokenId) external view returns (string);
        event Transfer(address indexed from, address indexed to, uint256 indexed tokenId);
    }
}

/// Revert reason the contract emits while the per-wallet mint cooldown is
/// still running.
const MINT_COOLDOWN_REASON: &str = "Must wait 24 hours";

/// Submitted mint transaction and its confirmation.
pub struct MintOutcome {
    pub tx_hash: TxHash,
    pub receipt: TransactionReceipt,
}

/// A token held by an address, with resolved metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub token_id: U256,
    pub token_uri: String,
}

pub struct ChainGateway {
    provider: DynProvider,
    token: MembershipToken::MembershipTokenInstance<DynProvider>,
    contract_address: Address,
    rpc_url: String,
}

impl ChainGateway {
    pub async fn connect(rpc_url: &str, contract_address: Address) -> anyhow::Result<Self> {
        let provider = ProviderBuilder::new()
            .connect(rpc_url)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to RPC {}: {}", rpc_url, e))?
            .erased();

        let token = MembershipToken::new(contract_address, provider.clone());

        Ok(Self {
            provider,
            token,
            contract_address,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// NFT balance of `owner` via `balanceOf`.
    pub async fn token_balance(&self, owner: Address) -> BotResult<U256> {
        self.token
            .balanceOf(owner)
            .call()
            .await
            .map_err(classify_contract_error)
    }

    /// Native balance of `owner`, rendered in ether.
    pub async fn native_balance(&self, owner: Address) -> BotResult<String> {
        let wei = self
            .provider
            .get_balance(owner)
            .await
            .map_err(|e| BotError::Rpc(e.to_string()))?;
        Ok(format_ether(wei))
    }

    /// Estimates gas for `mint(recipient)`, submits with a 1.2x buffered
    /// limit, and waits for one confirmation.
    ///
    /// No automatic retry on any failure path; cooldown and
    /// insufficient-funds conditions are surfaced as distinguished
    /// [`RevertReason`] variants.
    pub async fn estimate_and_mint(
        &self,
        signer: PrivateKeySigner,
        recipient: Address,
    ) -> BotResult<MintOutcome> {
        let from = signer.address();
        let wallet_provider = ProviderBuilder::new()
            .wallet(signer)
            .connect(&self.rpc_url)
            .await
            .map_err(|e| BotError::Rpc(e.to_string()))?;
        let token = MembershipToken::new(self.contract_address, wallet_provider);

        let estimate = token
            .mint(recipient)
            .from(from)
            .estimate_gas()
            .await
            .map_err(classify_contract_error)?;
        let gas_limit = buffered_gas_limit(estimate);
        debug!(estimate, gas_limit, %recipient, "submitting mint");

        let pending = token
            .mint(recipient)
            .from(from)
            .gas(gas_limit)
            .send()
            .await
            .map_err(classify_contract_error)?;
        let tx_hash = *pending.tx_hash();

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| BotError::Rpc(e.to_string()))?;

        Ok(MintOutcome { tx_hash, receipt })
    }

    /// All tokens ever transferred to `owner`, with metadata resolved per
    /// token. Scans Transfer events from the first block on every call;
    /// returns an empty list (not an error) for an address with no
    /// transfers.
    pub async fn owned_tokens(&self, owner: Address) -> BotResult<Vec<OwnedToken>> {
        let events = self
            .token
            .Transfer_filter()
            .topic2(owner.into_word())
            .from_block(BlockNumberOrTag::Earliest)
            .query()
            .await
            .map_err(classify_contract_error)?;

        let mut tokens = Vec::with_capacity(events.len());
        for (transfer, _log) in events {
            let token_uri = self
                .token
                .tokenURI(transfer.tokenId)
                .call()
                .await
                .map_err(classify_contract_error)?;
            tokens.push(OwnedToken {
                token_id: transfer.tokenId,
                token_uri,
            });
        }
        Ok(tokens)
    }
}

/// Gas limit with a fixed 1.2x safety margin, floored to an integer unit.
pub(crate) fn buffered_gas_limit(estimate: u64) -> u64 {
    ((estimate as u128) * 12 / 10) as u64
}

fn classify_contract_error(err: alloy::contract::Error) -> BotError {
    let revert_data = err.as_revert_data();
    classify_failure(revert_data.as_deref().map(|v| &**v), &err.to_string())
}

/// Maps a failed call to the error taxonomy.
///
/// Reverts are decoded structurally (`Error(string)` ABI encoding) and
/// matched against the known cooldown reason. Insufficient funds is a
/// node-level error with no revert payload, so it can only be recognized
/// from the error message.
fn classify_failure(revert_data: Option<&[u8]>, message: &str) -> BotError {
    if let Some(data) = revert_data {
        return match Revert::abi_decode(data) {
            Ok(revert) if revert.reason.contains(MINT_COOLDOWN_REASON) => {
                BotError::Revert(RevertReason::CooldownActive)
            }
            Ok(revert) => BotError::Revert(RevertReason::Other(revert.reason)),
            // Custom error or malformed payload: keep the raw data.
            Err(_) => BotError::Revert(RevertReason::Other(format!("0x{}", hex::encode(data)))),
        };
    }

    if message.contains("insufficient funds") {
        return BotError::Revert(RevertReason::InsufficientFunds);
    }

    BotError::Rpc(message.to_string())
}
