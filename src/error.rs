//! Error types for the minting bot.

use thiserror::Error;

/// Result type for bot operations.
pub type BotResult<T> = Result<T, BotError>;

/// Errors that can occur while handling a user command.
///
/// Every variant is converted to a user-facing chat message at the handler
/// boundary; nothing here is retried automatically.
#[derive(Debug, Error)]
pub enum BotError {
    /// Input is neither a 12-word mnemonic nor a 0x-prefixed private key.
    #[error("input is neither a 12-word mnemonic nor a 0x-prefixed private key")]
    InvalidCredentialFormat,

    /// Credential had the right shape but failed to parse.
    #[error("failed to parse credential: {0}")]
    CredentialParse(String),

    /// Network or timeout failure talking to the chain RPC.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The contract reverted the transaction.
    #[error("{0}")]
    Revert(RevertReason),

    /// Telegram API failure.
    #[error("Telegram API error: {0}")]
    Transport(#[from] teloxide::RequestError),

    /// Encrypting an imported secret failed.
    #[error("encryption failed: {0}")]
    Encryption(String),
}

/// Decoded revert condition for a mint transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertReason {
    /// The per-wallet 24-hour mint cooldown has not elapsed.
    CooldownActive,
    /// The wallet cannot cover gas for the transaction.
    InsufficientFunds,
    /// Any other revert, with the decoded reason (or raw data) attached.
    Other(String),
}

impl std::fmt::Display for RevertReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CooldownActive => write!(f, "mint cooldown active"),
            Self::InsufficientFunds => write!(f, "insufficient funds"),
            Self::Other(reason) => write!(f, "reverted: {reason}"),
        }
    }
}
