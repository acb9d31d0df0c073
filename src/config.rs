use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use teloxide::types::ChatId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub bot_token: String,
    pub rpc_url: String,
    pub contract_address: Address,
    /// Chat id of the gated group. Gatekeeping and invite links are
    /// disabled when absent.
    #[serde(default)]
    pub group_chat_id: Option<i64>,
    /// Remove (then immediately unban) joiners that fail the NFT check.
    #[serde(default)]
    pub auto_kick: bool,
    /// Process-wide passphrase used to encrypt imported private keys.
    pub encryption_passphrase: String,
}

impl BotConfig {
    pub fn from_path(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read bot config {}: {}", path, e))?;
        let config: BotConfig =
            toml::from_str(&contents).map_err(|e| anyhow::anyhow!("Invalid bot config: {}", e))?;
        Ok(config)
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let bot_token = std::env::var("TELEGRAM_BOT_TOKEN")
            .map_err(|_| anyhow::anyhow!("TELEGRAM_BOT_TOKEN environment variable is required"))?;

        let rpc_url = std::env::var("RPC_URL")
            .map_err(|_| anyhow::anyhow!("RPC_URL environment variable is required"))?;

        let contract_address = std::env::var("CONTRACT_ADDRESS")
            .map_err(|_| anyhow::anyhow!("CONTRACT_ADDRESS environment variable is required"))?
            .parse::<Address>()
            .map_err(|e| anyhow::anyhow!("Invalid CONTRACT_ADDRESS: {}", e))?;

        let group_chat_id = match std::env::var("GROUP_CHAT_ID") {
            Ok(raw) => Some(
                raw.parse::<i64>()
                    .map_err(|e| anyhow::anyhow!("Invalid GROUP_CHAT_ID '{}': {}", raw, e))?,
            ),
            Err(_) => None,
        };

        let auto_kick = std::env::var("AUTO_KICK")
            .map(|v| v == "true")
            .unwrap_or(false);

        let encryption_passphrase = std::env::var("SECRET_KEY")
            .map_err(|_| anyhow::anyhow!("SECRET_KEY environment variable is required"))?;

        Ok(Self {
            bot_token,
            rpc_url,
            contract_address,
            group_chat_id,
            auto_kick,
            encryption_passphrase,
        })
    }

    /// The gated group as a Telegram chat id, when configured.
    pub fn group_chat(&self) -> Option<ChatId> {
        self.group_chat_id.map(ChatId)
    }
}
