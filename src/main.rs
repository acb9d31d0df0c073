use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod chain;
mod commands;
mod config;
mod error;
mod gatekeeper;
mod handlers;
mod secrets;
mod send;
mod session;
mod wallet;

#[cfg(test)]
mod tests;

use bot::MintBot;
use config::BotConfig;

#[derive(Parser)]
#[command(name = "mintgate")]
#[command(about = "NFT-gated Telegram minting bot")]
struct Cli {
    /// Path to bot config TOML (overrides BOT_CONFIG_PATH; falls back to
    /// environment variables when neither is set)
    #[arg(long)]
    bot_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match cli
        .bot_config
        .or_else(|| std::env::var("BOT_CONFIG_PATH").ok())
    {
        Some(path) => BotConfig::from_path(&path)?,
        None => BotConfig::from_env()?,
    };

    let bot = MintBot::connect(config).await?;
    bot.run().await
}
