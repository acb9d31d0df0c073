use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;
use teloxide::types::UserId;
use tracing::{error, info};

use crate::chain::ChainGateway;
use crate::config::BotConfig;
use crate::gatekeeper;
use crate::handlers::handle_message;
use crate::session::{MemorySessionStore, PendingImports, SessionStore};

pub struct MintBot {
    pub bot: Bot,
    pub config: BotConfig,
    pub gateway: ChainGateway,
    pub sessions: Arc<dyn SessionStore>,
    pub pending_imports: PendingImports,
    pub bot_user_id: UserId,
}

impl MintBot {
    /// Authenticates against the Telegram API and connects the chain
    /// gateway. Failures here are fatal startup errors.
    pub async fn connect(config: BotConfig) -> Result<Self> {
        let bot = Bot::new(config.bot_token.clone());
        let me = bot.get_me().await?;
        let gateway = ChainGateway::connect(&config.rpc_url, config.contract_address).await?;

        Ok(Self {
            bot,
            config,
            gateway,
            sessions: Arc::new(MemorySessionStore::default()),
            pending_imports: PendingImports::default(),
            bot_user_id: me.user.id,
        })
    }

    /// Run the bot with long-polling until interrupted.
    pub async fn run(self) -> Result<()> {
        info!("Starting Telegram bot...");

        let bot = Arc::new(self);

        gatekeeper::spawn_sweep(bot.clone());

        let handler = dptree::entry().branch(Update::filter_message().endpoint(
            |msg: Message, bot_ref: Arc<MintBot>| async move {
                if let Err(e) = handle_message(&bot_ref, &msg).await {
                    error!("Error handling message: {e}");
                }
                respond(())
            },
        ));

        Dispatcher::builder(bot.bot.clone(), handler)
            .dependencies(dptree::deps![bot.clone()])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram bot stopped");
        Ok(())
    }
}
