//! Message routing for Telegram updates.

use anyhow::Result;
use teloxide::types::Message;
use tracing::debug;

use crate::bot::MintBot;
use crate::session::user_id_from_message;
use crate::{commands, gatekeeper};

/// Routes one inbound message: membership service messages go to the
/// gatekeeper, commands to their handlers, and armed users' messages to
/// credential capture. Everything else is ignored.
pub async fn handle_message(bot: &MintBot, message: &Message) -> Result<()> {
    if let Some(joined) = message.new_chat_members() {
        return gatekeeper::handle_join(bot, message, joined).await;
    }

    let Some(text) = message.text() else {
        return Ok(());
    };

    if let Some((cmd, _args)) = commands::parse_command(text) {
        debug!(chat = %message.chat.id, cmd, "handling command");
        return commands::handle_command(bot, message, cmd).await;
    }

    // Credential capture is scoped to the user that ran /import, in the
    // private chat where they ran it.
    if message.chat.is_private()
        && let Some(user_id) = user_id_from_message(message)
        && bot.pending_imports.take(user_id, message.chat.id)
    {
        return commands::finish_import(bot, message, user_id, text).await;
    }

    Ok(())
}
