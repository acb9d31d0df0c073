//! Group gatekeeping: NFT ownership checks on join and on a timer.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::U256;
use anyhow::Result;
use teloxide::payloads::CreateChatInviteLinkSetters;
use teloxide::prelude::Requester;
use teloxide::types::{ChatId, Message, User, UserId};
use tracing::{debug, info, warn};

use crate::bot::MintBot;
use crate::error::BotResult;
use crate::session::SessionStore;

/// Interval between ownership sweeps of the gated group.
const SWEEP_INTERVAL: Duration = Duration::from_secs(3600);

/// Invite links expire this long after creation.
const INVITE_TTL_SECS: i64 = 300;

/// Shared ownership predicate for both gatekeeper triggers.
///
/// A user with no session cannot hold the NFT as far as the bot can tell:
/// wallet binding is session-scoped, so users must `/connect` or
/// `/import` before membership can be validated.
pub async fn has_required_nft(bot: &MintBot, user_id: UserId) -> BotResult<bool> {
    let Some(session) = bot.sessions.get(user_id) else {
        return Ok(false);
    };
    let balance = bot.gateway.token_balance(session.address()).await?;
    Ok(balance > U256::ZERO)
}

/// Validates new members of the monitored group. Non-holders get a
/// warning; with `auto_kick` set they are removed and immediately
/// unbanned so they can rejoin after acquiring the NFT.
pub async fn handle_join(bot: &MintBot, message: &Message, joined: &[User]) -> Result<()> {
    let chat_id = message.chat.id;
    if bot.config.group_chat() != Some(chat_id) {
        debug!(%chat_id, "join event outside the monitored group, ignoring");
        return Ok(());
    }

    for user in joined {
        if user.id == bot.bot_user_id {
            continue;
        }
        // One member's failure must not block checks for the rest.
        if let Err(e) = check_new_member(bot, chat_id, user).await {
            warn!(user_id = %user.id, "Error handling new member: {e}");
        }
    }
    Ok(())
}

async fn check_new_member(bot: &MintBot, chat_id: ChatId, user: &User) -> Result<()> {
    if has_required_nft(bot, user.id).await? {
        return Ok(());
    }

    bot.bot
        .send_message(
            chat_id,
            format!(
                "⚠️ Warning: User {} doesn't own the required NFT.",
                user.first_name
            ),
        )
        .await?;

    if bot.config.auto_kick {
        info!(user_id = %user.id, %chat_id, "removing member without required NFT");
        bot.bot.ban_chat_member(chat_id, user.id).await?;
        // Unban right away so the member can rejoin after remediation.
        bot.bot.unban_chat_member(chat_id, user.id).await?;
    }
    Ok(())
}

/// Spawns the hourly ownership sweep. Does nothing when no group is
/// configured. The first sweep runs one full interval after startup.
pub fn spawn_sweep(bot: Arc<MintBot>) -> Option<tokio::task::JoinHandle<()>> {
    let chat_id = bot.config.group_chat()?;

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            if let Err(e) = sweep_once(&bot, chat_id).await {
                warn!("Error in periodic check: {e}");
            }
        }
    }))
}

/// One pass over the group membership. Enumerates via the administrators
/// list (the only member enumeration the Bot API offers), skips
/// privileged members, and warns for every remaining non-holder. No
/// removal on this path.
async fn sweep_once(bot: &MintBot, chat_id: ChatId) -> Result<()> {
    let members = bot.bot.get_chat_administrators(chat_id).await?;
    debug!(%chat_id, count = members.len(), "running ownership sweep");

    for member in members {
        if member.is_privileged() {
            continue;
        }
        let user = member.user;

        match has_required_nft(bot, user.id).await {
            Ok(true) => {}
            Ok(false) => {
                if let Err(e) = bot
                    .bot
                    .send_message(
                        chat_id,
                        format!("⚠️ User {} no longer owns the required NFT.", user.first_name),
                    )
                    .await
                {
                    warn!(user_id = %user.id, "Failed to post sweep warning: {e}");
                }
            }
            Err(e) => warn!(user_id = %user.id, "Ownership check failed during sweep: {e}"),
        }
    }
    Ok(())
}

/// Requests a single-use invite link for `chat_id`, valid for five
/// minutes and consumable by exactly one join.
pub async fn create_group_invite(bot: &MintBot, chat_id: ChatId) -> BotResult<String> {
    let invite = bot
        .bot
        .create_chat_invite_link(chat_id)
        .member_limit(1)
        .expire_date(chrono::Utc::now() + chrono::Duration::seconds(INVITE_TTL_SECS))
        .await?;
    Ok(invite.invite_link)
}
