//! Slash command handlers.

use anyhow::Result;
use teloxide::prelude::Requester;
use teloxide::types::{Message, UserId};
use tracing::{debug, info, warn};

use crate::bot::MintBot;
use crate::error::{BotError, RevertReason};
use crate::send::{TELEGRAM_MESSAGE_LIMIT, chunk_message};
use crate::session::{Session, SessionStore};
use crate::{gatekeeper, secrets, wallet};

pub const HELP_TEXT: &str = "Welcome to the NFT Minting Bot! 🚀\n\n\
    Commands:\n\
    /connect - Connect your wallet\n\
    /import - Import your existing wallet (private key or mnemonic)\n\
    /mint - Mint a new NFT\n\
    /balance - Check your NFT balance\n\
    /collection - View your NFT collection";

const IMPORT_PROMPT: &str =
    "To import your wallet, send your private key or mnemonic (12 words) in the next message.";

/// Check if a message is a command and return the command name and args.
pub fn parse_command(text: &str) -> Option<(&str, &str)> {
    if !text.starts_with('/') {
        return None;
    }

    let text = text.trim();
    let mut parts = text.splitn(2, |c: char| c.is_whitespace());
    let cmd = parts.next()?.trim_start_matches('/');
    let args = parts.next().unwrap_or("").trim();

    // Remove @botname suffix if present
    let cmd = cmd.split('@').next()?;

    Some((cmd, args))
}

/// Dispatches a recognized command; unknown commands fall through silently.
pub async fn handle_command(bot: &MintBot, message: &Message, cmd: &str) -> Result<()> {
    let Some(user_id) = crate::session::user_id_from_message(message) else {
        return Ok(());
    };

    match cmd {
        "start" => handle_start(bot, message).await,
        "connect" => handle_connect(bot, message, user_id).await,
        "import" => handle_import(bot, message, user_id).await,
        "mint" => handle_mint(bot, message, user_id).await,
        "balance" => handle_balance(bot, message, user_id).await,
        "collection" => handle_collection(bot, message, user_id).await,
        _ => Ok(()),
    }
}

async fn handle_start(bot: &MintBot, message: &Message) -> Result<()> {
    bot.bot.send_message(message.chat.id, HELP_TEXT).await?;
    Ok(())
}

/// Idempotent wallet creation: an existing session re-displays its
/// address, a new one discloses the freshly generated key.
async fn handle_connect(bot: &MintBot, message: &Message, user_id: UserId) -> Result<()> {
    let (session, created) = bot
        .sessions
        .insert_if_absent(user_id, wallet::create_session());

    let reply = if created {
        info!(%user_id, address = %session.address(), "created wallet session");
        // The private key is deliberately echoed back once so the user can
        // save it; there is no other way to recover it.
        format!(
            "🔐 New wallet created!\n\n\
            Address: {}\n\n\
            IMPORTANT: Save this private key securely:\n{}\n\n\
            ⚠️ Never share your private key with anyone!\n\n\
            💡 Send some ETH to this address to pay for minting gas fees.",
            session.address(),
            wallet::private_key_hex(&session.wallet),
        )
    } else {
        format!(
            "🔗 Wallet already connected!\n\nAddress: {}",
            session.address()
        )
    };

    bot.bot.send_message(message.chat.id, reply).await?;
    Ok(())
}

/// First step of the two-step import: require a private chat, then arm
/// the pending-credential state for this user.
async fn handle_import(bot: &MintBot, message: &Message, user_id: UserId) -> Result<()> {
    if !message.chat.is_private() {
        bot.bot
            .send_message(
                message.chat.id,
                "⚠️ For security reasons, please use the /import command in a private message with the bot.",
            )
            .await?;
        return Ok(());
    }

    bot.pending_imports.begin(user_id, message.chat.id);
    bot.bot.send_message(message.chat.id, IMPORT_PROMPT).await?;
    Ok(())
}

/// Second step of the import: the armed user's next message is the
/// credential. Replaces any existing session for this user.
pub async fn finish_import(
    bot: &MintBot,
    message: &Message,
    user_id: UserId,
    raw: &str,
) -> Result<()> {
    let signer = match wallet::import_from_secret(raw) {
        Ok(signer) => signer,
        Err(BotError::InvalidCredentialFormat) => {
            bot.bot
                .send_message(
                    message.chat.id,
                    "❌ Invalid input. Please provide a valid private key or mnemonic.",
                )
                .await?;
            return Ok(());
        }
        Err(e) => {
            bot.bot
                .send_message(message.chat.id, format!("❌ Error importing wallet: {e}"))
                .await?;
            return Ok(());
        }
    };

    let key_hex = wallet::private_key_hex(&signer);
    let encrypted = match secrets::encrypt_secret(&key_hex, &bot.config.encryption_passphrase) {
        Ok(ciphertext) => ciphertext,
        Err(e) => {
            // Encryption failure aborts the import; no session is stored.
            bot.bot
                .send_message(message.chat.id, format!("❌ Error importing wallet: {e}"))
                .await?;
            return Ok(());
        }
    };

    let session = Session {
        wallet: signer,
        encrypted_secret: Some(encrypted),
    };
    let address = session.address();
    bot.sessions.put(user_id, session);
    info!(%user_id, %address, "imported wallet session");

    bot.bot
        .send_message(
            message.chat.id,
            format!(
                "🔐 Wallet imported successfully!\n\n\
                Address: {address}\n\n\
                Your wallet is now connected and ready for use."
            ),
        )
        .await?;
    Ok(())
}

async fn handle_mint(bot: &MintBot, message: &Message, user_id: UserId) -> Result<()> {
    let Some(session) = bot.sessions.get(user_id) else {
        bot.bot
            .send_message(
                message.chat.id,
                "❌ Please connect or import your wallet first using /connect or /import",
            )
            .await?;
        return Ok(());
    };

    bot.bot
        .send_message(
            message.chat.id,
            "🔄 Preparing to mint your NFT... Please wait.",
        )
        .await?;

    let outcome = match bot
        .gateway
        .estimate_and_mint(session.wallet.clone(), session.address())
        .await
    {
        Ok(outcome) => outcome,
        Err(e) => {
            bot.bot
                .send_message(message.chat.id, mint_error_message(&e))
                .await?;
            return Ok(());
        }
    };

    debug!(
        tx = %outcome.tx_hash,
        block = ?outcome.receipt.block_number,
        "mint confirmed"
    );

    let mut reply = format!(
        "✅ NFT Minted Successfully!\n\nTransaction: {:#x}",
        outcome.tx_hash
    );

    if let Some(group_chat) = bot.config.group_chat() {
        match gatekeeper::create_group_invite(bot, group_chat).await {
            Ok(link) => {
                reply.push_str(&format!(
                    "\n\n🎉 Join our exclusive group:\n{link}\n\n\
                    ⚠️ This invite link will expire in 5 minutes!"
                ));
            }
            Err(e) => warn!("Failed to create group invite after mint: {e}"),
        }
    }

    bot.bot.send_message(message.chat.id, reply).await?;
    Ok(())
}

async fn handle_balance(bot: &MintBot, message: &Message, user_id: UserId) -> Result<()> {
    let Some(session) = bot.sessions.get(user_id) else {
        bot.bot
            .send_message(
                message.chat.id,
                "❌ Please connect your wallet first using /connect",
            )
            .await?;
        return Ok(());
    };

    let address = session.address();
    let balances = async {
        let nft = bot.gateway.token_balance(address).await?;
        let eth = bot.gateway.native_balance(address).await?;
        Ok::<_, BotError>((nft, eth))
    }
    .await;

    let reply = match balances {
        Ok((nft, eth)) => format!("💰 Wallet Balance:\n\nNFTs: {nft}\nETH: {eth}"),
        Err(e) => format!("❌ Error checking balance: {e}"),
    };
    bot.bot.send_message(message.chat.id, reply).await?;
    Ok(())
}

async fn handle_collection(bot: &MintBot, message: &Message, user_id: UserId) -> Result<()> {
    let Some(session) = bot.sessions.get(user_id) else {
        bot.bot
            .send_message(
                message.chat.id,
                "❌ Please connect your wallet first using /connect",
            )
            .await?;
        return Ok(());
    };

    let tokens = match bot.gateway.owned_tokens(session.address()).await {
        Ok(tokens) => tokens,
        Err(e) => {
            bot.bot
                .send_message(message.chat.id, format!("❌ Error fetching collection: {e}"))
                .await?;
            return Ok(());
        }
    };

    if tokens.is_empty() {
        bot.bot
            .send_message(
                message.chat.id,
                "🖼️ You don't have any NFTs yet. Use /mint to get your first one!",
            )
            .await?;
        return Ok(());
    }

    let mut reply = String::from("🖼️ Your NFT Collection:\n\n");
    for token in &tokens {
        reply.push_str(&format!(
            "NFT #{}\nMetadata: {}\n\n",
            token.token_id, token.token_uri
        ));
    }

    for chunk in chunk_message(reply.trim_end(), TELEGRAM_MESSAGE_LIMIT) {
        bot.bot.send_message(message.chat.id, chunk).await?;
    }
    Ok(())
}

/// User-facing text for a failed mint; the cooldown and funding cases get
/// their own wording.
fn mint_error_message(err: &BotError) -> String {
    match err {
        BotError::Revert(RevertReason::CooldownActive) => {
            "❌ You must wait 24 hours between mints.".to_string()
        }
        BotError::Revert(RevertReason::InsufficientFunds) => {
            "❌ Insufficient funds for gas fees.".to_string()
        }
        other => format!("❌ Error minting NFT: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/connect"), Some(("connect", "")));
        assert_eq!(parse_command("/connect 0x123"), Some(("connect", "0x123")));
        assert_eq!(parse_command("/mint@mintgate_bot"), Some(("mint", "")));
        assert_eq!(parse_command("/import"), Some(("import", "")));
        assert_eq!(parse_command("/balance"), Some(("balance", "")));
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command(""), None);
        assert_eq!(
            parse_command("test test test test test test test test test test test junk"),
            None
        );
    }

    #[test]
    fn commands_are_case_sensitive() {
        // "/Connect" parses as a command but matches no handler arm.
        let (cmd, _) = parse_command("/Connect").unwrap();
        assert_ne!(cmd, "connect");
    }

    #[test]
    fn help_text_lists_all_commands() {
        for cmd in ["/connect", "/import", "/mint", "/balance", "/collection"] {
            assert!(HELP_TEXT.contains(cmd), "help text missing {cmd}");
        }
    }

    #[test]
    fn cooldown_revert_gets_specific_message() {
        let msg = mint_error_message(&BotError::Revert(RevertReason::CooldownActive));
        assert_eq!(msg, "❌ You must wait 24 hours between mints.");
    }

    #[test]
    fn insufficient_funds_gets_specific_message() {
        let msg = mint_error_message(&BotError::Revert(RevertReason::InsufficientFunds));
        assert_eq!(msg, "❌ Insufficient funds for gas fees.");
    }

    #[test]
    fn generic_revert_gets_generic_message() {
        let msg = mint_error_message(&BotError::Revert(RevertReason::Other(
            "mint paused".to_string(),
        )));
        assert!(msg.starts_with("❌ Error minting NFT:"));
        assert!(msg.contains("mint paused"));
    }

    #[test]
    fn rpc_failure_gets_generic_message() {
        let msg = mint_error_message(&BotError::Rpc("connection refused".to_string()));
        assert!(msg.starts_with("❌ Error minting NFT:"));
    }
}
