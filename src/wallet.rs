//! Wallet provisioning: fresh wallets and credential import.

use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner, coins_bip39::English};

use crate::error::{BotError, BotResult};
use crate::session::Session;

const MNEMONIC_WORD_COUNT: usize = 12;

/// Creates a session around a freshly generated wallet.
pub fn create_session() -> Session {
    Session::new(PrivateKeySigner::random())
}

/// Parses an imported credential into a signer.
///
/// Exactly twelve whitespace-separated words are treated as a BIP-39
/// mnemonic (account index 0); a `0x`-prefixed string as a hex private
/// key. Anything else is rejected as [`BotError::InvalidCredentialFormat`]
/// without touching the session store. Well-shaped input that fails to
/// parse (bad checksum, bad hex) yields [`BotError::CredentialParse`].
pub fn import_from_secret(raw: &str) -> BotResult<PrivateKeySigner> {
    let raw = raw.trim();

    if raw.split_whitespace().count() == MNEMONIC_WORD_COUNT {
        MnemonicBuilder::<English>::default()
            .phrase(raw)
            .index(0)
            .map_err(|e| BotError::CredentialParse(e.to_string()))?
            .build()
            .map_err(|e| BotError::CredentialParse(e.to_string()))
    } else if raw.starts_with("0x") {
        raw.parse::<PrivateKeySigner>()
            .map_err(|e| BotError::CredentialParse(e.to_string()))
    } else {
        Err(BotError::InvalidCredentialFormat)
    }
}

/// Hex rendering of a wallet's private key, `0x`-prefixed.
pub fn private_key_hex(signer: &PrivateKeySigner) -> String {
    format!("0x{}", hex::encode(signer.to_bytes()))
}
