use serde_json::json;
use teloxide::types::{ChatId, UserId};

use crate::config::BotConfig;
use crate::session::{MemorySessionStore, PendingImports, Session, SessionStore};
use crate::{secrets, wallet};

#[test]
fn config_parses_from_toml() {
    let raw = r#"
        bot_token = "token"
        rpc_url = "http://localhost:8545"
        contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        group_chat_id = -100123
        auto_kick = true
        encryption_passphrase = "pass"
    "#;

    let config: BotConfig = toml::from_str(raw).unwrap();
    assert_eq!(config.bot_token, "token");
    assert_eq!(config.rpc_url, "http://localhost:8545");
    assert_eq!(
        format!("{:#x}", config.contract_address),
        "0x5fbdb2315678afecb367f032d93f642f64180aa3"
    );
    assert_eq!(config.group_chat(), Some(ChatId(-100123)));
    assert!(config.auto_kick);
    assert_eq!(config.encryption_passphrase, "pass");
}

#[test]
fn config_optional_fields_default() {
    let raw = r#"
        bot_token = "token"
        rpc_url = "http://localhost:8545"
        contract_address = "0x5FbDB2315678afecb367f032d93F642f64180aa3"
        encryption_passphrase = "pass"
    "#;

    let config: BotConfig = toml::from_str(raw).unwrap();
    assert_eq!(config.group_chat(), None);
    assert!(!config.auto_kick);
}

#[test]
fn config_rejects_bad_contract_address() {
    let raw = r#"
        bot_token = "token"
        rpc_url = "http://localhost:8545"
        contract_address = "not-an-address"
        encryption_passphrase = "pass"
    "#;

    assert!(toml::from_str::<BotConfig>(raw).is_err());
}

#[test]
fn config_deserializes_from_json() {
    let value = json!({
        "bot_token": "token",
        "rpc_url": "http://localhost:8545",
        "contract_address": "0x5FbDB2315678afecb367f032d93F642f64180aa3",
        "auto_kick": false,
        "encryption_passphrase": "pass"
    });

    let config: BotConfig = serde_json::from_value(value).unwrap();
    assert!(!config.auto_kick);
    assert_eq!(config.group_chat_id, None);
}

// The full /import exchange, minus the transport: arm the pending state,
// consume the credential, encrypt it, store the session.
#[test]
fn import_flow_stores_encrypted_session() {
    let store = MemorySessionStore::default();
    let pending = PendingImports::default();
    let user = UserId(42);
    let chat = ChatId(42);

    pending.begin(user, chat);
    assert!(pending.take(user, chat));

    let signer = wallet::import_from_secret(
        "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
    )
    .unwrap();
    let encrypted =
        secrets::encrypt_secret(&wallet::private_key_hex(&signer), "passphrase").unwrap();

    store.put(
        user,
        Session {
            wallet: signer,
            encrypted_secret: Some(encrypted),
        },
    );

    let session = store.get(user).unwrap();
    assert!(session.encrypted_secret.is_some());
    assert_eq!(
        format!("{:#x}", session.address()),
        "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
    );
}

// Re-import overwrites the previous session explicitly.
#[test]
fn reimport_replaces_existing_session() {
    let store = MemorySessionStore::default();
    let user = UserId(7);

    let (first, created) = store.insert_if_absent(user, wallet::create_session());
    assert!(created);

    let replacement = wallet::create_session();
    let new_address = replacement.address();
    store.put(user, replacement);

    let current = store.get(user).unwrap();
    assert_eq!(current.address(), new_address);
    assert_ne!(current.address(), first.address());
}

// A user with no session can never pass the ownership predicate; the
// gatekeeper treats them as a non-holder without touching the chain.
#[test]
fn unknown_user_has_no_session() {
    let store = MemorySessionStore::default();
    assert!(store.get(UserId(999)).is_none());
}
