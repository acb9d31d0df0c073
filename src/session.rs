//! Per-user wallet sessions and the pending-import state machine.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use teloxide::types::{ChatId, Message, UserId};

/// Binding between a Telegram user and a wallet credential.
///
/// The wallet is immutable after creation; `/import` replaces the whole
/// session rather than mutating it.
#[derive(Clone)]
pub struct Session {
    pub wallet: PrivateKeySigner,
    /// Ciphertext of the imported private key, written once at import
    /// time. Never decrypted by the bot.
    pub encrypted_secret: Option<String>,
}

impl Session {
    pub fn new(wallet: PrivateKeySigner) -> Self {
        Self {
            wallet,
            encrypted_secret: None,
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }
}

/// Injected store interface for wallet sessions.
///
/// `insert_if_absent` is the compare-and-swap primitive that makes
/// `/connect` idempotent even when two invocations race across an await
/// point: the first insert wins and the second call observes it.
pub trait SessionStore: Send + Sync {
    fn get(&self, user_id: UserId) -> Option<Session>;

    fn put(&self, user_id: UserId, session: Session);

    /// Inserts `candidate` only if the user has no session yet. Returns
    /// the stored session and whether this call created it.
    fn insert_if_absent(&self, user_id: UserId, candidate: Session) -> (Session, bool);
}

/// In-memory session store. No eviction, no TTL; lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<UserId, Session>>,
}

impl SessionStore for MemorySessionStore {
    fn get(&self, user_id: UserId) -> Option<Session> {
        self.sessions
            .read()
            .expect("session store lock poisoned")
            .get(&user_id)
            .cloned()
    }

    fn put(&self, user_id: UserId, session: Session) {
        self.sessions
            .write()
            .expect("session store lock poisoned")
            .insert(user_id, session);
    }

    fn insert_if_absent(&self, user_id: UserId, candidate: Session) -> (Session, bool) {
        let mut sessions = self.sessions.write().expect("session store lock poisoned");
        match sessions.entry(user_id) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                entry.insert(candidate.clone());
                (candidate, true)
            }
        }
    }
}

/// Tracks which users the bot is expecting a credential from.
///
/// `/import` arms the state for the requesting user in the requesting
/// chat; only that user's next message in that chat is consumed as the
/// credential. This scoping is deliberate: a global "next message"
/// capture would let another user's message be swallowed as a secret.
#[derive(Default)]
pub struct PendingImports {
    awaiting: RwLock<HashMap<UserId, ChatId>>,
}

impl PendingImports {
    pub fn begin(&self, user_id: UserId, chat_id: ChatId) {
        self.awaiting
            .write()
            .expect("pending imports lock poisoned")
            .insert(user_id, chat_id);
    }

    /// Consumes the pending state for `user_id` if it was armed for
    /// `chat_id`. Returns whether the caller should treat the current
    /// message as a credential.
    pub fn take(&self, user_id: UserId, chat_id: ChatId) -> bool {
        let mut awaiting = self.awaiting.write().expect("pending imports lock poisoned");
        match awaiting.get(&user_id) {
            Some(armed_chat) if *armed_chat == chat_id => {
                awaiting.remove(&user_id);
                true
            }
            _ => false,
        }
    }
}

/// Attempts to extract the sender's user id from a message.
///
/// Returns `None` for messages without a sender (e.g. anonymous admin posts).
pub fn user_id_from_message(message: &Message) -> Option<UserId> {
    message.from.as_ref().map(|user| user.id)
}
