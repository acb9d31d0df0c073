//! Symmetric encryption of imported private keys.
//!
//! Imported secrets are kept alongside the session as XChaCha20-Poly1305
//! ciphertext, base64-encoded, under a key derived from the process-wide
//! passphrase. The bot writes this value once at import time and never
//! decrypts it.

use base64::{Engine, engine::general_purpose::STANDARD};
use chacha20poly1305::{
    XChaCha20Poly1305,
    aead::{Aead, AeadCore, KeyInit, OsRng},
};
use sha2::{Digest, Sha256};

use crate::error::{BotError, BotResult};

const NONCE_LEN: usize = 24;

fn derive_key(passphrase: &str) -> [u8; 32] {
    Sha256::digest(passphrase.as_bytes()).into()
}

/// Encrypts `plaintext` with a key derived from `passphrase`.
///
/// Output layout: `base64(nonce || ciphertext)` with a fresh random nonce,
/// so encrypting the same secret twice yields different ciphertexts.
pub fn encrypt_secret(plaintext: &str, passphrase: &str) -> BotResult<String> {
    let key = derive_key(passphrase);
    let cipher = XChaCha20Poly1305::new((&key).into());
    let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| BotError::Encryption(e.to_string()))?;

    let mut payload = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    payload.extend_from_slice(&nonce);
    payload.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chacha20poly1305::XNonce;

    fn decrypt_secret(encoded: &str, passphrase: &str) -> BotResult<String> {
        let payload = STANDARD
            .decode(encoded)
            .map_err(|e| BotError::Encryption(e.to_string()))?;
        if payload.len() < NONCE_LEN {
            return Err(BotError::Encryption("ciphertext too short".into()));
        }
        let (nonce, ciphertext) = payload.split_at(NONCE_LEN);
        let key = derive_key(passphrase);
        let cipher = XChaCha20Poly1305::new((&key).into());
        let plaintext = cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|e| BotError::Encryption(e.to_string()))?;
        String::from_utf8(plaintext).map_err(|e| BotError::Encryption(e.to_string()))
    }

    #[test]
    fn roundtrip_recovers_plaintext() {
        let secret = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
        let encoded = encrypt_secret(secret, "passphrase").unwrap();
        assert_eq!(decrypt_secret(&encoded, "passphrase").unwrap(), secret);
    }

    #[test]
    fn nonce_makes_ciphertexts_distinct() {
        let one = encrypt_secret("secret", "passphrase").unwrap();
        let two = encrypt_secret("secret", "passphrase").unwrap();
        assert_ne!(one, two);
    }

    #[test]
    fn wrong_passphrase_fails_decryption() {
        let encoded = encrypt_secret("secret", "passphrase").unwrap();
        assert!(decrypt_secret(&encoded, "other").is_err());
    }

    #[test]
    fn output_is_valid_base64() {
        let encoded = encrypt_secret("secret", "passphrase").unwrap();
        assert!(STANDARD.decode(&encoded).is_ok());
    }
}
