//! Encrypt/decrypt/signature collaborator for the opaque crypto operations
//!
//! Payloads are forwarded untouched from the router; options are opaque JSON
//! the backend may interpret. The custodial default uses ChaCha20-Poly1305
//! with a random nonce prefixed to the ciphertext, and raw Ed25519
//! signatures for the `signature` operation.

use async_trait::async_trait;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::{ChaCha20Poly1305, Key, KeyInit, Nonce};
use ed25519_dalek::{Signer as DalekSigner, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::{Result, WicketError};

/// Nonce length for ChaCha20-Poly1305 (12 bytes)
const NONCE_LEN: usize = 12;

#[async_trait]
pub trait CryptoService: Send + Sync {
    async fn encrypt(&self, data: &[u8], options: &serde_json::Value) -> Result<Vec<u8>>;
    async fn decrypt(&self, data: &[u8], options: &serde_json::Value) -> Result<Vec<u8>>;
    async fn sign_data(&self, data: &[u8], options: &serde_json::Value) -> Result<Vec<u8>>;
}

/// Symmetric key material, wiped on drop
#[derive(Zeroize, ZeroizeOnDrop)]
struct SecretKey([u8; 32]);

/// In-process crypto backend
pub struct CustodialCrypto {
    cipher_key: SecretKey,
    signing_key: SigningKey,
}

impl CustodialCrypto {
    /// Generate fresh key material
    pub fn generate() -> Self {
        let mut key = [0u8; 32];
        OsRng.fill_bytes(&mut key);
        Self {
            cipher_key: SecretKey(key),
            signing_key: SigningKey::generate(&mut OsRng),
        }
    }

    fn cipher(&self) -> ChaCha20Poly1305 {
        ChaCha20Poly1305::new(Key::from_slice(&self.cipher_key.0))
    }
}

#[async_trait]
impl CryptoService for CustodialCrypto {
    async fn encrypt(&self, data: &[u8], _options: &serde_json::Value) -> Result<Vec<u8>> {
        let mut nonce = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher()
            .encrypt(Nonce::from_slice(&nonce), data)
            .map_err(|e| WicketError::Crypto(format!("Encryption failed: {e}")))?;

        let mut out = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        out.extend_from_slice(&nonce);
        out.extend_from_slice(&ciphertext);
        Ok(out)
    }

    async fn decrypt(&self, data: &[u8], _options: &serde_json::Value) -> Result<Vec<u8>> {
        if data.len() < NONCE_LEN {
            return Err(WicketError::Crypto("Ciphertext too short".to_string()));
        }
        let (nonce, ciphertext) = data.split_at(NONCE_LEN);

        self.cipher()
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| WicketError::Crypto("Decryption failed (tampered or foreign data)".into()))
    }

    async fn sign_data(&self, data: &[u8], _options: &serde_json::Value) -> Result<Vec<u8>> {
        Ok(self.signing_key.sign(data).to_bytes().to_vec())
    }
}
