//! Transaction signing
//!
//! The custodial default holds an in-process Ed25519 keypair and signs the
//! transaction's canonical digest. The transaction id is
//! base64url(sha256(signature)), the signature itself travels as base64.

use async_trait::async_trait;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use ed25519_dalek::{Signer as DalekSigner, SigningKey};
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::tx::{SignatureOptions, SignedReceipt, Transaction};
use crate::types::Result;

#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign a reconstructed transaction
    async fn sign(
        &self,
        transaction: &Transaction,
        options: &SignatureOptions,
    ) -> Result<SignedReceipt>;

    /// Owner public key, base64url
    fn owner(&self) -> String;

    /// Wallet address derived from the public key, base64url(sha256(pubkey))
    fn address(&self) -> String;
}

/// In-process Ed25519 signer
pub struct CustodialSigner {
    key: SigningKey,
}

impl CustodialSigner {
    /// Generate a fresh keypair
    pub fn generate() -> Self {
        Self {
            key: SigningKey::generate(&mut OsRng),
        }
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(bytes),
        }
    }

    pub fn verifying_key(&self) -> ed25519_dalek::VerifyingKey {
        self.key.verifying_key()
    }
}

#[async_trait]
impl Signer for CustodialSigner {
    async fn sign(
        &self,
        transaction: &Transaction,
        _options: &SignatureOptions,
    ) -> Result<SignedReceipt> {
        let digest = transaction.signing_digest();
        let signature = self.key.sign(&digest);
        let sig_bytes = signature.to_bytes();

        let id = URL_SAFE_NO_PAD.encode(Sha256::digest(sig_bytes));
        debug!(id = %id, data_size = transaction.data_size, "Signed transaction");

        Ok(SignedReceipt {
            id,
            signature: STANDARD.encode(sig_bytes),
        })
    }

    fn owner(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.key.verifying_key().as_bytes())
    }

    fn address(&self) -> String {
        URL_SAFE_NO_PAD.encode(Sha256::digest(self.key.verifying_key().as_bytes()))
    }
}
