//! Transaction model and fragment types
//!
//! Wire conventions follow the wallet protocol: winston amounts and declared
//! byte sizes travel as decimal strings, binary data as base64. A transaction
//! arrives as a skeleton (everything except `data` and `tags`) and is
//! completed later from reassembled fragments.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::types::{Result, WicketError};

/// Winston amount (smallest currency unit). Decimal string on the wire,
/// `u128` internally so allowance arithmetic never silently wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Winston(pub u128);

impl Winston {
    pub const ZERO: Winston = Winston(0);

    pub fn checked_add(self, other: Winston) -> Result<Winston> {
        self.0
            .checked_add(other.0)
            .map(Winston)
            .ok_or_else(|| WicketError::Internal("winston amount overflow".to_string()))
    }
}

impl std::fmt::Display for Winston {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Winston {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<u128>().map(Winston)
    }
}

impl Serialize for Winston {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Winston {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid winston amount: {e}")))
    }
}

/// Base64 encoding for binary payloads
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(bytes: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        STANDARD.encode(bytes).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        STANDARD
            .decode(&s)
            .map_err(|e| serde::de::Error::custom(format!("base64 decode error: {e}")))
    }
}

/// Decimal-string encoding for u64 sizes
pub mod string_u64 {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &u64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_string().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<u64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid size: {e}")))
    }
}

/// Name/value metadata tag attached to a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

/// One signing transaction: skeleton fields plus `data`/`tags`, which arrive
/// empty at session creation and are filled in by the reassembler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction format version
    #[serde(default = "default_format")]
    pub format: u32,

    /// Transaction ID (assigned by the signer)
    #[serde(default)]
    pub id: String,

    /// Anchor: ID of a recent transaction by the same owner
    #[serde(default)]
    pub last_tx: String,

    /// Owner public key (base64url)
    #[serde(default)]
    pub owner: String,

    /// Transfer target address (empty for data-only transactions)
    #[serde(default)]
    pub target: String,

    /// Transfer amount in winston
    #[serde(default)]
    pub quantity: Winston,

    /// Network fee in winston
    #[serde(default)]
    pub reward: Winston,

    /// Declared byte length of the data field
    #[serde(with = "string_u64", default)]
    pub data_size: u64,

    /// Transaction data; empty until reassembly completes
    #[serde(with = "base64_bytes", default)]
    pub data: Vec<u8>,

    /// Metadata tags; empty until reassembly completes
    #[serde(default)]
    pub tags: Vec<Tag>,
}

fn default_format() -> u32 {
    2
}

impl Transaction {
    /// Canonical digest covered by the signature.
    ///
    /// Every field is length-prefixed so no two distinct transactions can
    /// serialize to the same byte stream.
    pub fn signing_digest(&self) -> [u8; 32] {
        fn field(hasher: &mut Sha256, bytes: &[u8]) {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        }

        let mut hasher = Sha256::new();
        field(&mut hasher, self.format.to_string().as_bytes());
        field(&mut hasher, self.owner.as_bytes());
        field(&mut hasher, self.target.as_bytes());
        field(&mut hasher, self.quantity.to_string().as_bytes());
        field(&mut hasher, self.reward.to_string().as_bytes());
        field(&mut hasher, self.last_tx.as_bytes());
        field(&mut hasher, self.data_size.to_string().as_bytes());
        field(&mut hasher, &Sha256::digest(&self.data));
        for tag in &self.tags {
            field(&mut hasher, tag.name.as_bytes());
            field(&mut hasher, tag.value.as_bytes());
        }

        hasher.finalize().into()
    }
}

/// One unit of transmitted payload for a chunked transaction.
///
/// `sequence` orders `data` fragments within a session; it carries no meaning
/// for `tag` fragments, which keep arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub sequence: u64,

    #[serde(flatten)]
    pub payload: FragmentPayload,
}

/// Fragment payload, tagged by `kind` on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FragmentPayload {
    Data(#[serde(with = "base64_bytes")] Vec<u8>),
    Tag(Tag),
}

/// Options accompanying a signing request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignatureOptions {
    #[serde(rename = "saltLength", skip_serializing_if = "Option::is_none")]
    pub salt_length: Option<u32>,
}

/// Signer output: transaction id plus the signature, both wire-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedReceipt {
    pub id: String,
    pub signature: String,
}
