//! Wire envelopes for the wallet API
//!
//! Requests are a closed tagged union keyed by `type` with a type-specific
//! `payload`, decoded once at the router boundary. Responses echo
//! `<type>_result` plus `res`, an optional `message`, and the request's
//! `call_id` so the page-side bridge can correlate.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::auth::{AppInfo, Capability};
use crate::services::GatewayConfig;
use crate::tx::{base64_bytes, Fragment, SignatureOptions, Transaction};

/// Inbound request envelope. The origin is NOT part of the envelope; it
/// comes from the transport and is handed to the router separately.
#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    #[serde(flatten)]
    pub payload: RequestPayload,

    #[serde(default)]
    pub call_id: Option<String>,
}

/// The closed set of wallet operations
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum RequestPayload {
    Connect(ConnectRequest),
    Disconnect,
    SignTransaction(SignTransactionRequest),
    SignTransactionChunk(ChunkRequest),
    SignTransactionEnd(EndRequest),
    Encrypt(CryptoRequest),
    Decrypt(CryptoRequest),
    Signature(CryptoRequest),
    GetActiveAddress,
    GetAllAddresses,
    GetActivePublicKey,
    GetWalletNames,
    GetArweaveConfig,
}

impl RequestPayload {
    /// Wire name of the operation, used for gating, auditing and the
    /// response type echo
    pub fn operation(&self) -> &'static str {
        match self {
            RequestPayload::Connect(_) => "connect",
            RequestPayload::Disconnect => "disconnect",
            RequestPayload::SignTransaction(_) => "sign_transaction",
            RequestPayload::SignTransactionChunk(_) => "sign_transaction_chunk",
            RequestPayload::SignTransactionEnd(_) => "sign_transaction_end",
            RequestPayload::Encrypt(_) => "encrypt",
            RequestPayload::Decrypt(_) => "decrypt",
            RequestPayload::Signature(_) => "signature",
            RequestPayload::GetActiveAddress => "get_active_address",
            RequestPayload::GetAllAddresses => "get_all_addresses",
            RequestPayload::GetActivePublicKey => "get_active_public_key",
            RequestPayload::GetWalletNames => "get_wallet_names",
            RequestPayload::GetArweaveConfig => "get_arweave_config",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    pub permissions: Vec<Capability>,

    #[serde(default)]
    pub app_info: Option<AppInfo>,
}

#[derive(Debug, Deserialize)]
pub struct SignTransactionRequest {
    pub collection_id: String,

    /// Transaction skeleton; `data` and `tags` arrive empty and are filled
    /// from fragments
    pub transaction: Transaction,

    #[serde(default)]
    pub options: SignatureOptions,
}

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub collection_id: String,
    pub fragment: Fragment,
}

#[derive(Debug, Deserialize)]
pub struct EndRequest {
    pub collection_id: String,

    #[serde(default)]
    pub options: SignatureOptions,
}

#[derive(Debug, Deserialize)]
pub struct CryptoRequest {
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,

    #[serde(default)]
    pub options: serde_json::Value,
}

/// Outbound response envelope
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: String,

    pub res: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,

    #[serde(flatten)]
    pub body: ResponseBody,
}

impl ResponseEnvelope {
    pub fn success(operation: &str, call_id: Option<String>, body: ResponseBody) -> Self {
        Self {
            kind: format!("{operation}_result"),
            res: true,
            message: None,
            call_id,
            body,
        }
    }

    pub fn failure(operation: &str, call_id: Option<String>, message: &str) -> Self {
        Self {
            kind: format!("{operation}_result"),
            res: false,
            message: Some(message.to_string()),
            call_id,
            body: ResponseBody::Empty {},
        }
    }
}

/// Type-specific success fields, flattened into the envelope
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Empty {},
    Signed {
        id: String,
        signature: String,
    },
    Data {
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
    },
    Address {
        address: String,
    },
    Addresses {
        addresses: Vec<String>,
    },
    PublicKey {
        public_key: String,
    },
    WalletNames {
        names: HashMap<String, String>,
    },
    Gateway {
        config: GatewayConfig,
    },
}
