//! The request router
//!
//! Decode once, gate on the origin's capabilities, dispatch, and always
//! answer with a typed response envelope. Nothing thrown by a handler ever
//! crosses the transport boundary; every fault becomes a `res:false`
//! envelope carrying its message.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::{required_capability, PermissionStore};
use crate::events::EventLog;
use crate::gate::AuthorizationGate;
use crate::router::envelope::{
    ChunkRequest, ConnectRequest, CryptoRequest, EndRequest, RequestEnvelope, RequestPayload,
    ResponseBody, ResponseEnvelope, SignTransactionRequest,
};
use crate::services::{CryptoService, Signer, WalletProvider};
use crate::session::{Reassembler, SessionStore};
use crate::types::{Result, WicketError};

const PERMISSION_DENIED: &str = "Insufficient permissions";
const UNKNOWN_ERROR: &str = "Unknown error";

/// Everything a router dispatch can touch
pub struct Router {
    pub permissions: Arc<dyn PermissionStore>,
    pub sessions: Arc<SessionStore>,
    pub reassembler: Reassembler,
    pub gate: Arc<AuthorizationGate>,
    pub signer: Arc<dyn Signer>,
    pub crypto: Arc<dyn CryptoService>,
    pub wallet: Arc<dyn WalletProvider>,
    pub events: Arc<EventLog>,
}

impl Router {
    /// Parse a raw text frame and dispatch it.
    ///
    /// An unparsable frame still gets an answer: the response type echoes
    /// whatever `type` string the frame carried (or `error`), with the
    /// uniform validation message.
    pub async fn dispatch_text(&self, origin: &str, raw: &str) -> ResponseEnvelope {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                warn!(origin = %origin, error = %e, "Unparsable request frame");
                return ResponseEnvelope::failure("error", None, UNKNOWN_ERROR);
            }
        };

        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("error")
            .to_string();
        let call_id = value
            .get("call_id")
            .and_then(|c| c.as_str())
            .map(String::from);

        let envelope: RequestEnvelope = match serde_json::from_value(value) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(origin = %origin, kind = %kind, error = %e, "Malformed request envelope");
                return ResponseEnvelope::failure(&kind, call_id, UNKNOWN_ERROR);
            }
        };

        self.dispatch(origin, envelope).await
    }

    /// Gate, dispatch, and wrap one decoded request
    pub async fn dispatch(&self, origin: &str, envelope: RequestEnvelope) -> ResponseEnvelope {
        let operation = envelope.payload.operation();
        let call_id = envelope.call_id.clone();
        let gated = required_capability(operation);

        if let Some(capability) = gated {
            let granted = self.permissions.granted(origin).await;
            if !granted.contains(&capability) {
                debug!(
                    origin = %origin,
                    operation = %operation,
                    capability = %capability,
                    "Operation denied: capability not granted"
                );
                return ResponseEnvelope::failure(operation, call_id, PERMISSION_DENIED);
            }
        }

        match self.handle(origin, envelope.payload).await {
            Ok(body) => {
                if gated.is_some() {
                    self.events.record(operation, origin);
                }
                ResponseEnvelope::success(operation, call_id, body)
            }
            Err(error) => {
                debug!(origin = %origin, operation = %operation, error = %error, "Request failed");
                ResponseEnvelope::failure(operation, call_id, &error.to_string())
            }
        }
    }

    async fn handle(&self, origin: &str, payload: RequestPayload) -> Result<ResponseBody> {
        match payload {
            RequestPayload::Connect(req) => self.handle_connect(origin, req).await,
            RequestPayload::Disconnect => self.handle_disconnect(origin).await,
            RequestPayload::SignTransaction(req) => self.handle_sign_transaction(origin, req),
            RequestPayload::SignTransactionChunk(req) => self.handle_chunk(origin, req),
            RequestPayload::SignTransactionEnd(req) => self.handle_end(origin, req).await,
            RequestPayload::Encrypt(req) => self.handle_encrypt(req).await,
            RequestPayload::Decrypt(req) => self.handle_decrypt(req).await,
            RequestPayload::Signature(req) => self.handle_signature(req).await,
            RequestPayload::GetActiveAddress => Ok(ResponseBody::Address {
                address: self.wallet.active_address().await?,
            }),
            RequestPayload::GetAllAddresses => Ok(ResponseBody::Addresses {
                addresses: self.wallet.all_addresses().await?,
            }),
            RequestPayload::GetActivePublicKey => Ok(ResponseBody::PublicKey {
                public_key: self.wallet.active_public_key().await?,
            }),
            RequestPayload::GetWalletNames => Ok(ResponseBody::WalletNames {
                names: self.wallet.wallet_names().await?,
            }),
            RequestPayload::GetArweaveConfig => Ok(ResponseBody::Gateway {
                config: self.wallet.gateway_config().await?,
            }),
        }
    }

    async fn handle_connect(&self, origin: &str, req: ConnectRequest) -> Result<ResponseBody> {
        if req.permissions.is_empty() {
            return Err(WicketError::Validation(
                "connect with empty capability list".to_string(),
            ));
        }
        self.permissions
            .grant(origin, req.permissions, req.app_info)
            .await;
        Ok(ResponseBody::Empty {})
    }

    /// Revoke the grant and purge the origin's open sessions, so a
    /// disconnected site cannot finish an in-flight signing session
    async fn handle_disconnect(&self, origin: &str) -> Result<ResponseBody> {
        self.permissions.revoke(origin).await;
        self.sessions.remove_origin(origin);
        Ok(ResponseBody::Empty {})
    }

    fn handle_sign_transaction(
        &self,
        origin: &str,
        req: SignTransactionRequest,
    ) -> Result<ResponseBody> {
        self.sessions
            .create(&req.collection_id, origin, req.transaction)?;
        Ok(ResponseBody::Empty {})
    }

    fn handle_chunk(&self, origin: &str, req: ChunkRequest) -> Result<ResponseBody> {
        self.reassembler
            .append(origin, &req.collection_id, req.fragment)?;
        Ok(ResponseBody::Empty {})
    }

    /// Finalize → authorize → sign. The session is destroyed by finalize,
    /// before authorization can fail.
    async fn handle_end(&self, origin: &str, req: EndRequest) -> Result<ResponseBody> {
        let transaction = self.reassembler.finalize(origin, &req.collection_id)?;

        self.gate.authorize(origin, &transaction).await?;

        let receipt = self.signer.sign(&transaction, &req.options).await?;
        Ok(ResponseBody::Signed {
            id: receipt.id,
            signature: receipt.signature,
        })
    }

    async fn handle_encrypt(&self, req: CryptoRequest) -> Result<ResponseBody> {
        let data = self.crypto.encrypt(&req.data, &req.options).await?;
        Ok(ResponseBody::Data { data })
    }

    async fn handle_decrypt(&self, req: CryptoRequest) -> Result<ResponseBody> {
        let data = self.crypto.decrypt(&req.data, &req.options).await?;
        Ok(ResponseBody::Data { data })
    }

    async fn handle_signature(&self, req: CryptoRequest) -> Result<ResponseBody> {
        let data = self.crypto.sign_data(&req.data, &req.options).await?;
        Ok(ResponseBody::Data { data })
    }
}
