//! Request routing: envelope decoding, permission gating, dispatch

pub mod dispatch;
pub mod envelope;

pub use dispatch::Router;
pub use envelope::{
    ChunkRequest, ConnectRequest, CryptoRequest, EndRequest, RequestEnvelope, RequestPayload,
    ResponseBody, ResponseEnvelope, SignTransactionRequest,
};
