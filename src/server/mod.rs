//! HTTP + WebSocket serving surface

pub mod http;
pub mod websocket;

pub use http::{run, AppState};
