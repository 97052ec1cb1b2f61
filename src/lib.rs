//! Wicket - signing gateway for browser wallets
//!
//! Wicket is the trusted mediator between untrusted web pages and a wallet
//! signer. It receives signing requests over WebSocket, reconstructs large
//! transaction payloads from size-limited fragments, enforces per-origin
//! permissions and spending allowances, and only then lets a signature
//! happen.
//!
//! ## Components
//!
//! - **Router**: envelope validation, permission gating, dispatch
//! - **Session store**: in-flight signing sessions keyed by collection id,
//!   origin-scoped
//! - **Reassembler**: ordered fragment accumulation and finalization
//! - **Gate**: price computation against per-origin spending allowances
//! - **Services**: collaborator traits (signer, crypto, wallet, fees) and
//!   their custodial defaults

pub mod auth;
pub mod config;
pub mod events;
pub mod gate;
pub mod router;
pub mod server;
pub mod services;
pub mod session;
pub mod tx;
pub mod types;

pub use config::Args;
pub use router::Router;
pub use server::{run, AppState};
pub use types::{Result, WicketError};
