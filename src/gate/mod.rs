//! Authorization gate: price computation and spending allowances

pub mod allowance;
pub mod prompt;
pub mod service;

pub use allowance::{Allowance, AllowanceLedger, MemoryLedger};
pub use prompt::{Confirmation, ConfirmationPrompt, RejectingPrompt};
pub use service::{AuthorizationGate, GateConfig};
