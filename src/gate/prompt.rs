//! Interactive confirmation collaborator
//!
//! When an origin has no enabled allowance, the gate falls back to asking a
//! human. The real prompt lives in the popup UI outside this core; the
//! default backend rejects, which is the safe behavior for a headless
//! deployment.

use async_trait::async_trait;
use tracing::warn;

use crate::tx::Winston;

/// Outcome of an interactive confirmation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Approved,
    Rejected,
}

#[async_trait]
pub trait ConfirmationPrompt: Send + Sync {
    /// Ask the user to approve spending `amount` on behalf of `origin`.
    /// May stay pending on human input; the gate bounds the wait.
    async fn confirm(&self, origin: &str, amount: Winston) -> Confirmation;
}

/// Default backend: reject everything and say so in the log
pub struct RejectingPrompt;

#[async_trait]
impl ConfirmationPrompt for RejectingPrompt {
    async fn confirm(&self, origin: &str, amount: Winston) -> Confirmation {
        warn!(
            origin = %origin,
            amount = %amount,
            "No confirmation UI wired in; rejecting signing request"
        );
        Confirmation::Rejected
    }
}
