//! The authorization decision
//!
//! price = fee estimate + declared transfer quantity. An enabled allowance
//! is charged silently while it lasts and rejects deterministically once the
//! price would exceed the limit; without an enabled allowance the gate falls
//! back to the interactive prompt, bounded by a timeout that behaves like a
//! rejection.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::gate::allowance::AllowanceLedger;
use crate::gate::prompt::{Confirmation, ConfirmationPrompt};
use crate::services::FeeEstimator;
use crate::tx::{Transaction, Winston};
use crate::types::{Result, WicketError};

/// Gate tunables
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Upper bound on how long a confirmation prompt may stay pending
    pub confirm_timeout: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(120),
        }
    }
}

/// Computes the price of a reconstructed transaction and decides whether it
/// may be signed
pub struct AuthorizationGate {
    ledger: Arc<dyn AllowanceLedger>,
    fees: Arc<dyn FeeEstimator>,
    prompt: Arc<dyn ConfirmationPrompt>,
    config: GateConfig,

    /// Per-origin locks making check-then-increment one atomic step
    origin_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl AuthorizationGate {
    pub fn new(
        ledger: Arc<dyn AllowanceLedger>,
        fees: Arc<dyn FeeEstimator>,
        prompt: Arc<dyn ConfirmationPrompt>,
        config: GateConfig,
    ) -> Self {
        Self {
            ledger,
            fees,
            prompt,
            config,
            origin_locks: DashMap::new(),
        }
    }

    /// Authorize signing of `transaction` on behalf of `origin`.
    ///
    /// Returns the computed price on approval. A rejection of any kind
    /// leaves the ledger untouched.
    pub async fn authorize(&self, origin: &str, transaction: &Transaction) -> Result<Winston> {
        let fee = self.fees.estimate(transaction).await?;
        let price = fee.checked_add(transaction.quantity)?;

        let lock = {
            let entry = self
                .origin_locks
                .entry(origin.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())));
            entry.value().clone()
        };
        let _guard = lock.lock().await;

        match self.ledger.get(origin).await {
            Some(allowance) if allowance.enabled => {
                let would_spend = allowance.spent.checked_add(price)?;
                if would_spend <= allowance.limit {
                    self.ledger.increment(origin, price).await?;
                    debug!(
                        origin = %origin,
                        price = %price,
                        spent = %would_spend,
                        limit = %allowance.limit,
                        "Charged allowance"
                    );
                    Ok(price)
                } else {
                    Err(WicketError::Authorization(
                        "Spending limit exceeded for origin".to_string(),
                    ))
                }
            }
            _ => self.confirm_interactively(origin, price).await,
        }
    }

    async fn confirm_interactively(&self, origin: &str, price: Winston) -> Result<Winston> {
        info!(origin = %origin, price = %price, "Asking user to confirm signing");

        let outcome =
            tokio::time::timeout(self.config.confirm_timeout, self.prompt.confirm(origin, price))
                .await;

        match outcome {
            Ok(Confirmation::Approved) => Ok(price),
            Ok(Confirmation::Rejected) => Err(WicketError::Authorization(
                "Transaction rejected by user".to_string(),
            )),
            Err(_) => Err(WicketError::Authorization(
                "Confirmation timed out".to_string(),
            )),
        }
    }
}
