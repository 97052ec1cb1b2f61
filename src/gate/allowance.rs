//! Per-origin spending allowance ledger
//!
//! The ledger is owned by an external collaborator (the settings UI layer
//! configures limits); the gate only reads entries and records increments.
//! The shipped default keeps entries in process memory.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tx::Winston;
use crate::types::{Result, WicketError};

/// One origin's spending state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Allowance {
    pub spent: Winston,
    pub limit: Winston,
    pub enabled: bool,
}

#[async_trait]
pub trait AllowanceLedger: Send + Sync {
    /// Current allowance for an origin, if one is configured
    async fn get(&self, origin: &str) -> Option<Allowance>;

    /// Record an authorized spend against the origin's allowance
    async fn increment(&self, origin: &str, amount: Winston) -> Result<()>;
}

/// DashMap-backed allowance table
#[derive(Default)]
pub struct MemoryLedger {
    entries: DashMap<String, Allowance>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace an origin's allowance (spent resets to zero)
    pub fn configure(&self, origin: &str, limit: Winston, enabled: bool) {
        info!(origin = %origin, limit = %limit, enabled, "Configured allowance");
        self.entries.insert(
            origin.to_string(),
            Allowance {
                spent: Winston::ZERO,
                limit,
                enabled,
            },
        );
    }
}

#[async_trait]
impl AllowanceLedger for MemoryLedger {
    async fn get(&self, origin: &str) -> Option<Allowance> {
        self.entries.get(origin).map(|a| *a)
    }

    async fn increment(&self, origin: &str, amount: Winston) -> Result<()> {
        let mut entry = self.entries.get_mut(origin).ok_or_else(|| {
            WicketError::Internal(format!("No allowance entry for origin {origin}"))
        })?;
        entry.spent = entry.spent.checked_add(amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_origin_has_no_allowance() {
        let ledger = MemoryLedger::new();
        assert!(ledger.get("https://a.example").await.is_none());
    }

    #[tokio::test]
    async fn test_configure_and_increment() {
        let ledger = MemoryLedger::new();
        ledger.configure("https://a.example", Winston(10), true);

        ledger.increment("https://a.example", Winston(4)).await.unwrap();
        let allowance = ledger.get("https://a.example").await.unwrap();
        assert_eq!(allowance.spent, Winston(4));
        assert_eq!(allowance.limit, Winston(10));
    }

    #[tokio::test]
    async fn test_increment_without_entry_fails() {
        let ledger = MemoryLedger::new();
        assert!(ledger
            .increment("https://a.example", Winston(1))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_reconfigure_resets_spent() {
        let ledger = MemoryLedger::new();
        ledger.configure("https://a.example", Winston(10), true);
        ledger.increment("https://a.example", Winston(7)).await.unwrap();

        ledger.configure("https://a.example", Winston(20), true);
        assert_eq!(
            ledger.get("https://a.example").await.unwrap().spent,
            Winston::ZERO
        );
    }
}
