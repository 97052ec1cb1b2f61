//! Permission store: which capabilities each origin currently holds
//!
//! Persistence of grants is owned by an external collaborator; the trait is
//! async because a real backing store is a suspension point. The shipped
//! default keeps grants in process memory.

use std::collections::HashSet;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::Capability;

/// Optional app metadata recorded alongside a grant
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Capabilities currently granted to an origin (empty set if unknown)
    async fn granted(&self, origin: &str) -> HashSet<Capability>;

    /// Replace the origin's grant with the given capability set
    async fn grant(&self, origin: &str, capabilities: Vec<Capability>, app_info: Option<AppInfo>);

    /// Drop the origin's grant entirely
    async fn revoke(&self, origin: &str);
}

struct Grant {
    capabilities: HashSet<Capability>,
    #[allow(dead_code)]
    app_info: Option<AppInfo>,
}

/// DashMap-backed grant table
#[derive(Default)]
pub struct MemoryPermissionStore {
    grants: DashMap<String, Grant>,
}

impl MemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn granted(&self, origin: &str) -> HashSet<Capability> {
        self.grants
            .get(origin)
            .map(|g| g.capabilities.clone())
            .unwrap_or_default()
    }

    async fn grant(&self, origin: &str, capabilities: Vec<Capability>, app_info: Option<AppInfo>) {
        info!(origin = %origin, count = capabilities.len(), "Granting capabilities");
        self.grants.insert(
            origin.to_string(),
            Grant {
                capabilities: capabilities.into_iter().collect(),
                app_info,
            },
        );
    }

    async fn revoke(&self, origin: &str) {
        if self.grants.remove(origin).is_some() {
            info!(origin = %origin, "Revoked capabilities");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_origin_has_no_grants() {
        let store = MemoryPermissionStore::new();
        assert!(store.granted("https://unknown.example").await.is_empty());
    }

    #[tokio::test]
    async fn test_grant_replaces_previous_set() {
        let store = MemoryPermissionStore::new();
        store
            .grant(
                "https://a.example",
                vec![Capability::SignTransaction, Capability::Encrypt],
                None,
            )
            .await;

        let granted = store.granted("https://a.example").await;
        assert!(granted.contains(&Capability::SignTransaction));
        assert!(granted.contains(&Capability::Encrypt));

        store
            .grant("https://a.example", vec![Capability::AccessAddress], None)
            .await;
        let granted = store.granted("https://a.example").await;
        assert_eq!(granted.len(), 1);
        assert!(granted.contains(&Capability::AccessAddress));
    }

    #[tokio::test]
    async fn test_revoke() {
        let store = MemoryPermissionStore::new();
        store
            .grant("https://a.example", vec![Capability::Decrypt], None)
            .await;
        store.revoke("https://a.example").await;
        assert!(store.granted("https://a.example").await.is_empty());
    }

    #[tokio::test]
    async fn test_grants_are_origin_scoped() {
        let store = MemoryPermissionStore::new();
        store
            .grant("https://a.example", vec![Capability::SignTransaction], None)
            .await;
        assert!(store.granted("https://b.example").await.is_empty());
    }
}
