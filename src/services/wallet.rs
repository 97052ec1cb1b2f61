//! Wallet directory collaborator
//!
//! Addresses, wallet names and the gateway configuration live outside this
//! core; the static default answers from configuration plus the custodial
//! signer's derived identity.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::{Result, WicketError};

/// Gateway (host/port/protocol) a connected site should talk to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    pub protocol: String,
}

impl GatewayConfig {
    /// Parse from a gateway URL such as `https://arweave.net`
    pub fn from_url(url: &str) -> Result<Self> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| WicketError::Config(format!("Invalid gateway URL: {e}")))?;

        let protocol = parsed.scheme().to_string();
        let host = parsed
            .host_str()
            .ok_or_else(|| WicketError::Config("Gateway URL has no host".to_string()))?
            .to_string();
        let port = parsed
            .port_or_known_default()
            .ok_or_else(|| WicketError::Config("Gateway URL has no port".to_string()))?;

        Ok(Self {
            host,
            port,
            protocol,
        })
    }
}

#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn active_address(&self) -> Result<String>;
    async fn all_addresses(&self) -> Result<Vec<String>>;
    async fn active_public_key(&self) -> Result<String>;
    async fn wallet_names(&self) -> Result<HashMap<String, String>>;
    async fn gateway_config(&self) -> Result<GatewayConfig>;
}

/// Configuration-backed wallet directory
pub struct StaticWallet {
    address: String,
    public_key: String,
    name: String,
    gateway: GatewayConfig,
}

impl StaticWallet {
    pub fn new(address: String, public_key: String, name: String, gateway: GatewayConfig) -> Self {
        Self {
            address,
            public_key,
            name,
            gateway,
        }
    }
}

#[async_trait]
impl WalletProvider for StaticWallet {
    async fn active_address(&self) -> Result<String> {
        Ok(self.address.clone())
    }

    async fn all_addresses(&self) -> Result<Vec<String>> {
        Ok(vec![self.address.clone()])
    }

    async fn active_public_key(&self) -> Result<String> {
        Ok(self.public_key.clone())
    }

    async fn wallet_names(&self) -> Result<HashMap<String, String>> {
        let mut names = HashMap::new();
        names.insert(self.address.clone(), self.name.clone());
        Ok(names)
    }

    async fn gateway_config(&self) -> Result<GatewayConfig> {
        Ok(self.gateway.clone())
    }
}
