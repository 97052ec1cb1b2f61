//! Fee estimation
//!
//! The gateway estimator asks the configured gateway what a transaction of
//! the declared size costs (`/price/{bytes}`, or `/price/{bytes}/{target}`
//! when the transaction transfers to a target) and applies the configured
//! multiplier. The fixed estimator exists for tests and offline use.

use async_trait::async_trait;

use crate::tx::{Transaction, Winston};
use crate::types::{Result, WicketError};

#[async_trait]
pub trait FeeEstimator: Send + Sync {
    /// Estimated network fee in winston for the given transaction
    async fn estimate(&self, transaction: &Transaction) -> Result<Winston>;
}

/// HTTP fee estimator backed by a gateway's price endpoint
pub struct GatewayFeeEstimator {
    client: reqwest::Client,
    base_url: String,
    multiplier: f64,
}

impl GatewayFeeEstimator {
    pub fn new(base_url: String, multiplier: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            multiplier,
        }
    }
}

#[async_trait]
impl FeeEstimator for GatewayFeeEstimator {
    async fn estimate(&self, transaction: &Transaction) -> Result<Winston> {
        let url = if transaction.target.is_empty() {
            format!("{}/price/{}", self.base_url, transaction.data_size)
        } else {
            format!(
                "{}/price/{}/{}",
                self.base_url, transaction.data_size, transaction.target
            )
        };

        let body = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let base: u128 = body
            .trim()
            .parse()
            .map_err(|e| WicketError::Fees(format!("Gateway returned invalid price: {e}")))?;

        Ok(apply_multiplier(base, self.multiplier))
    }
}

/// Apply the fee multiplier, rounding up
fn apply_multiplier(base: u128, multiplier: f64) -> Winston {
    if multiplier <= 1.0 {
        return Winston(base);
    }
    Winston((base as f64 * multiplier).ceil() as u128)
}

/// Constant fee, for tests and offline operation
pub struct FixedFeeEstimator(pub Winston);

#[async_trait]
impl FeeEstimator for FixedFeeEstimator {
    async fn estimate(&self, _transaction: &Transaction) -> Result<Winston> {
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiplier_identity() {
        assert_eq!(apply_multiplier(1000, 1.0), Winston(1000));
        assert_eq!(apply_multiplier(1000, 0.5), Winston(1000));
    }

    #[test]
    fn test_multiplier_rounds_up() {
        assert_eq!(apply_multiplier(1000, 1.5), Winston(1500));
        assert_eq!(apply_multiplier(3, 1.1), Winston(4));
        assert_eq!(apply_multiplier(0, 2.0), Winston(0));
    }

    #[tokio::test]
    async fn test_fixed_estimator() {
        let estimator = FixedFeeEstimator(Winston(42));
        let tx = Transaction {
            format: 2,
            id: String::new(),
            last_tx: String::new(),
            owner: String::new(),
            target: String::new(),
            quantity: Winston(0),
            reward: Winston(0),
            data_size: 100,
            data: Vec::new(),
            tags: Vec::new(),
        };
        assert_eq!(estimator.estimate(&tx).await.unwrap(), Winston(42));
    }
}
