//! Configuration for Wicket
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;
use uuid::Uuid;

use crate::types::{Result, WicketError};

/// Wicket - signing gateway for browser wallets
#[derive(Parser, Debug, Clone)]
#[command(name = "wicket")]
#[command(about = "Signing gateway mediating untrusted pages into a wallet signer")]
pub struct Args {
    /// Unique node identifier for this instance
    #[arg(long, env = "NODE_ID", default_value_t = Uuid::new_v4())]
    pub node_id: Uuid,

    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Gateway base URL for fee queries and the arweave config answer
    #[arg(long, env = "GATEWAY_URL", default_value = "https://arweave.net")]
    pub gateway_url: String,

    /// Fee multiplier applied on top of the gateway price (>= 1.0)
    #[arg(long, env = "FEE_MULTIPLIER", default_value = "1.0")]
    pub fee_multiplier: f64,

    /// Seconds an interactive confirmation may stay pending before it
    /// auto-rejects
    #[arg(long, env = "CONFIRM_TIMEOUT_SECS", default_value = "120")]
    pub confirm_timeout_secs: u64,

    /// Signing session time-to-live in seconds
    #[arg(long, env = "SESSION_TTL_SECS", default_value = "600")]
    pub session_ttl_secs: u64,

    /// Maximum concurrent open sessions per origin
    #[arg(long, env = "MAX_SESSIONS_PER_ORIGIN", default_value = "16")]
    pub max_sessions_per_origin: usize,

    /// Maximum declared transaction data size in bytes (default 100 MiB)
    #[arg(long, env = "MAX_DATA_SIZE", default_value = "104857600")]
    pub max_data_size: u64,

    /// Display name for the custodial wallet
    #[arg(long, env = "WALLET_NAME", default_value = "Main")]
    pub wallet_name: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Cross-field validation, run before anything binds
    pub fn validate(&self) -> Result<()> {
        if self.fee_multiplier < 1.0 || !self.fee_multiplier.is_finite() {
            return Err(WicketError::Config(format!(
                "fee_multiplier must be a finite value >= 1.0, got {}",
                self.fee_multiplier
            )));
        }
        if self.max_data_size == 0 {
            return Err(WicketError::Config(
                "max_data_size must be positive".to_string(),
            ));
        }
        if self.max_sessions_per_origin == 0 {
            return Err(WicketError::Config(
                "max_sessions_per_origin must be positive".to_string(),
            ));
        }
        if self.confirm_timeout_secs == 0 {
            return Err(WicketError::Config(
                "confirm_timeout_secs must be positive".to_string(),
            ));
        }
        if !self.gateway_url.starts_with("http://") && !self.gateway_url.starts_with("https://") {
            return Err(WicketError::Config(format!(
                "gateway_url must be an http(s) URL, got {}",
                self.gateway_url
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["wicket"])
    }

    #[test]
    fn test_defaults_validate() {
        assert!(base_args().validate().is_ok());
    }

    #[test]
    fn test_rejects_fractional_multiplier() {
        let mut args = base_args();
        args.fee_multiplier = 0.5;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_limits() {
        let mut args = base_args();
        args.max_data_size = 0;
        assert!(args.validate().is_err());

        let mut args = base_args();
        args.max_sessions_per_origin = 0;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_gateway() {
        let mut args = base_args();
        args.gateway_url = "ws://arweave.net".to_string();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_flag_parsing() {
        let args = Args::parse_from([
            "wicket",
            "--listen",
            "127.0.0.1:9000",
            "--fee-multiplier",
            "1.5",
            "--max-sessions-per-origin",
            "4",
        ]);
        assert_eq!(args.listen.port(), 9000);
        assert_eq!(args.fee_multiplier, 1.5);
        assert_eq!(args.max_sessions_per_origin, 4);
    }
}
