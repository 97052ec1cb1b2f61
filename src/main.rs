//! Wicket - signing gateway for browser wallets

use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wicket::auth::MemoryPermissionStore;
use wicket::config::Args;
use wicket::events::{EventLog, EVENT_LOG_CAPACITY};
use wicket::gate::{AuthorizationGate, GateConfig, MemoryLedger, RejectingPrompt};
use wicket::router::Router;
use wicket::server::{self, AppState};
use wicket::services::{
    CustodialCrypto, CustodialSigner, GatewayConfig, GatewayFeeEstimator, Signer, StaticWallet,
};
use wicket::session::{Reassembler, SessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("wicket={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    info!("======================================");
    info!("  Wicket - Wallet Signing Gateway");
    info!("======================================");
    info!("Node ID: {}", args.node_id);
    info!("Listen: {}", args.listen);
    info!("Gateway: {}", args.gateway_url);
    info!("Fee multiplier: {}", args.fee_multiplier);
    info!("Session TTL: {}s", args.session_ttl_secs);
    info!("Sessions per origin: {}", args.max_sessions_per_origin);
    info!("Max data size: {} bytes", args.max_data_size);
    info!("Confirm timeout: {}s", args.confirm_timeout_secs);
    info!("======================================");

    let gateway = match GatewayConfig::from_url(&args.gateway_url) {
        Ok(g) => g,
        Err(e) => {
            error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let events = Arc::new(EventLog::new(EVENT_LOG_CAPACITY));
    let permissions = Arc::new(MemoryPermissionStore::new());
    let sessions = Arc::new(SessionStore::new(
        args.session_ttl_secs,
        args.max_sessions_per_origin,
        args.max_data_size,
    ));
    let reassembler = Reassembler::new(sessions.clone());

    let ledger = Arc::new(MemoryLedger::new());
    let fees = Arc::new(GatewayFeeEstimator::new(
        args.gateway_url.clone(),
        args.fee_multiplier,
    ));
    let gate = Arc::new(AuthorizationGate::new(
        ledger,
        fees,
        Arc::new(RejectingPrompt),
        GateConfig {
            confirm_timeout: Duration::from_secs(args.confirm_timeout_secs),
        },
    ));

    let signer = Arc::new(CustodialSigner::generate());
    info!("Custodial wallet address: {}", signer.address());

    let wallet = Arc::new(StaticWallet::new(
        signer.address(),
        signer.owner(),
        args.wallet_name.clone(),
        gateway,
    ));
    let crypto = Arc::new(CustodialCrypto::generate());

    let router = Arc::new(Router {
        permissions,
        sessions,
        reassembler,
        gate,
        signer,
        crypto,
        wallet,
        events: events.clone(),
    });

    let state = Arc::new(AppState::new(args, router, events));
    if let Err(e) = server::run(state).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
    Ok(())
}
