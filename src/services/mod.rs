//! Collaborator interfaces and their shipped default backends
//!
//! Everything here is consumed by the core through a trait; a deployment
//! that holds real wallet keys replaces the custodial defaults.

pub mod crypto;
pub mod fees;
pub mod signer;
pub mod wallet;

pub use crypto::{CryptoService, CustodialCrypto};
pub use fees::{FeeEstimator, FixedFeeEstimator, GatewayFeeEstimator};
pub use signer::{CustodialSigner, Signer};
pub use wallet::{GatewayConfig, StaticWallet, WalletProvider};
