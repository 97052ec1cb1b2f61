//! Capability grants and the operation gating table
//!
//! A capability is a named grant an origin must hold before a gated
//! operation is dispatched. Capabilities are requested by `connect` and
//! checked at the router boundary, never inside handlers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named grants an origin can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Capability {
    SignTransaction,
    Encrypt,
    Decrypt,
    Signature,
    AccessAddress,
    AccessPublicKey,
    AccessAllAddresses,
    AccessArweaveConfig,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Capability::SignTransaction => "SIGN_TRANSACTION",
            Capability::Encrypt => "ENCRYPT",
            Capability::Decrypt => "DECRYPT",
            Capability::Signature => "SIGNATURE",
            Capability::AccessAddress => "ACCESS_ADDRESS",
            Capability::AccessPublicKey => "ACCESS_PUBLIC_KEY",
            Capability::AccessAllAddresses => "ACCESS_ALL_ADDRESSES",
            Capability::AccessArweaveConfig => "ACCESS_ARWEAVE_CONFIG",
        };
        write!(f, "{name}")
    }
}

/// Capability required before an operation is dispatched.
///
/// Returns `None` for ungated operations: `connect`/`disconnect` (connect is
/// how capabilities are granted in the first place) and the session-scoped
/// chunk/end messages, which are protected by the (collection id, origin)
/// session check instead.
pub fn required_capability(operation: &str) -> Option<Capability> {
    match operation {
        "sign_transaction" => Some(Capability::SignTransaction),
        "encrypt" => Some(Capability::Encrypt),
        "decrypt" => Some(Capability::Decrypt),
        "signature" => Some(Capability::Signature),
        "get_active_address" => Some(Capability::AccessAddress),
        "get_active_public_key" => Some(Capability::AccessPublicKey),
        "get_all_addresses" | "get_wallet_names" => Some(Capability::AccessAllAddresses),
        "get_arweave_config" => Some(Capability::AccessArweaveConfig),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gated_operations() {
        assert_eq!(
            required_capability("sign_transaction"),
            Some(Capability::SignTransaction)
        );
        assert_eq!(
            required_capability("get_wallet_names"),
            Some(Capability::AccessAllAddresses)
        );
        assert_eq!(
            required_capability("get_arweave_config"),
            Some(Capability::AccessArweaveConfig)
        );
    }

    #[test]
    fn test_session_scoped_operations_are_ungated() {
        assert_eq!(required_capability("sign_transaction_chunk"), None);
        assert_eq!(required_capability("sign_transaction_end"), None);
        assert_eq!(required_capability("connect"), None);
        assert_eq!(required_capability("disconnect"), None);
    }

    #[test]
    fn test_wire_encoding_is_screaming_snake() {
        let json = serde_json::to_string(&Capability::SignTransaction).unwrap();
        assert_eq!(json, "\"SIGN_TRANSACTION\"");

        let cap: Capability = serde_json::from_str("\"ACCESS_ALL_ADDRESSES\"").unwrap();
        assert_eq!(cap, Capability::AccessAllAddresses);
    }

    #[test]
    fn test_display_matches_wire_encoding() {
        assert_eq!(Capability::AccessPublicKey.to_string(), "ACCESS_PUBLIC_KEY");
    }
}
