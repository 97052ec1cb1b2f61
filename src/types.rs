//! Error types for Wicket
//!
//! One variant per fault class. Session, permission, reconstruction and
//! authorization faults display their bare message because that message is
//! echoed verbatim to the calling page in the response envelope.

use hyper::StatusCode;

/// Main error type for Wicket operations
#[derive(Debug, thiserror::Error)]
pub enum WicketError {
    /// Malformed envelope or unknown message type
    #[error("Unknown error")]
    Validation(String),

    /// Origin lacks a required capability
    #[error("{0}")]
    Permission(String),

    /// Fragment or finalize request referencing a missing/foreign session,
    /// collection id collisions, session caps
    #[error("{0}")]
    Session(String),

    /// Assembled data does not tile the declared size
    #[error("{0}")]
    Reconstruction(String),

    /// Allowance exceeded, user rejection, or confirmation timeout
    #[error("{0}")]
    Authorization(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Fee estimation error: {0}")]
    Fees(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WicketError {
    /// Convert error to HTTP status code (for the plain HTTP routes)
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Permission(_) => StatusCode::FORBIDDEN,
            Self::Session(_) => StatusCode::NOT_FOUND,
            Self::Reconstruction(_) => StatusCode::BAD_REQUEST,
            Self::Authorization(_) => StatusCode::FORBIDDEN,
            Self::Signing(_) => StatusCode::BAD_GATEWAY,
            Self::Crypto(_) => StatusCode::BAD_REQUEST,
            Self::Fees(_) => StatusCode::BAD_GATEWAY,
            Self::WebSocket(_) => StatusCode::BAD_GATEWAY,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Implement From conversions for common error types

impl From<std::io::Error> for WicketError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for WicketError {
    fn from(err: serde_json::Error) -> Self {
        Self::Validation(format!("JSON error: {}", err))
    }
}

impl From<reqwest::Error> for WicketError {
    fn from(err: reqwest::Error) -> Self {
        Self::Fees(err.to_string())
    }
}

impl From<hyper_tungstenite::tungstenite::Error> for WicketError {
    fn from(err: hyper_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(err.to_string())
    }
}

/// Result type alias for Wicket operations
pub type Result<T> = std::result::Result<T, WicketError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_displays_uniform_message() {
        let err = WicketError::Validation("missing field `payload`".to_string());
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[test]
    fn test_session_fault_displays_bare_message() {
        let err = WicketError::Session("Invalid origin for end request".to_string());
        assert_eq!(err.to_string(), "Invalid origin for end request");
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WicketError::Permission("nope".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            WicketError::Internal("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
