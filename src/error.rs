//! Unified error types for the gateway
//!
//! Every component returns a [`GatewayError`]; only the request handlers
//! turn one into a wire-level error response.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Main error type for all gateway operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<String>,
    /// Underlying cause, kept for diagnostics only.
    #[serde(skip)]
    source: Option<Arc<dyn std::error::Error + Send + Sync>>,
}

impl GatewayError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Attach the originating error. Its text is also recorded in `details`.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.details = Some(source.to_string());
        self.source = Some(Arc::new(source));
        self
    }

    // Convenience constructors
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidArgument, msg)
    }

    pub fn backend_unreachable(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BackendUnreachable, msg)
    }

    pub fn malformed_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::MalformedResponse, msg)
    }

    pub fn backend_error(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BackendError, msg)
    }

    pub fn unsupported_coin(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::UnsupportedCoin, msg)
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.code == ErrorCode::InvalidArgument
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed hash, address, amount or seed, caught before any I/O
    InvalidArgument,
    /// Transport-level failure: refused, timed out, DNS
    BackendUnreachable,
    /// Backend answered with something we cannot decode
    MalformedResponse,
    /// Backend answered with a non-success status
    BackendError,
    /// No backend registered for the requested coin type
    UnsupportedCoin,
}

impl ErrorCode {
    /// Code reported to exchange clients.
    pub fn wire_code(&self) -> WireCode {
        match self {
            ErrorCode::InvalidArgument => WireCode::WrongRequest,
            _ => WireCode::ServerError,
        }
    }
}

/// Error codes of the exchange wire protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireCode {
    WrongRequest,
    ServerError,
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

// Conversions from common error types

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::malformed_response("Failed to decode backend response").with_source(e)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            "Backend request timed out"
        } else if e.is_connect() {
            "Backend connection failed"
        } else {
            "Backend request failed"
        };
        GatewayError::backend_unreachable(message).with_source(e)
    }
}

impl From<hex::FromHexError> for GatewayError {
    fn from(e: hex::FromHexError) -> Self {
        GatewayError::invalid_argument(format!("Invalid hex: {}", e))
    }
}
