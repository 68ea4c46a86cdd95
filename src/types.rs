//! Shared types for the gateway
//!
//! All data structures that cross module boundaries are defined here
//! for consistent serialization.

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{ErrorCode, GatewayError, WireCode};

// =============================================================================
// Coin Types
// =============================================================================

/// Coin backends the gateway can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoinType {
    Skycoin,
    Bitcoin,
}

impl CoinType {
    pub fn name(&self) -> &'static str {
        match self {
            CoinType::Skycoin => "skycoin",
            CoinType::Bitcoin => "bitcoin",
        }
    }
}

impl std::fmt::Display for CoinType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for CoinType {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skycoin" | "sky" => Ok(CoinType::Skycoin),
            "bitcoin" | "btc" => Ok(CoinType::Bitcoin),
            _ => Err(GatewayError::unsupported_coin(format!("Unknown coin type: {}", s))),
        }
    }
}

// =============================================================================
// Address Types
// =============================================================================

/// One derived address with its key pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub address: String,
    pub public: String,
    /// Absent when the gateway is configured to hide secret keys.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Result of one derivation batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAddresses {
    /// Hex digest of the seed material after the last derivation step
    pub seed_digest: String,
    pub entries: Vec<AddressEntry>,
}

// =============================================================================
// Output Types
// =============================================================================

/// Single-output lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub hash: String,
    pub time: u64,
    pub src_block_seq: u64,
    pub src_tx: String,
    pub owner_address: String,
    /// Value in the coin's smallest unit
    pub coins: u64,
    pub hours: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_block_seq: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent_tx: Option<String>,
}

impl Output {
    pub fn is_spent(&self) -> bool {
        self.spent_tx.is_some()
    }
}

/// Serializable snapshot of a [`crate::coin::Utxo`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoView {
    pub hash: String,
    pub src_tx: String,
    pub address: String,
    pub coins: u64,
    pub hours: u64,
}

// =============================================================================
// Request/Response Types
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUtxoRequest {
    pub coin_type: CoinType,
    #[serde(default)]
    pub addresses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetUtxoResponse {
    pub coin_type: CoinType,
    pub utxos: Vec<UtxoView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetOutputRequest {
    pub coin_type: CoinType,
    pub hash: String,
}

/// Seed text is wiped when the request is dropped.
#[derive(Debug, Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct GenerateAddressesRequest {
    #[zeroize(skip)]
    pub coin_type: CoinType,
    /// Hex-encoded seed
    pub seed: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateAddressesResponse {
    pub coin_type: CoinType,
    pub seed_digest: String,
    pub entries: Vec<AddressEntry>,
}

/// Error body sent to exchange clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub code: WireCode,
    pub kind: ErrorCode,
    pub message: String,
}

impl From<&GatewayError> for ApiError {
    fn from(e: &GatewayError) -> Self {
        Self {
            code: e.code.wire_code(),
            kind: e.code,
            message: e.message.clone(),
        }
    }
}

/// Standard API response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: &GatewayError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError::from(error)),
        }
    }

    /// Reply used when the request body itself cannot be bound.
    pub fn wrong_request(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: WireCode::WrongRequest,
                kind: ErrorCode::InvalidArgument,
                message: message.into(),
            }),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":{"code":"server_error","kind":"malformed_response","message":"Serialization failed"}}"#.to_string()
        })
    }
}
