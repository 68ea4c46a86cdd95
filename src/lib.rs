//! UTXO Gateway Library
//!
//! Coin backend layer of an exchange server: fetches unspent outputs and
//! single outputs from per-coin nodes, derives deposit addresses from a seed,
//! and dispatches requests by coin type.
//!
//! # Architecture
//!
//! - **wallet**: Address derivation, address/hash codecs, amount policy
//! - **api**: Blocking JSON client for backend node REST APIs
//! - **coin**: `Utxo` / `CoinBackend` traits with skycoin and bitcoin backends
//! - **exchange**: Coin-type registry used by the handlers
//! - **handlers**: Transport-agnostic request handlers returning `ApiResponse`
//! - **config**: TOML configuration
//!
//! # Security
//!
//! Seeds are held in `zeroize` buffers and cleared when dropped. Secret keys
//! only leave the crate in generated address entries, and not at all when
//! `hide_secret_key` is set.
//!
//! # Example
//!
//! ```rust,ignore
//! use utxo_gateway::{config::GatewayConfig, exchange::Exchange, handlers, CoinType, GetUtxoRequest};
//!
//! let exchange = Exchange::from_config(&GatewayConfig::default())?;
//! let res = handlers::get_utxos(&exchange, &GetUtxoRequest {
//!     coin_type: CoinType::Skycoin,
//!     addresses: vec!["2GgFvqoyk9RjwVzj8tqfcXVXB4orBwoc9qv".into()],
//! });
//! println!("{}", res.to_json());
//! ```

pub mod api;
pub mod coin;
pub mod config;
pub mod error;
pub mod exchange;
pub mod handlers;
pub mod types;
pub mod utils;
pub mod wallet;

pub use coin::{CoinBackend, Utxo};
pub use config::GatewayConfig;
pub use error::{ErrorCode, GatewayError, GatewayResult, WireCode};
pub use exchange::Exchange;
pub use types::*;
