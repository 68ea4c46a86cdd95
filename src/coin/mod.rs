//! Coin Backends
//!
//! Each supported coin provides an adapter type implementing [`Utxo`] and a
//! backend implementing [`CoinBackend`]. Callers only ever see these traits;
//! the node's own record shapes stay private to the backend module.

pub mod btc;
pub mod skycoin;

pub use btc::{BitcoinBackend, BtcUtxo};
pub use skycoin::{SkyUtxo, SkycoinBackend, TxOut};

use crate::error::GatewayResult;
use crate::types::{CoinType, GeneratedAddresses, Output, UtxoView};
use crate::wallet::AmountPolicy;

/// Uniform view of an unspent output, in the gateway's internal units
pub trait Utxo: Send + Sync + std::fmt::Debug {
    /// Identifying hash of the output
    fn hash(&self) -> &str;
    /// Transaction that created the output
    fn src_tx(&self) -> &str;
    fn address(&self) -> &str;
    /// Spendable value in the coin's smallest unit
    fn coins(&self) -> u64;
    /// Secondary value (coin hours); 0 for coins without one
    fn hours(&self) -> u64;

    fn view(&self) -> UtxoView {
        UtxoView {
            hash: self.hash().to_string(),
            src_tx: self.src_tx().to_string(),
            address: self.address().to_string(),
            coins: self.coins(),
            hours: self.hours(),
        }
    }
}

/// Operations the dispatcher needs from one coin.
///
/// Implementations hold no mutable state and are shared across callers.
pub trait CoinBackend: Send + Sync {
    fn coin_type(&self) -> CoinType;

    /// Unspent outputs owned by `addresses`. Empty input yields an empty list
    /// without contacting the node.
    fn get_utxos(&self, addresses: &[String]) -> GatewayResult<Vec<Box<dyn Utxo>>>;

    /// Look up one output by hash. The hash is validated before any request.
    fn get_output(&self, hash: &str) -> GatewayResult<Output>;

    /// Derive `count` addresses from `seed`.
    fn generate_addresses(&self, seed: &[u8], count: usize) -> GatewayResult<GeneratedAddresses>;

    fn amount_policy(&self) -> AmountPolicy {
        AmountPolicy::for_coin(self.coin_type())
    }

    fn validate_amount(&self, amount: u64) -> GatewayResult<()> {
        self.amount_policy().validate_amount(amount)
    }
}
