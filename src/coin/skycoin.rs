//! Skycoin Backend
//!
//! Talks to a skycoin node's REST API:
//! - `GET /outputs?addrs=a,b` and `GET /outputs?hashes=h1,h2` for unspent outputs
//! - `GET /uxout?uxid=<hash>` for a single output
//!
//! Coin values arrive as decimal strings in whole coins and are converted to
//! droplets (1e-6 SKY) before they leave this module.

use serde::Deserialize;
use std::sync::Arc;

use crate::api::NodeClient;
use crate::error::{GatewayError, GatewayResult};
use crate::types::{CoinType, GeneratedAddresses, Output};
use crate::utils::logging::{redact_addresses, redact_hash};
use crate::utils::HttpTransport;
use crate::wallet::{
    validate_output_hash, AddressDeriver, AddressEncoding, AmountPolicy, DeriverConfig, SkyAddress,
};

use super::{CoinBackend, Utxo};

/// Default node address of a local skycoin node
pub const DEFAULT_NODE_ADDR: &str = "127.0.0.1:6420";

const NULL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// =============================================================================
// Node Response Types
// =============================================================================

/// Entry of the `/outputs` array
#[derive(Debug, Deserialize)]
struct SkyOutputRecord {
    hash: String,
    src_tx: String,
    address: String,
    coins: String,
    hours: u64,
}

/// Body of `/uxout`
#[derive(Debug, Deserialize)]
struct SkyUxOut {
    uxid: String,
    time: u64,
    src_block_seq: u64,
    src_tx: String,
    owner_address: String,
    coins: u64,
    hours: u64,
    #[serde(default)]
    spent_block_seq: u64,
    #[serde(default)]
    spent_tx: String,
}

impl From<SkyUxOut> for Output {
    fn from(ux: SkyUxOut) -> Self {
        let spent = !ux.spent_tx.is_empty() && ux.spent_tx != NULL_HASH;
        Output {
            hash: ux.uxid,
            time: ux.time,
            src_block_seq: ux.src_block_seq,
            src_tx: ux.src_tx,
            owner_address: ux.owner_address,
            coins: ux.coins,
            hours: ux.hours,
            spent_block_seq: spent.then_some(ux.spent_block_seq),
            spent_tx: spent.then_some(ux.spent_tx),
        }
    }
}

// =============================================================================
// Adapter
// =============================================================================

/// Skycoin unspent output; `coins` is in droplets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkyUtxo {
    hash: String,
    src_tx: String,
    address: String,
    coins: u64,
    hours: u64,
}

impl TryFrom<SkyOutputRecord> for SkyUtxo {
    type Error = GatewayError;

    fn try_from(record: SkyOutputRecord) -> Result<Self, Self::Error> {
        let coins = AmountPolicy::SKYCOIN.from_backend_units(&record.coins)?;
        Ok(SkyUtxo {
            hash: record.hash,
            src_tx: record.src_tx,
            address: record.address,
            coins,
            hours: record.hours,
        })
    }
}

impl Utxo for SkyUtxo {
    fn hash(&self) -> &str {
        &self.hash
    }

    fn src_tx(&self) -> &str {
        &self.src_tx
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn coins(&self) -> u64 {
        self.coins
    }

    fn hours(&self) -> u64 {
        self.hours
    }
}

/// Transaction output paying `coins` droplets to `address`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub address: SkyAddress,
    pub coins: u64,
    pub hours: u64,
}

// =============================================================================
// Backend
// =============================================================================

pub struct SkycoinBackend {
    client: NodeClient,
    deriver: AddressDeriver,
}

impl SkycoinBackend {
    pub fn new(
        node_addr: &str,
        transport: Arc<dyn HttpTransport>,
        deriver_config: DeriverConfig,
    ) -> GatewayResult<Self> {
        Ok(Self {
            client: NodeClient::new(node_addr, transport)?,
            deriver: AddressDeriver::new(deriver_config, AddressEncoding::Skycoin),
        })
    }

    /// Unspent outputs owned by any of `addresses`
    pub fn fetch_utxos_by_addresses(&self, addresses: &[String]) -> GatewayResult<Vec<SkyUtxo>> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }
        let addresses = addresses
            .iter()
            .map(|a| SkyAddress::decode(a).map(|decoded| decoded.to_string()))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            count = addresses.len(),
            addrs = %redact_addresses(&addresses),
            "fetching skycoin outputs by address"
        );
        self.fetch_outputs("addrs", &addresses)
    }

    /// Unspent outputs with the given hashes
    pub fn fetch_utxos_by_hashes(&self, hashes: &[String]) -> GatewayResult<Vec<SkyUtxo>> {
        if hashes.is_empty() {
            return Ok(Vec::new());
        }
        for hash in hashes {
            validate_output_hash(hash)?;
        }

        tracing::debug!(count = hashes.len(), "fetching skycoin outputs by hash");
        self.fetch_outputs("hashes", hashes)
    }

    fn fetch_outputs(&self, param: &str, values: &[String]) -> GatewayResult<Vec<SkyUtxo>> {
        let query = format!("{}={}", param, values.join(","));
        let records: Vec<SkyOutputRecord> = self.client.get_json("/outputs", Some(&query))?;

        records.into_iter().map(SkyUtxo::try_from).collect()
    }

    /// Single output by hash, spent or not
    pub fn fetch_output(&self, hash: &str) -> GatewayResult<Output> {
        validate_output_hash(hash)?;

        tracing::debug!(uxid = %redact_hash(hash), "fetching skycoin output");
        let ux: SkyUxOut = self.client.get_json("/uxout", Some(&format!("uxid={}", hash)))?;
        Ok(ux.into())
    }

    /// Build an output record; the amount must be a whole number of coins.
    pub fn make_tx_out(&self, address: &str, coins: u64, hours: u64) -> GatewayResult<TxOut> {
        self.validate_amount(coins)?;
        let address = SkyAddress::decode(address)?;
        Ok(TxOut {
            address,
            coins,
            hours,
        })
    }
}

impl CoinBackend for SkycoinBackend {
    fn coin_type(&self) -> CoinType {
        CoinType::Skycoin
    }

    fn get_utxos(&self, addresses: &[String]) -> GatewayResult<Vec<Box<dyn Utxo>>> {
        let utxos = self.fetch_utxos_by_addresses(addresses)?;
        Ok(utxos.into_iter().map(|u| Box::new(u) as Box<dyn Utxo>).collect())
    }

    fn get_output(&self, hash: &str) -> GatewayResult<Output> {
        self.fetch_output(hash)
    }

    fn generate_addresses(&self, seed: &[u8], count: usize) -> GatewayResult<GeneratedAddresses> {
        self.deriver.derive(seed, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn record(coins: &str) -> SkyOutputRecord {
        SkyOutputRecord {
            hash: "a".repeat(64),
            src_tx: "b".repeat(64),
            address: "2GgFvqoyk9RjwVzj8tqfcXVXB4orBwoc9qv".to_string(),
            coins: coins.to_string(),
            hours: 42,
        }
    }

    #[test]
    fn test_adapter_converts_coins() {
        let utxo = SkyUtxo::try_from(record("7")).unwrap();
        assert_eq!(utxo.coins(), 7_000_000);
        assert_eq!(utxo.hours(), 42);
        assert_eq!(utxo.src_tx(), "b".repeat(64));

        let view = utxo.view();
        assert_eq!(view.hash, "a".repeat(64));
        assert_eq!(view.coins, 7_000_000);
    }

    #[test]
    fn test_adapter_rejects_bad_amount() {
        let err = SkyUtxo::try_from(record("seven")).unwrap_err();
        assert_eq!(err.code, ErrorCode::MalformedResponse);
    }

    #[test]
    fn test_record_decoding() {
        let json = r#"[{"hash":"h","src_tx":"t","address":"a","coins":"1.5","hours":3}]"#;
        let records: Vec<SkyOutputRecord> = serde_json::from_str(json).unwrap();
        let utxo = SkyUtxo::try_from(records.into_iter().next().unwrap()).unwrap();
        assert_eq!(utxo.coins(), 1_500_000);
    }

    #[test]
    fn test_uxout_spent_mapping() {
        let unspent: SkyUxOut = serde_json::from_str(&format!(
            r#"{{"uxid":"u","time":1,"src_block_seq":2,"src_tx":"t","owner_address":"o","coins":1000000,"hours":5,"spent_block_seq":0,"spent_tx":"{}"}}"#,
            NULL_HASH
        ))
        .unwrap();
        let output = Output::from(unspent);
        assert!(!output.is_spent());
        assert_eq!(output.spent_block_seq, None);

        let spent: SkyUxOut = serde_json::from_str(
            r#"{"uxid":"u","time":1,"src_block_seq":2,"src_tx":"t","owner_address":"o","coins":1000000,"hours":5,"spent_block_seq":9,"spent_tx":"abc"}"#,
        )
        .unwrap();
        let output = Output::from(spent);
        assert!(output.is_spent());
        assert_eq!(output.spent_block_seq, Some(9));
    }
}
