//! Bitcoin Backend
//!
//! Talks to an Esplora-compatible REST API:
//! - `GET /address/<addr>/utxo` per address (the API has no multi-address query)
//! - `GET /tx/<txid>` and `GET /tx/<txid>/outspend/<vout>` for a single output
//!
//! Output hashes are outpoints, `"<txid>:<vout>"`. Values are satoshis.

use bitcoin::Network;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::NodeClient;
use crate::error::{GatewayError, GatewayResult};
use crate::types::{CoinType, GeneratedAddresses, Output};
use crate::utils::logging::{redact_address, redact_hash};
use crate::utils::HttpTransport;
use crate::wallet::{
    validate_bitcoin_address, validate_output_hash, AddressDeriver, AddressEncoding, DeriverConfig,
};

use super::{CoinBackend, Utxo};

/// Default address of a local Esplora/electrs HTTP server
pub const DEFAULT_NODE_ADDR: &str = "127.0.0.1:3000";

// =============================================================================
// API Response Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    value: u64,
    status: EsploraStatus,
}

#[derive(Debug, Default, Deserialize)]
struct EsploraStatus {
    confirmed: bool,
    block_height: Option<u64>,
    block_time: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EsploraTx {
    txid: String,
    vout: Vec<EsploraVout>,
    #[serde(default)]
    status: EsploraStatus,
}

#[derive(Debug, Deserialize)]
struct EsploraVout {
    scriptpubkey_address: Option<String>,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct EsploraOutspend {
    spent: bool,
    txid: Option<String>,
    status: Option<EsploraStatus>,
}

// =============================================================================
// Adapter
// =============================================================================

/// Bitcoin unspent output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BtcUtxo {
    outpoint: String,
    txid: String,
    vout: u32,
    address: String,
    value: u64,
    block_height: Option<u64>,
}

impl BtcUtxo {
    fn from_record(address: &str, record: EsploraUtxo) -> Self {
        let block_height = if record.status.confirmed {
            record.status.block_height
        } else {
            None
        };
        BtcUtxo {
            outpoint: format!("{}:{}", record.txid, record.vout),
            txid: record.txid,
            vout: record.vout,
            address: address.to_string(),
            value: record.value,
            block_height,
        }
    }

    pub fn vout(&self) -> u32 {
        self.vout
    }

    /// Height of the confirming block, `None` while in the mempool
    pub fn block_height(&self) -> Option<u64> {
        self.block_height
    }
}

impl Utxo for BtcUtxo {
    fn hash(&self) -> &str {
        &self.outpoint
    }

    fn src_tx(&self) -> &str {
        &self.txid
    }

    fn address(&self) -> &str {
        &self.address
    }

    fn coins(&self) -> u64 {
        self.value
    }

    fn hours(&self) -> u64 {
        0
    }
}

/// Split and check an `"<txid>:<vout>"` outpoint
pub fn parse_outpoint(hash: &str) -> GatewayResult<(&str, u32)> {
    let (txid, vout) = hash.split_once(':').ok_or_else(|| {
        GatewayError::invalid_argument("invalid output hash, expected <txid>:<vout>")
    })?;
    validate_output_hash(txid)?;
    let vout = vout
        .parse::<u32>()
        .map_err(|e| GatewayError::invalid_argument(format!("invalid output index: {}", e)))?;
    Ok((txid, vout))
}

// =============================================================================
// Backend
// =============================================================================

pub struct BitcoinBackend {
    client: NodeClient,
    deriver: AddressDeriver,
    network: Network,
}

impl BitcoinBackend {
    pub fn new(
        node_addr: &str,
        network: Network,
        transport: Arc<dyn HttpTransport>,
        deriver_config: DeriverConfig,
    ) -> GatewayResult<Self> {
        Ok(Self {
            client: NodeClient::new(node_addr, transport)?,
            deriver: AddressDeriver::new(deriver_config, AddressEncoding::BitcoinP2pkh(network)),
            network,
        })
    }

    pub fn network(&self) -> Network {
        self.network
    }

    pub fn fetch_utxos(&self, addresses: &[String]) -> GatewayResult<Vec<BtcUtxo>> {
        for address in addresses {
            validate_bitcoin_address(address, self.network)?;
        }

        let mut utxos = Vec::new();
        for address in addresses {
            tracing::debug!(address = %redact_address(address), "fetching bitcoin utxos");
            let records: Vec<EsploraUtxo> = self
                .client
                .get_json(&format!("/address/{}/utxo", address.trim()), None)?;
            utxos.extend(records.into_iter().map(|r| BtcUtxo::from_record(address.trim(), r)));
        }
        Ok(utxos)
    }

    pub fn fetch_output(&self, hash: &str) -> GatewayResult<Output> {
        let (txid, vout) = parse_outpoint(hash)?;

        tracing::debug!(txid = %redact_hash(txid), vout, "fetching bitcoin output");
        let tx: EsploraTx = self.client.get_json(&format!("/tx/{}", txid), None)?;
        let out = tx.vout.get(vout as usize).ok_or_else(|| {
            GatewayError::backend_error(format!("Transaction {} has no output {}", txid, vout))
        })?;

        let outspend: EsploraOutspend = self
            .client
            .get_json(&format!("/tx/{}/outspend/{}", txid, vout), None)?;
        let (spent_tx, spent_block_seq) = if outspend.spent {
            (
                outspend.txid,
                outspend.status.and_then(|s| s.block_height),
            )
        } else {
            (None, None)
        };

        Ok(Output {
            hash: format!("{}:{}", tx.txid, vout),
            time: tx.status.block_time.unwrap_or_default(),
            src_block_seq: tx.status.block_height.unwrap_or_default(),
            src_tx: tx.txid.clone(),
            owner_address: out.scriptpubkey_address.clone().unwrap_or_default(),
            coins: out.value,
            hours: 0,
            spent_block_seq,
            spent_tx,
        })
    }
}

impl CoinBackend for BitcoinBackend {
    fn coin_type(&self) -> CoinType {
        CoinType::Bitcoin
    }

    fn get_utxos(&self, addresses: &[String]) -> GatewayResult<Vec<Box<dyn Utxo>>> {
        let utxos = self.fetch_utxos(addresses)?;
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

    #[test]
    fn test_parse_outpoint() {
        let txid = "c".repeat(64);
        let hash = format!("{}:3", txid);
        let (parsed, vout) = parse_outpoint(&hash).unwrap();
        assert_eq!(parsed, txid);
        assert_eq!(vout, 3);

        assert!(parse_outpoint(&txid).unwrap_err().is_invalid_argument());
        assert!(parse_outpoint(&format!("{}:x", txid)).unwrap_err().is_invalid_argument());
        assert!(parse_outpoint("abc:0").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_utxo_from_record() {
        let json = r#"{"txid":"ab","vout":1,"value":5000,"status":{"confirmed":true,"block_height":800000}}"#;
        let record: EsploraUtxo = serde_json::from_str(json).unwrap();
        let utxo = BtcUtxo::from_record("1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2", record);

        assert_eq!(utxo.hash(), "ab:1");
        assert_eq!(utxo.src_tx(), "ab");
        assert_eq!(utxo.coins(), 5000);
        assert_eq!(utxo.hours(), 0);
        assert_eq!(utxo.block_height(), Some(800000));
    }

    #[test]
    fn test_unconfirmed_has_no_height() {
        let json = r#"{"txid":"ab","vout":0,"value":1,"status":{"confirmed":false}}"#;
        let record: EsploraUtxo = serde_json::from_str(json).unwrap();
        let utxo = BtcUtxo::from_record("addr", record);
        assert_eq!(utxo.block_height(), None);
    }
}
