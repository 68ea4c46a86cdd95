//! Key Derivation
//!
//! Deterministic address batches from a seed. Each step of the key chain is
//! a pure function of the previous seed, so index `i` of seed `S` always
//! yields the same key pair.
//!
//! SECURITY: Intermediate seed material is zeroized when no longer needed.

use bitcoin::key::CompressedPublicKey;
use bitcoin::secp256k1::{All, PublicKey, Secp256k1, SecretKey};
use bitcoin::{Address, Network};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::error::{GatewayError, GatewayResult};
use crate::types::{AddressEntry, GeneratedAddresses};

use super::address_validation::SkyAddress;

/// Largest batch a single call may derive
pub const MAX_ADDRESS_BATCH: usize = 1000;

/// Process-wide derivation settings, fixed at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeriverConfig {
    /// Leave `AddressEntry::secret` empty
    pub hide_secret_key: bool,
}

/// How a public key is rendered as an address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressEncoding {
    Skycoin,
    BitcoinP2pkh(Network),
}

impl AddressEncoding {
    pub fn encode(&self, public_key: &PublicKey) -> String {
        match self {
            AddressEncoding::Skycoin => SkyAddress::from_public_key(public_key).to_string(),
            AddressEncoding::BitcoinP2pkh(network) => {
                let compressed = CompressedPublicKey(*public_key);
                Address::p2pkh(compressed.pubkey_hash(), *network).to_string()
            }
        }
    }
}

/// Derives batches of address entries from a seed
#[derive(Debug, Clone)]
pub struct AddressDeriver {
    config: DeriverConfig,
    encoding: AddressEncoding,
    secp: Secp256k1<All>,
}

impl AddressDeriver {
    pub fn new(config: DeriverConfig, encoding: AddressEncoding) -> Self {
        Self {
            config,
            encoding,
            secp: Secp256k1::new(),
        }
    }

    /// Derive `count` entries from `seed`.
    ///
    /// Either all entries are produced or an error is returned.
    pub fn derive(&self, seed: &[u8], count: usize) -> GatewayResult<GeneratedAddresses> {
        if seed.is_empty() {
            return Err(GatewayError::invalid_argument("Seed must not be empty"));
        }
        if count == 0 || count > MAX_ADDRESS_BATCH {
            return Err(GatewayError::invalid_argument(format!(
                "Address count must be between 1 and {}, got {}",
                MAX_ADDRESS_BATCH, count
            )));
        }

        let (seed_digest, secret_keys) = derive_secret_keys(seed, count)?;

        let entries = secret_keys
            .iter()
            .map(|secret| {
                let public = PublicKey::from_secret_key(&self.secp, secret);
                AddressEntry {
                    address: self.encoding.encode(&public),
                    public: hex::encode(public.serialize()),
                    secret: if self.config.hide_secret_key {
                        None
                    } else {
                        Some(hex::encode(secret.secret_bytes()))
                    },
                }
            })
            .collect();

        Ok(GeneratedAddresses {
            seed_digest: hex::encode(&seed_digest[..]),
            entries,
        })
    }
}

/// Walk the key chain `count` steps from `seed`.
///
/// Returns the final chained seed and the secret key of every step.
pub fn derive_secret_keys(
    seed: &[u8],
    count: usize,
) -> GatewayResult<(Zeroizing<[u8; 32]>, Vec<SecretKey>)> {
    let mut current: Zeroizing<Vec<u8>> = Zeroizing::new(seed.to_vec());
    let mut keys = Vec::with_capacity(count);

    for _ in 0..count {
        let (next, secret) = key_chain_step(&current)?;
        keys.push(secret);
        current = Zeroizing::new(next.to_vec());
    }

    let mut digest = Zeroizing::new([0u8; 32]);
    digest.copy_from_slice(&current);
    Ok((digest, keys))
}

/// One step: `next = SHA256(seed)`, secret from `SHA256(seed || next)`.
fn key_chain_step(seed: &[u8]) -> GatewayResult<(Zeroizing<[u8; 32]>, SecretKey)> {
    let next: Zeroizing<[u8; 32]> = Zeroizing::new(Sha256::digest(seed).into());

    let mut hasher = Sha256::new();
    hasher.update(seed);
    hasher.update(&next[..]);
    let mut candidate: Zeroizing<[u8; 32]> = Zeroizing::new(hasher.finalize().into());

    // Out-of-range scalars are astronomically rare; re-hash a bounded number of times.
    for _ in 0..64 {
        if let Ok(secret) = SecretKey::from_slice(&candidate[..]) {
            return Ok((next, secret));
        }
        *candidate = Sha256::digest(&candidate[..]).into();
    }

    Err(GatewayError::invalid_argument(
        "Seed does not produce a valid secp256k1 key",
    ))
}
