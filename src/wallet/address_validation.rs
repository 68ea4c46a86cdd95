//! Address Encoding and Validation
//!
//! - Skycoin base58check addresses (encode from a public key, decode and verify)
//! - Bitcoin address syntax and network checks
//! - Output hash format checks

use bitcoin::address::NetworkUnchecked;
use bitcoin::secp256k1::PublicKey;
use bitcoin::Network;
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::GatewayError;

/// Skycoin address version byte for mainnet
pub const SKYCOIN_ADDRESS_VERSION: u8 = 0;

/// Length of a hex-encoded SHA-256 output hash
pub const OUTPUT_HASH_HEX_LEN: usize = 64;

/// SHA256 helper function for Base58Check verification
fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Error types for address handling
#[derive(Debug, thiserror::Error)]
pub enum AddressError {
    #[error("Invalid base58: {0}")]
    Base58(#[from] bs58::decode::Error),

    #[error("Invalid address length: {0} bytes")]
    Length(usize),

    #[error("Invalid address checksum")]
    Checksum,

    #[error("Unsupported address version: {0}")]
    Version(u8),

    #[error("Invalid bitcoin address: {0}")]
    Bitcoin(#[from] bitcoin::address::ParseError),
}

impl From<AddressError> for GatewayError {
    fn from(e: AddressError) -> Self {
        GatewayError::invalid_argument(e.to_string())
    }
}

/// A decoded skycoin address: version plus 20-byte key hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyAddress {
    pub version: u8,
    pub key: [u8; 20],
}

impl SkyAddress {
    /// Address for a compressed public key: RIPEMD160(SHA256(SHA256(pubkey)))
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let inner = sha256(&sha256(&public_key.serialize()));
        let digest = Ripemd160::digest(inner);

        let mut key = [0u8; 20];
        key.copy_from_slice(&digest);
        Self {
            version: SKYCOIN_ADDRESS_VERSION,
            key,
        }
    }

    fn checksum(&self) -> [u8; 4] {
        let mut payload = [0u8; 21];
        payload[..20].copy_from_slice(&self.key);
        payload[20] = self.version;
        let hash = sha256(&payload);

        let mut checksum = [0u8; 4];
        checksum.copy_from_slice(&hash[..4]);
        checksum
    }

    /// Layout: key(20) || version(1) || checksum(4)
    pub fn to_bytes(&self) -> [u8; 25] {
        let mut bytes = [0u8; 25];
        bytes[..20].copy_from_slice(&self.key);
        bytes[20] = self.version;
        bytes[21..].copy_from_slice(&self.checksum());
        bytes
    }

    pub fn decode(address: &str) -> Result<Self, AddressError> {
        let bytes = bs58::decode(address.trim()).into_vec()?;
        if bytes.len() != 25 {
            return Err(AddressError::Length(bytes.len()));
        }

        let mut key = [0u8; 20];
        key.copy_from_slice(&bytes[..20]);
        let decoded = Self {
            version: bytes[20],
            key,
        };

        if bytes[21..] != decoded.checksum() {
            return Err(AddressError::Checksum);
        }
        if decoded.version != SKYCOIN_ADDRESS_VERSION {
            return Err(AddressError::Version(decoded.version));
        }
        Ok(decoded)
    }
}

impl std::fmt::Display for SkyAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&bs58::encode(self.to_bytes()).into_string())
    }
}

/// Validate a bitcoin address for the given network
pub fn validate_bitcoin_address(address: &str, network: Network) -> Result<bitcoin::Address, AddressError> {
    let unchecked: bitcoin::Address<NetworkUnchecked> = address.trim().parse()?;
    Ok(unchecked.require_network(network)?)
}

/// Check that a string is a hex-encoded SHA-256 hash
pub fn validate_output_hash(hash: &str) -> Result<[u8; 32], GatewayError> {
    if hash.len() != OUTPUT_HASH_HEX_LEN {
        return Err(GatewayError::invalid_argument(format!(
            "invalid output hash, expected {} hex characters, got {}",
            OUTPUT_HASH_HEX_LEN,
            hash.len()
        )));
    }

    let mut bytes = [0u8; 32];
    hex::decode_to_slice(hash, &mut bytes)
        .map_err(|e| GatewayError::invalid_argument(format!("invalid output hash, {}", e)))?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bitcoin::secp256k1::{Secp256k1, SecretKey};

    fn test_public_key() -> PublicKey {
        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(&[0x11; 32]).unwrap();
        PublicKey::from_secret_key(&secp, &secret)
    }

    #[test]
    fn test_skycoin_address_decodes_back() {
        let address = SkyAddress::from_public_key(&test_public_key());
        let encoded = address.to_string();

        let decoded = SkyAddress::decode(&encoded).unwrap();
        assert_eq!(decoded, address);
    }

    #[test]
    fn test_skycoin_address_bad_checksum() {
        let mut bytes = SkyAddress::from_public_key(&test_public_key()).to_bytes();
        bytes[24] ^= 0xff;
        let tampered = bs58::encode(bytes).into_string();

        assert!(matches!(SkyAddress::decode(&tampered), Err(AddressError::Checksum)));
    }

    #[test]
    fn test_skycoin_address_rejects_garbage() {
        assert!(matches!(SkyAddress::decode("0OIl"), Err(AddressError::Base58(_))));
        assert!(matches!(SkyAddress::decode("2xyz"), Err(AddressError::Length(_))));
    }

    #[test]
    fn test_bitcoin_address_network() {
        let mainnet = "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2";
        assert!(validate_bitcoin_address(mainnet, Network::Bitcoin).is_ok());
        assert!(validate_bitcoin_address(mainnet, Network::Testnet).is_err());
        assert!(validate_bitcoin_address("not-an-address", Network::Bitcoin).is_err());
    }

    #[test]
    fn test_output_hash_validation() {
        let valid = "a".repeat(64);
        assert!(validate_output_hash(&valid).is_ok());

        let err = validate_output_hash("abc").unwrap_err();
        assert!(err.is_invalid_argument());

        let err = validate_output_hash(&"z".repeat(64)).unwrap_err();
        assert!(err.is_invalid_argument());
    }
}
