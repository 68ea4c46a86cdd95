//! Coin Amount Validation
//!
//! Fixed-point amount handling:
//! - Divisibility checks for outgoing amounts
//! - Conversion between a backend's decimal coin string and internal units

use crate::error::{GatewayError, GatewayResult};
use crate::types::CoinType;

/// Amount rules for one coin backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountPolicy {
    /// Smallest amount, in internal units, that may be sent
    pub unit: u64,
    /// Fractional digits of the backend's decimal representation
    pub decimals: u8,
}

impl AmountPolicy {
    /// Skycoin: internal unit is the droplet (1e-6 SKY), only whole coins move
    pub const SKYCOIN: AmountPolicy = AmountPolicy { unit: 1_000_000, decimals: 6 };

    /// Bitcoin: internal unit is the satoshi
    pub const BITCOIN: AmountPolicy = AmountPolicy { unit: 1, decimals: 8 };

    pub fn for_coin(coin: CoinType) -> Self {
        match coin {
            CoinType::Skycoin => Self::SKYCOIN,
            CoinType::Bitcoin => Self::BITCOIN,
        }
    }

    /// Internal units per whole coin
    pub fn scale(&self) -> u64 {
        10u64.pow(self.decimals as u32)
    }

    /// Reject amounts that are not a multiple of the coin's unit
    pub fn validate_amount(&self, amount: u64) -> GatewayResult<()> {
        if amount % self.unit != 0 {
            return Err(GatewayError::invalid_argument(format!(
                "Transaction amount must be multiple of {}",
                self.unit
            )));
        }
        Ok(())
    }

    /// Parse the backend's decimal coin string into internal units.
    ///
    /// Only the canonical form rendered by [`AmountPolicy::to_backend_units`]
    /// is accepted: no leading zeros, no trailing fractional zeros.
    pub fn from_backend_units(&self, amount: &str) -> GatewayResult<u64> {
        let (integer_str, fractional_str) = match amount.split_once('.') {
            Some((i, f)) => (i, f),
            None => (amount, ""),
        };

        if integer_str.is_empty() || !is_ascii_digits(integer_str) {
            return Err(GatewayError::malformed_response(format!(
                "Invalid coin amount '{}'",
                amount
            )));
        }
        if amount.contains('.') && (fractional_str.is_empty() || !is_ascii_digits(fractional_str)) {
            return Err(GatewayError::malformed_response(format!(
                "Invalid coin amount '{}'",
                amount
            )));
        }
        if (integer_str.len() > 1 && integer_str.starts_with('0')) || fractional_str.ends_with('0') {
            return Err(GatewayError::malformed_response(format!(
                "Coin amount '{}' is not in canonical form",
                amount
            )));
        }
        if fractional_str.len() > self.decimals as usize {
            return Err(GatewayError::malformed_response(format!(
                "Coin amount '{}' has more than {} decimal places",
                amount, self.decimals
            )));
        }

        let overflow = || GatewayError::malformed_response(format!("Coin amount '{}' overflows", amount));

        let integer: u64 = integer_str.parse().map_err(|_| overflow())?;
        let fractional: u64 = if fractional_str.is_empty() {
            0
        } else {
            // Pad fractional part to full precision
            let padded = format!("{:0<width$}", fractional_str, width = self.decimals as usize);
            padded.parse().map_err(|_| overflow())?
        };

        integer
            .checked_mul(self.scale())
            .and_then(|v| v.checked_add(fractional))
            .ok_or_else(overflow)
    }

    /// Render internal units as the backend's canonical decimal string
    pub fn to_backend_units(&self, raw: u64) -> String {
        let scale = self.scale();
        let integer = raw / scale;
        let fractional = raw % scale;

        if fractional == 0 {
            integer.to_string()
        } else {
            let frac_str = format!("{:0>width$}", fractional, width = self.decimals as usize);
            format!("{}.{}", integer, frac_str.trim_end_matches('0'))
        }
    }
}

fn is_ascii_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}
