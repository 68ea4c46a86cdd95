//! Wallet Module
//!
//! Handles deterministic address derivation, address encoding and
//! validation, and coin amount rules.

mod address_validation;
mod amount_validation;
mod derivation;

pub use address_validation::*;
pub use amount_validation::*;
pub use derivation::*;
