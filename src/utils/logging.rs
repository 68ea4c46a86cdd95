//! Structured Logging with Sensitive Data Redaction
//!
//! Log output goes through `tracing`. Values that identify customers or
//! keys are passed through the redaction helpers before they become fields:
//! - Secret keys and seeds (fully redacted)
//! - Addresses (partial redaction)
//! - Output and transaction hashes (partial redaction)

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` takes precedence over `level`.
pub fn init(level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Fully redact a sensitive value
pub fn redact_secret(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.len();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (show first 6 and last 4 chars)
pub fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = 6;
    let suffix_len = 4;

    if !trimmed.is_ascii() || trimmed.len() <= prefix_len + suffix_len + 3 {
        return redact_secret(trimmed);
    }

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Partially redact a hash (show first 10 and last 6 chars)
pub fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if !trimmed.is_ascii() || trimmed.len() <= 20 {
        return trimmed.to_string();
    }

    let prefix = &trimmed[..10];
    let suffix = &trimmed[trimmed.len() - 6..];

    format!("{}...{}", prefix, suffix)
}

/// Redact a list of addresses for a single log field
pub fn redact_addresses(addresses: &[String]) -> String {
    addresses
        .iter()
        .map(|a| redact_address(a))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_secret() {
        assert_eq!(redact_secret(""), "[EMPTY]");
        assert_eq!(redact_secret("abc"), "[REDACTED]");
        assert_eq!(redact_secret("secret_key_12345"), "[REDACTED:16chars]");
    }

    #[test]
    fn test_redact_address() {
        let sky = "2GgFvqoyk9RjwVzj8tqfcXVXB4orBwoc9qv";
        let redacted = redact_address(sky);
        assert_eq!(redacted, "2GgFvq...c9qv");

        assert_eq!(redact_address("short"), "[REDACTED:5chars]");
    }

    #[test]
    fn test_redact_hash() {
        let hash = "a".repeat(54) + "1234567890";
        let redacted = redact_hash(&hash);
        assert!(redacted.starts_with("aaaaaaaaaa..."));
        assert!(redacted.ends_with("567890"));

        assert_eq!(redact_hash("abc:0"), "abc:0");
    }

    #[test]
    fn test_redact_addresses() {
        let addrs = vec![
            "2GgFvqoyk9RjwVzj8tqfcXVXB4orBwoc9qv".to_string(),
            "1BvBMSEYstWetqTFn5Au4m4GFg7xJaNVN2".to_string(),
        ];
        assert_eq!(redact_addresses(&addrs), "2GgFvq...c9qv,1BvBMS...NVN2");
    }
}
