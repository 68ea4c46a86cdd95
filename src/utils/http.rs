//! HTTP Transport
//!
//! Outbound GET requests to backend nodes go through [`HttpTransport`] so the
//! node clients can be exercised without a live node. The production
//! implementation wraps a pooled blocking `reqwest` client.

use reqwest::blocking::Client;
use std::time::Duration;

use crate::error::{GatewayError, GatewayResult};

/// Raw reply from a backend node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking GET transport shared by every backend
pub trait HttpTransport: Send + Sync {
    /// Issue one GET. Transport failures map to `BackendUnreachable`.
    fn get(&self, url: &str) -> GatewayResult<HttpResponse>;
}

/// Timeouts for the outbound client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportSettings {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// `reqwest` backed transport with connection reuse
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> GatewayResult<Self> {
        let client = Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(5)
            .tcp_keepalive(Duration::from_secs(60))
            .tcp_nodelay(true)
            .user_agent(concat!("utxo-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::backend_unreachable("Failed to create HTTP client").with_source(e))?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str) -> GatewayResult<HttpResponse> {
        let response = self.client.get(url).send().map_err(|e| {
            tracing::debug!(host = %extract_domain(url), error = %e, "backend request failed");
            GatewayError::from(e)
        })?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(HttpResponse { status, body })
    }
}

/// Extract `host:port` from a URL for logging
pub fn extract_domain(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("http://127.0.0.1:6420/outputs?addrs=a"), "127.0.0.1:6420");
        assert_eq!(extract_domain("http://localhost:3000/tx/abc"), "localhost:3000");
    }

    #[test]
    fn test_response_status() {
        assert!(HttpResponse::new(200, "[]").is_success());
        assert!(!HttpResponse::new(500, "node busy").is_success());
        assert!(!HttpResponse::new(404, "").is_success());
    }

    #[test]
    fn test_transport_creation() {
        let transport = ReqwestTransport::new(TransportSettings::default()).unwrap();
        assert!(transport.client().get("http://127.0.0.1:6420/").build().is_ok());
    }

    #[test]
    fn test_connection_refused_is_unreachable() {
        let transport = ReqwestTransport::new(TransportSettings {
            request_timeout: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(1),
        })
        .unwrap();

        // Port 9 (discard) is closed on test hosts
        let err = transport.get("http://127.0.0.1:9/outputs").unwrap_err();
        assert_eq!(err.code, ErrorCode::BackendUnreachable);
        assert!(err.details.is_some());
    }
}
