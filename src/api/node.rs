//! Backend Node Client
//!
//! Issues GET requests against one configured node endpoint and decodes the
//! JSON reply. Every failure comes back as a typed [`GatewayError`]:
//! - transport failure → `BackendUnreachable`
//! - non-2xx status → `BackendError` carrying the body verbatim
//! - undecodable body → `MalformedResponse`

use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

use crate::error::{GatewayError, GatewayResult};
use crate::utils::{HttpResponse, HttpTransport};

/// Client for a single backend node at `host:port`
#[derive(Clone)]
pub struct NodeClient {
    base: Url,
    transport: Arc<dyn HttpTransport>,
}

impl std::fmt::Debug for NodeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeClient").field("base", &self.base.as_str()).finish()
    }
}

impl NodeClient {
    /// `node_addr` is `host:port`, without scheme.
    pub fn new(node_addr: &str, transport: Arc<dyn HttpTransport>) -> GatewayResult<Self> {
        Ok(Self {
            base: parse_node_addr(node_addr)?,
            transport,
        })
    }

    pub fn node_addr(&self) -> String {
        match self.base.port() {
            Some(port) => format!("{}:{}", self.base.host_str().unwrap_or_default(), port),
            None => self.base.host_str().unwrap_or_default().to_string(),
        }
    }

    /// Full request URL for `path` and an already-joined query string
    pub fn url(&self, path: &str, query: Option<&str>) -> String {
        let mut url = self.base.clone();
        url.set_path(path);
        url.set_query(query);
        url.to_string()
    }

    /// One round trip; returns the body of a 2xx reply.
    pub fn get_text(&self, path: &str, query: Option<&str>) -> GatewayResult<String> {
        let url = self.url(path, query);
        tracing::debug!(node = %self.node_addr(), path, "backend request");

        let response = self.transport.get(&url)?;
        if !response.is_success() {
            let HttpResponse { status, body } = response;
            tracing::debug!(node = %self.node_addr(), path, status, "backend returned error status");
            return Err(GatewayError::backend_error(body).with_details(format!("HTTP {} from {}", status, path)));
        }
        Ok(response.body)
    }

    /// One round trip, decoding the reply as `T`.
    pub fn get_json<T: DeserializeOwned>(&self, path: &str, query: Option<&str>) -> GatewayResult<T> {
        let body = self.get_text(path, query)?;
        decode_json(&body)
    }
}

/// Decode a backend payload; never yields a partial record.
pub fn decode_json<T: DeserializeOwned>(body: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(GatewayError::from)
}

/// Parse and check a `host:port` node address.
pub fn parse_node_addr(node_addr: &str) -> GatewayResult<Url> {
    let trimmed = node_addr.trim();
    if trimmed.is_empty() || trimmed.contains("://") || trimmed.contains('/') {
        return Err(GatewayError::invalid_argument(format!(
            "Node address must be host:port, got '{}'",
            node_addr
        )));
    }

    let url = Url::parse(&format!("http://{}", trimmed))
        .map_err(|e| GatewayError::invalid_argument(format!("Invalid node address '{}': {}", node_addr, e)))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(GatewayError::invalid_argument(format!(
            "Node address '{}' has no host",
            node_addr
        )));
    }
    Ok(url)
}
