//! Coin dispatch
//!
//! [`Exchange`] maps each [`CoinType`] to the backend serving it. The map is
//! filled once at startup and only read afterwards, so handlers can share one
//! instance across threads.

use std::collections::HashMap;
use std::sync::Arc;

use crate::coin::{BitcoinBackend, CoinBackend, SkycoinBackend};
use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::types::CoinType;
use crate::utils::{HttpTransport, ReqwestTransport};

#[derive(Clone, Default)]
pub struct Exchange {
    coins: HashMap<CoinType, Arc<dyn CoinBackend>>,
}

impl Exchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `backend` under its own coin type, replacing any earlier one.
    pub fn with_coin(mut self, backend: Arc<dyn CoinBackend>) -> Self {
        self.register(backend);
        self
    }

    pub fn register(&mut self, backend: Arc<dyn CoinBackend>) {
        let coin = backend.coin_type();
        if self.coins.insert(coin, backend).is_some() {
            tracing::warn!(%coin, "replacing registered backend");
        }
    }

    /// Build every backend enabled in `config` over a pooled reqwest client.
    pub fn from_config(config: &GatewayConfig) -> GatewayResult<Self> {
        let transport: Arc<dyn HttpTransport> =
            Arc::new(ReqwestTransport::new(config.transport_settings())?);
        Self::from_config_with_transport(config, transport)
    }

    /// Same as [`Exchange::from_config`] with a caller-supplied transport.
    pub fn from_config_with_transport(
        config: &GatewayConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> GatewayResult<Self> {
        let deriver = config.deriver_config();
        let mut exchange = Exchange::new();

        if let Some(sky) = &config.skycoin {
            let backend = SkycoinBackend::new(&sky.node_addr, transport.clone(), deriver)?;
            tracing::info!(node = %sky.node_addr, "skycoin backend enabled");
            exchange.register(Arc::new(backend));
        }

        if let Some(btc) = &config.bitcoin {
            let network = btc.network()?;
            let backend = BitcoinBackend::new(&btc.node_addr, network, transport, deriver)?;
            tracing::info!(node = %btc.node_addr, %network, "bitcoin backend enabled");
            exchange.register(Arc::new(backend));
        }

        Ok(exchange)
    }

    /// Backend serving `coin`.
    pub fn get_coin(&self, coin: CoinType) -> GatewayResult<Arc<dyn CoinBackend>> {
        self.coins.get(&coin).cloned().ok_or_else(|| {
            GatewayError::unsupported_coin(format!("Coin type {} is not enabled", coin))
        })
    }

    pub fn coin_types(&self) -> Vec<CoinType> {
        let mut coins: Vec<CoinType> = self.coins.keys().copied().collect();
        coins.sort_by_key(|c| c.name());
        coins
    }

    pub fn is_empty(&self) -> bool {
        self.coins.is_empty()
    }
}

impl std::fmt::Debug for Exchange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exchange")
            .field("coins", &self.coin_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BitcoinConfig;
    use crate::error::ErrorCode;
    use crate::utils::HttpResponse;

    struct Offline;

    impl HttpTransport for Offline {
        fn get(&self, _url: &str) -> GatewayResult<HttpResponse> {
            Err(GatewayError::backend_unreachable("offline"))
        }
    }

    #[test]
    fn test_default_config_enables_skycoin_only() {
        let exchange =
            Exchange::from_config_with_transport(&GatewayConfig::default(), Arc::new(Offline))
                .unwrap();

        assert_eq!(exchange.coin_types(), vec![CoinType::Skycoin]);
        assert_eq!(
            exchange.get_coin(CoinType::Skycoin).unwrap().coin_type(),
            CoinType::Skycoin
        );

        let err = exchange.get_coin(CoinType::Bitcoin).err().unwrap();
        assert_eq!(err.code, ErrorCode::UnsupportedCoin);
    }

    #[test]
    fn test_both_coins_registered() {
        let config = GatewayConfig {
            bitcoin: Some(BitcoinConfig::default()),
            ..GatewayConfig::default()
        };
        let exchange = Exchange::from_config_with_transport(&config, Arc::new(Offline)).unwrap();

        assert_eq!(exchange.coin_types(), vec![CoinType::Bitcoin, CoinType::Skycoin]);
        assert!(format!("{:?}", exchange).contains("Bitcoin"));
    }

    #[test]
    fn test_empty_exchange() {
        let exchange = Exchange::new();
        assert!(exchange.is_empty());
        assert!(exchange.get_coin(CoinType::Skycoin).is_err());
    }
}
