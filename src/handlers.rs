//! Request handlers
//!
//! Each handler binds a request, looks up the coin backend and wraps the
//! outcome in an [`ApiResponse`]. Failures are logged here and nowhere else.
//! Backends only return errors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use zeroize::Zeroizing;

use crate::error::{GatewayError, GatewayResult};
use crate::exchange::Exchange;
use crate::types::*;
use crate::utils::logging::redact_secret;

/// Operations reachable through [`handle_json`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    GetUtxos,
    GetOutput,
    GenerateAddresses,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::GetUtxos => "utxos",
            Route::GetOutput => "output",
            Route::GenerateAddresses => "addresses",
        }
    }
}

impl std::str::FromStr for Route {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('/') {
            "utxos" => Ok(Route::GetUtxos),
            "output" => Ok(Route::GetOutput),
            "addresses" => Ok(Route::GenerateAddresses),
            other => Err(GatewayError::invalid_argument(format!("Unknown route: {}", other))),
        }
    }
}

fn respond<T>(route: Route, result: GatewayResult<T>) -> ApiResponse<T> {
    match result {
        Ok(data) => ApiResponse::ok(data),
        Err(e) => {
            tracing::error!(route = route.path(), "{}", e);
            ApiResponse::err(&e)
        }
    }
}

/// Unspent outputs owned by the requested addresses.
pub fn get_utxos(exchange: &Exchange, req: &GetUtxoRequest) -> ApiResponse<GetUtxoResponse> {
    let result = exchange.get_coin(req.coin_type).and_then(|coin| {
        let utxos = coin.get_utxos(&req.addresses)?;
        Ok(GetUtxoResponse {
            coin_type: req.coin_type,
            utxos: utxos.iter().map(|u| u.view()).collect(),
        })
    });
    respond(Route::GetUtxos, result)
}

/// One output by hash, spent or unspent.
pub fn get_output(exchange: &Exchange, req: &GetOutputRequest) -> ApiResponse<Output> {
    let result = exchange
        .get_coin(req.coin_type)
        .and_then(|coin| coin.get_output(&req.hash));
    respond(Route::GetOutput, result)
}

/// Derive a batch of addresses from a hex seed.
pub fn generate_addresses(
    exchange: &Exchange,
    req: &GenerateAddressesRequest,
) -> ApiResponse<GenerateAddressesResponse> {
    tracing::debug!(
        coin = %req.coin_type,
        seed = %redact_secret(&req.seed),
        count = req.count,
        "generating addresses"
    );
    let result = exchange.get_coin(req.coin_type).and_then(|coin| {
        let seed = Zeroizing::new(hex::decode(req.seed.trim())?);
        let generated = coin.generate_addresses(&seed, req.count)?;
        Ok(GenerateAddressesResponse {
            coin_type: req.coin_type,
            seed_digest: generated.seed_digest,
            entries: generated.entries,
        })
    });
    respond(Route::GenerateAddresses, result)
}

fn bind<Req: DeserializeOwned, Res: Serialize>(
    route: Route,
    body: &str,
    handler: impl FnOnce(&Req) -> ApiResponse<Res>,
) -> String {
    match serde_json::from_str::<Req>(body) {
        Ok(req) => handler(&req).to_json(),
        Err(e) => {
            tracing::error!(route = route.path(), "{}", e);
            ApiResponse::<()>::wrong_request(format!("Invalid request body: {}", e)).to_json()
        }
    }
}

/// Decode `body` for `route`, run the handler and encode the reply.
///
/// A body that does not bind to the route's request type is answered with a
/// `wrong_request` error; the backend is never consulted.
pub fn handle_json(exchange: &Exchange, route: Route, body: &str) -> String {
    match route {
        Route::GetUtxos => bind(route, body, |req: &GetUtxoRequest| get_utxos(exchange, req)),
        Route::GetOutput => bind(route, body, |req: &GetOutputRequest| get_output(exchange, req)),
        Route::GenerateAddresses => bind(route, body, |req: &GenerateAddressesRequest| {
            generate_addresses(exchange, req)
        }),
    }
}
