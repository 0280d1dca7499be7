// src/loadtest/issuer.rs
use crate::domain::errors::ApiError;
use crate::domain::models::{
    align_price, tick_size_for, ApiResponse, OrderSide, PlaceOrderRequest, RequestKind,
    TestResult, MAX_RANDOM_PRICE, MIN_RANDOM_PRICE,
};
use crate::exchange::client::OrderApi;
use crate::loadtest::registry::OrderRegistry;
use rand::Rng;
use serde_json::Value;
use tokio::time::Instant;

/// Response bodies are cut to this many characters in error messages.
const MAX_ERROR_BODY_CHARS: usize = 200;

pub const NO_ORDERS_TO_CANCEL: &str = "no orders available to cancel";
pub const TIMEOUT_MESSAGE: &str = "request timed out";

/// Sends single place/cancel requests and turns every outcome into a `TestResult`.
pub struct RequestIssuer<A: OrderApi> {
    api: A,
    registry: OrderRegistry,
    symbol: String,
    tick_size: i64,
}

impl<A: OrderApi> RequestIssuer<A> {
    pub fn new(api: A, symbol: &str) -> Self {
        Self {
            api,
            registry: OrderRegistry::new(),
            symbol: symbol.to_string(),
            tick_size: tick_size_for(symbol),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn registry(&self) -> &OrderRegistry {
        &self.registry
    }

    pub fn tick_size(&self) -> i64 {
        self.tick_size
    }

    /// Place a limit order. Side and price are randomised when not given.
    pub async fn place_order(&self, side: Option<OrderSide>, price: Option<i64>) -> TestResult {
        let side = side.unwrap_or_else(random_side);
        let price = price.unwrap_or_else(|| self.random_price());
        let order = PlaceOrderRequest::limit(&self.symbol, side, price);

        let started = Instant::now();
        let response = match self.api.place_order(&order).await {
            Ok(response) => response,
            Err(e) => return transport_failure(RequestKind::Place, &e, started),
        };
        let elapsed = started.elapsed().as_secs_f64();

        if !response.is_ok() {
            return http_failure(RequestKind::Place, &response, elapsed);
        }

        match extract_order_id(&response.body) {
            Ok(order_id) => {
                if let Some(id) = &order_id {
                    self.registry.push(id.clone()).await;
                }
                TestResult::success(RequestKind::Place, response.status, elapsed, order_id)
            }
            Err(e) => {
                log::debug!("Unparseable place response: {}", e);
                TestResult::failure(
                    RequestKind::Place,
                    response.status,
                    elapsed,
                    format!("failed to parse response: {}", truncate(&response.body)),
                )
            }
        }
    }

    /// Cancel `order_id`, or the oldest registered order when none is given.
    ///
    /// An empty registry yields an immediate failure without touching the network.
    pub async fn cancel_order(&self, order_id: Option<String>) -> TestResult {
        let order_id = match order_id.filter(|id| !id.is_empty()) {
            Some(id) => id,
            None => match self.registry.pop().await {
                Some(id) => id,
                None => return TestResult::failure(RequestKind::Cancel, 0, 0.0, NO_ORDERS_TO_CANCEL),
            },
        };

        let started = Instant::now();
        let response = match self.api.cancel_order(&order_id).await {
            Ok(response) => response,
            Err(e) => return transport_failure(RequestKind::Cancel, &e, started),
        };
        let elapsed = started.elapsed().as_secs_f64();

        if response.is_ok() {
            TestResult::success(RequestKind::Cancel, response.status, elapsed, Some(order_id))
        } else {
            http_failure(RequestKind::Cancel, &response, elapsed)
        }
    }

    fn random_price(&self) -> i64 {
        let raw = rand::thread_rng().gen_range(MIN_RANDOM_PRICE..=MAX_RANDOM_PRICE);
        align_price(raw, self.tick_size)
    }
}

fn random_side() -> OrderSide {
    if rand::random::<bool>() {
        OrderSide::Buy
    } else {
        OrderSide::Sell
    }
}

fn transport_failure(kind: RequestKind, err: &ApiError, started: Instant) -> TestResult {
    log::debug!("{} request failed: {}", kind, err);
    let message = match err {
        ApiError::Timeout(_) => TIMEOUT_MESSAGE.to_string(),
        other => format!("exception: {}", other),
    };
    TestResult::failure(kind, 0, started.elapsed().as_secs_f64(), message)
}

fn http_failure(kind: RequestKind, response: &ApiResponse, elapsed: f64) -> TestResult {
    TestResult::failure(
        kind,
        response.status,
        elapsed,
        format!("HTTP {}: {}", response.status, truncate(&response.body)),
    )
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY_CHARS).collect()
}

/// Pull `data.orderId` out of a place-order response envelope.
///
/// A missing `data` field or a missing/empty id is `Ok(None)`; a body that is
/// not a JSON object, or a `data` field that is not an object, is an error.
fn extract_order_id(body: &str) -> Result<Option<String>, String> {
    let value: Value = serde_json::from_str(body).map_err(|e| e.to_string())?;
    let envelope = value.as_object().ok_or("response is not a JSON object")?;

    let data = match envelope.get("data") {
        None => return Ok(None),
        Some(Value::Object(data)) => data,
        Some(other) => return Err(format!("unexpected data field: {}", other)),
    };

    Ok(match data.get("orderId") {
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    })
}
