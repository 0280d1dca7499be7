// src/domain/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default tick size for symbols missing from the alignment table.
pub const DEFAULT_TICK_SIZE: i64 = 1_000_000;

/// Prices are stored in minimal units: 1 USDT = 100_000_000.
pub const MIN_RANDOM_PRICE: i64 = 5_000_000_000_000;
pub const MAX_RANDOM_PRICE: i64 = 6_000_000_000_000;

/// 0.001 BTC in minimal units.
pub const ORDER_QUANTITY: i64 = 100_000_000;

/// Tick size per symbol, in minimal price units.
///
/// BTCUSDT ticks at 0.01 USDT, ETHUSDT at 0.001 USDT.
const SYMBOL_TICK_SIZES: &[(&str, i64)] = &[("BTCUSDT", 1_000_000), ("ETHUSDT", 100_000)];

pub fn tick_size_for(symbol: &str) -> i64 {
    SYMBOL_TICK_SIZES
        .iter()
        .find(|(name, _)| *name == symbol)
        .map(|(_, tick)| *tick)
        .unwrap_or(DEFAULT_TICK_SIZE)
}

/// Round `price` down to the nearest multiple of `tick_size`.
///
/// Uses floor division so the result never exceeds `price`, negative inputs included.
pub fn align_price(price: i64, tick_size: i64) -> i64 {
    price.div_euclid(tick_size) * tick_size
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
}

/// Time-in-force policy. Only good-till-cancelled is exercised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TifType {
    Gtc,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub symbol: String,
    pub order_type: OrderType,
    pub order_side: OrderSide,
    pub price: i64,
    pub quantity: i64,
    pub tif_type: TifType,
}

impl PlaceOrderRequest {
    pub fn limit(symbol: &str, side: OrderSide, price: i64) -> Self {
        Self {
            symbol: symbol.to_string(),
            order_type: OrderType::Limit,
            order_side: side,
            price,
            quantity: ORDER_QUANTITY,
            tif_type: TifType::Gtc,
        }
    }
}

/// A completed HTTP exchange, whatever its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Place,
    Cancel,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RequestKind::Place => write!(f, "place"),
            RequestKind::Cancel => write!(f, "cancel"),
        }
    }
}

/// Outcome of one request attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct TestResult {
    kind: RequestKind,
    success: bool,
    status_code: u16,
    response_time: f64,
    error_message: Option<String>,
    order_id: Option<String>,
}

impl TestResult {
    pub fn success(
        kind: RequestKind,
        status_code: u16,
        response_time: f64,
        order_id: Option<String>,
    ) -> Self {
        Self {
            kind,
            success: true,
            status_code,
            response_time,
            error_message: None,
            order_id,
        }
    }

    pub fn failure(
        kind: RequestKind,
        status_code: u16,
        response_time: f64,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            success: false,
            status_code,
            response_time,
            error_message: Some(error_message.into()),
            order_id: None,
        }
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Latency in seconds.
    pub fn response_time(&self) -> f64 {
        self.response_time
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }
}

/// Which workload a run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TestType {
    /// Place orders only
    Place,
    /// Warm up with placements, then cancel them
    Cancel,
    /// Warm up, then interleave placements and cancels
    Both,
}

impl TestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestType::Place => "place",
            TestType::Cancel => "cancel",
            TestType::Both => "both",
        }
    }
}

impl fmt::Display for TestType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
