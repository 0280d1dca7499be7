// Shared in-memory order service for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use order_loadtest::domain::{ApiError, ApiResponse, ApiResult, PlaceOrderRequest};
use order_loadtest::exchange::OrderApi;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behaviour {
    Healthy,
    /// Every third placement answers HTTP 500.
    FailEveryThirdPlace,
    Timeout,
    Refused,
    ServerError,
    /// 200 with a body that is not JSON.
    Garbage,
}

pub struct MockOrderApi {
    behaviour: Behaviour,
    latency: Duration,
    next_id: AtomicU64,
    places: AtomicUsize,
    cancels: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    orders: Mutex<Vec<PlaceOrderRequest>>,
    cancelled: Mutex<Vec<String>>,
}

impl MockOrderApi {
    pub fn new(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            latency: Duration::from_millis(2),
            next_id: AtomicU64::new(1),
            places: AtomicUsize::new(0),
            cancels: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            orders: Mutex::new(Vec::new()),
            cancelled: Mutex::new(Vec::new()),
        }
    }

    pub fn healthy() -> Self {
        Self::new(Behaviour::Healthy)
    }

    pub fn places(&self) -> usize {
        self.places.load(Ordering::SeqCst)
    }

    pub fn cancels(&self) -> usize {
        self.cancels.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn orders(&self) -> Vec<PlaceOrderRequest> {
        self.orders.lock().unwrap().clone()
    }

    pub fn cancelled(&self) -> Vec<String> {
        self.cancelled.lock().unwrap().clone()
    }

    async fn simulate(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn common_failure(&self) -> Option<ApiResult<ApiResponse>> {
        match self.behaviour {
            Behaviour::Timeout => Some(Err(ApiError::Timeout(Duration::from_secs(10)))),
            Behaviour::Refused => Some(Err(ApiError::Transport(
                "connection refused".to_string(),
            ))),
            Behaviour::ServerError => Some(Ok(ApiResponse::new(500, "x".repeat(300)))),
            _ => None,
        }
    }
}

#[async_trait]
impl OrderApi for MockOrderApi {
    async fn place_order(&self, order: &PlaceOrderRequest) -> ApiResult<ApiResponse> {
        let n = self.places.fetch_add(1, Ordering::SeqCst) + 1;
        self.orders.lock().unwrap().push(order.clone());
        self.simulate().await;

        if let Some(failure) = self.common_failure() {
            return failure;
        }
        match self.behaviour {
            Behaviour::FailEveryThirdPlace if n % 3 == 0 => {
                Ok(ApiResponse::new(500, r#"{"code":500,"message":"risk check failed"}"#))
            }
            Behaviour::Garbage => Ok(ApiResponse::new(200, "<html>ok</html>")),
            _ => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                Ok(ApiResponse::new(
                    200,
                    format!(
                        r#"{{"code":200,"message":"ok","data":{{"orderId":{},"status":"NEW"}}}}"#,
                        id
                    ),
                ))
            }
        }
    }

    async fn cancel_order(&self, order_id: &str) -> ApiResult<ApiResponse> {
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.cancelled.lock().unwrap().push(order_id.to_string());
        self.simulate().await;

        if let Some(failure) = self.common_failure() {
            return failure;
        }
        Ok(ApiResponse::new(200, r#"{"code":200,"message":"cancelled"}"#))
    }
}
