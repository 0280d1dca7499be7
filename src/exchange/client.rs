// src/exchange/client.rs
use crate::domain::errors::ApiResult;
use crate::domain::models::{ApiResponse, PlaceOrderRequest};
use async_trait::async_trait;

/// Order service interface exercised by the load test
#[async_trait]
pub trait OrderApi: Send + Sync {
    /// Submit a new order (`POST /api/orders`)
    async fn place_order(&self, order: &PlaceOrderRequest) -> ApiResult<ApiResponse>;

    /// Cancel an existing order (`DELETE /api/orders/{id}`)
    async fn cancel_order(&self, order_id: &str) -> ApiResult<ApiResponse>;
}
