// src/exchange/http.rs
use crate::domain::errors::{ApiError, ApiResult};
use crate::domain::models::{ApiResponse, PlaceOrderRequest};
use crate::exchange::client::OrderApi;
use async_trait::async_trait;
use hyper::client::HttpConnector;
use hyper::header::CONTENT_TYPE;
use hyper::{Body, Client, Method, Request};
use hyper_tls::HttpsConnector;
use std::time::Duration;

const USER_ID_HEADER: &str = "userId";

/// HTTP client for the order service.
///
/// One pooled hyper client is shared by every in-flight request. The timeout
/// covers the whole exchange, body read included.
pub struct HttpOrderApi {
    client: Client<HttpsConnector<HttpConnector>, Body>,
    base_url: String,
    user_id: i64,
    timeout: Duration,
}

impl HttpOrderApi {
    pub fn new(base_url: &str, user_id: i64, pool_size: usize, timeout: Duration) -> Self {
        let https = HttpsConnector::new();
        let client = Client::builder()
            .pool_max_idle_per_host(pool_size)
            .build::<_, Body>(https);

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn orders_url(&self) -> String {
        format!("{}/api/orders", self.base_url)
    }

    async fn execute(&self, request: Request<Body>) -> ApiResult<ApiResponse> {
        let exchange = async {
            let response = self.client.request(request).await?;
            let status = response.status().as_u16();
            let bytes = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>(ApiResponse::new(
                status,
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result.map_err(ApiError::from),
            Err(_) => Err(ApiError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl OrderApi for HttpOrderApi {
    async fn place_order(&self, order: &PlaceOrderRequest) -> ApiResult<ApiResponse> {
        let payload = serde_json::to_vec(order)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.orders_url())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_ID_HEADER, self.user_id.to_string())
            .body(Body::from(payload))?;

        self.execute(request).await
    }

    async fn cancel_order(&self, order_id: &str) -> ApiResult<ApiResponse> {
        let request = Request::builder()
            .method(Method::DELETE)
            .uri(format!("{}/{}", self.orders_url(), order_id))
            .header(USER_ID_HEADER, self.user_id.to_string())
            .body(Body::empty())?;

        self.execute(request).await
    }
}
