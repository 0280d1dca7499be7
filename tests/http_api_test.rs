use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use order_loadtest::domain::{ApiError, OrderSide, PlaceOrderRequest, TestType};
use order_loadtest::exchange::{HttpOrderApi, OrderApi};
use order_loadtest::loadtest::{RequestIssuer, TestDriver};
use serde_json::Value;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    user_id: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

#[derive(Default)]
struct ServerState {
    next_id: AtomicU64,
    seen: Mutex<Vec<Seen>>,
}

async fn handle(
    req: Request<Body>,
    state: Arc<ServerState>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let user_id = header("userId");
    let content_type = header("content-type");
    let body = hyper::body::to_bytes(req.into_body())
        .await
        .map(|b| b.to_vec())
        .unwrap_or_default();

    state.seen.lock().unwrap().push(Seen {
        method: method.clone(),
        path: path.clone(),
        user_id,
        content_type,
        body,
    });

    if path.starts_with("/slow") {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    let response = match (method, path.trim_start_matches("/slow")) {
        (Method::POST, "/api/orders") => {
            let id = 1_900_000_000_000_000_000 + state.next_id.fetch_add(1, Ordering::SeqCst);
            Response::new(Body::from(format!(
                r#"{{"code":200,"message":"created","data":{{"orderId":{},"status":"NEW"}},"timestamp":0}}"#,
                id
            )))
        }
        (Method::DELETE, "/api/orders/missing") => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Body::from("order not found"))
            .unwrap(),
        (Method::DELETE, _) => Response::new(Body::from(r#"{"code":200,"message":"cancelled"}"#)),
        _ => Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .body(Body::empty())
            .unwrap(),
    };
    Ok(response)
}

async fn spawn_server() -> (SocketAddr, Arc<ServerState>) {
    let state = Arc::new(ServerState::default());
    let shared = state.clone();
    let make_svc = make_service_fn(move |_conn| {
        let state = shared.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| handle(req, state.clone()))) }
    });

    let server = Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0))).serve(make_svc);
    let addr = server.local_addr();
    tokio::spawn(server);
    (addr, state)
}

fn api(addr: SocketAddr, path: &str, timeout: Duration) -> HttpOrderApi {
    HttpOrderApi::new(&format!("http://{}{}/", addr, path), 42, 8, timeout)
}

#[tokio::test]
async fn place_sends_json_body_and_user_header() {
    let (addr, state) = spawn_server().await;
    let api = api(addr, "", Duration::from_secs(5));

    let order = PlaceOrderRequest::limit("BTCUSDT", OrderSide::Buy, 5_000_001_000_000);
    let response = api.place_order(&order).await.unwrap();

    assert_eq!(response.status, 200);
    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].path, "/api/orders");
    assert_eq!(seen[0].user_id.as_deref(), Some("42"));
    assert_eq!(seen[0].content_type.as_deref(), Some("application/json"));

    let body: Value = serde_json::from_slice(&seen[0].body).unwrap();
    assert_eq!(body["orderType"], "LIMIT");
    assert_eq!(body["orderSide"], "BUY");
    assert_eq!(body["tifType"], "GTC");
    assert_eq!(body["price"], 5_000_001_000_000_i64);
}

#[tokio::test]
async fn cancel_hits_the_order_path() {
    let (addr, state) = spawn_server().await;
    let api = api(addr, "", Duration::from_secs(5));

    let ok = api.cancel_order("123").await.unwrap();
    let missing = api.cancel_order("missing").await.unwrap();

    assert_eq!(ok.status, 200);
    assert_eq!(missing.status, 404);
    assert_eq!(missing.body, "order not found");

    let seen = state.seen.lock().unwrap().clone();
    assert_eq!(seen[0].method, Method::DELETE);
    assert_eq!(seen[0].path, "/api/orders/123");
    assert_eq!(seen[0].user_id.as_deref(), Some("42"));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let (addr, _state) = spawn_server().await;
    let api = api(addr, "/slow", Duration::from_millis(50));

    let order = PlaceOrderRequest::limit("BTCUSDT", OrderSide::Sell, 5_000_000_000_000);
    let err = api.place_order(&order).await.unwrap_err();

    assert!(matches!(err, ApiError::Timeout(_)), "got {:?}", err);
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();
    let api = api(addr, "", Duration::from_secs(5));

    let err = api.cancel_order("1").await.unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)), "got {:?}", err);
}

#[tokio::test]
async fn mixed_run_against_a_live_server() {
    let (addr, state) = spawn_server().await;
    let issuer = RequestIssuer::new(api(addr, "", Duration::from_secs(5)), "BTCUSDT");
    let driver = TestDriver::new(issuer, 4);

    let outcome = driver.run(TestType::Both, 20).await;

    assert_eq!(outcome.warmup.as_ref().map(|w| w.created), Some(30));
    assert_eq!(outcome.results.len(), 20);
    assert!(outcome.results.iter().all(|r| r.is_success()));
    assert_eq!(state.seen.lock().unwrap().len(), 50);
}
