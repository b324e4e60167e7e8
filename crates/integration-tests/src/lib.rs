//! Integration test harness for the Cartwheel storefront.
//!
//! # Layout
//!
//! - [`FakeBackend`] serves the commerce endpoints from in-memory fixtures,
//!   records every request, and can be told to fail or stall an endpoint.
//! - [`TestContext`] starts the fake backend and the real storefront on
//!   ephemeral ports and holds a cookie-aware client pointed at the
//!   storefront.
//!
//! # Example
//!
//! ```rust,ignore
//! #[tokio::test]
//! async fn test_storefront_health() {
//!     let ctx = TestContext::new().await;
//!     let body = ctx.get_text("/health").await;
//!     assert_eq!(body, "ok");
//! }
//! ```

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Form, Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use cartwheel_storefront::config::StorefrontConfig;
use cartwheel_storefront::state::AppState;

// =============================================================================
// Fake Backend
// =============================================================================

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub endpoint: &'static str,
    pub params: HashMap<String, String>,
    pub json: Option<Value>,
}

#[derive(Default)]
struct Fixtures {
    products: Vec<Value>,
    addresses: Vec<Value>,
    payments: Vec<Value>,
    cart_items: Vec<Value>,
    failing: HashSet<&'static str>,
    delays: HashMap<&'static str, Duration>,
    cart_lags: bool,
    requests: Vec<RecordedRequest>,
}

/// In-memory commerce backend.
#[derive(Clone, Default)]
pub struct FakeBackend {
    fixtures: Arc<Mutex<Fixtures>>,
}

impl FakeBackend {
    fn lock(&self) -> MutexGuard<'_, Fixtures> {
        self.fixtures.lock().unwrap()
    }

    /// Add a product to the searchable catalog.
    pub fn add_product(&self, id: i64, name: &str, price: f64) {
        self.lock().products.push(json!({
            "id": id,
            "name": name,
            "price": price,
            "image_url": format!("https://img.example.com/{id}.jpg"),
        }));
    }

    /// Add a saved address.
    pub fn add_address(&self, id: i64, street: &str) {
        self.lock().addresses.push(json!({
            "id": id,
            "street_address": street,
            "city": "Springfield",
            "state": "IL",
            "postal_code": "62701",
            "country": "US",
        }));
    }

    /// Add a saved payment method.
    pub fn add_payment(&self, id: i64, card_number: &str) {
        self.lock().payments.push(json!({
            "id": id,
            "card_number": card_number,
            "card_holder_name": "Ada Lovelace",
            "expiration_date": "12/29",
        }));
    }

    /// Put a line into the cart.
    pub fn add_cart_item(&self, product_id: i64, name: &str, price: f64, quantity: u32) {
        let mut fixtures = self.lock();
        let id = fixtures.cart_items.len() + 1;
        fixtures.cart_items.push(json!({
            "id": id,
            "product_id": product_id,
            "name": name,
            "price": price,
            "quantity": quantity,
        }));
    }

    /// Make `endpoint` answer 500 from now on.
    pub fn fail(&self, endpoint: &'static str) {
        self.lock().failing.insert(endpoint);
    }

    /// Make `endpoint` wait before answering.
    pub fn delay(&self, endpoint: &'static str, delay: Duration) {
        self.lock().delays.insert(endpoint, delay);
    }

    /// Accept `add_to_cart` without listing the new line in later cart reads.
    pub fn lag_cart(&self) {
        self.lock().cart_lags = true;
    }

    /// Requests received for `endpoint`, oldest first.
    #[must_use]
    pub fn requests(&self, endpoint: &str) -> Vec<RecordedRequest> {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.endpoint == endpoint)
            .cloned()
            .collect()
    }

    /// Number of lines currently in the cart.
    #[must_use]
    pub fn cart_len(&self) -> usize {
        self.lock().cart_items.len()
    }

    /// Record the request and apply any configured delay or failure.
    async fn receive(
        &self,
        endpoint: &'static str,
        params: HashMap<String, String>,
        json: Option<Value>,
    ) -> Result<(), StatusCode> {
        let (delay, failing) = {
            let mut fixtures = self.lock();
            fixtures.requests.push(RecordedRequest {
                endpoint,
                params,
                json,
            });
            (
                fixtures.delays.get(endpoint).copied(),
                fixtures.failing.contains(endpoint),
            )
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if failing {
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        } else {
            Ok(())
        }
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/get_products/", get(get_products))
            .route("/get_cart/", get(get_cart))
            .route("/get_address/", get(get_address))
            .route("/get_payment_option/", get(get_payment_option))
            .route("/add_to_cart/", post(add_to_cart))
            .route("/add_address/", post(add_address))
            .route("/add_payment_option/", post(add_payment_option))
            .route("/add_order/", post(add_order))
            .with_state(self.clone())
    }
}

type Params = HashMap<String, String>;

async fn get_products(State(backend): State<FakeBackend>, Query(params): Query<Params>) -> Response {
    let query = params.get("query").cloned().unwrap_or_default().to_lowercase();
    if let Err(status) = backend.receive("get_products", params, None).await {
        return status.into_response();
    }

    let products: Vec<Value> = backend
        .lock()
        .products
        .iter()
        .filter(|p| {
            p["name"]
                .as_str()
                .is_some_and(|name| name.to_lowercase().contains(&query))
        })
        .cloned()
        .collect();
    Json(products).into_response()
}

async fn get_cart(State(backend): State<FakeBackend>, Query(params): Query<Params>) -> Response {
    if let Err(status) = backend.receive("get_cart", params, None).await {
        return status.into_response();
    }

    let fixtures = backend.lock();
    let total: f64 = fixtures
        .cart_items
        .iter()
        .map(|i| i["price"].as_f64().unwrap_or(0.0) * i["quantity"].as_f64().unwrap_or(0.0))
        .sum();
    Json(json!({ "cart_items": fixtures.cart_items, "total_price": total })).into_response()
}

async fn get_address(State(backend): State<FakeBackend>, Query(params): Query<Params>) -> Response {
    if let Err(status) = backend.receive("get_address", params, None).await {
        return status.into_response();
    }
    Json(json!({ "addresses": backend.lock().addresses })).into_response()
}

async fn get_payment_option(
    State(backend): State<FakeBackend>,
    Query(params): Query<Params>,
) -> Response {
    if let Err(status) = backend.receive("get_payment_option", params, None).await {
        return status.into_response();
    }
    Json(json!({ "payments": backend.lock().payments })).into_response()
}

async fn add_to_cart(State(backend): State<FakeBackend>, Form(params): Form<Params>) -> Response {
    let product_id: i64 = params
        .get("product_id")
        .and_then(|id| id.parse().ok())
        .unwrap_or_default();
    if let Err(status) = backend.receive("add_to_cart", params, None).await {
        return status.into_response();
    }

    let product = backend
        .lock()
        .products
        .iter()
        .find(|p| p["id"].as_i64() == Some(product_id))
        .cloned();
    match product {
        Some(p) => {
            if !backend.lock().cart_lags {
                let name = p["name"].as_str().unwrap_or_default().to_string();
                let price = p["price"].as_f64().unwrap_or_default();
                backend.add_cart_item(product_id, &name, price, 1);
            }
            Json(json!({ "status": "added" })).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn add_address(State(backend): State<FakeBackend>, Form(params): Form<Params>) -> Response {
    let street = params.get("street_address").cloned().unwrap_or_default();
    if let Err(status) = backend.receive("add_address", params, None).await {
        return status.into_response();
    }

    let id = i64::try_from(backend.lock().addresses.len()).unwrap() + 100;
    backend.add_address(id, &street);
    StatusCode::CREATED.into_response()
}

async fn add_payment_option(
    State(backend): State<FakeBackend>,
    Form(params): Form<Params>,
) -> Response {
    let card_number = params.get("card_number").cloned().unwrap_or_default();
    if let Err(status) = backend.receive("add_payment_option", params, None).await {
        return status.into_response();
    }

    let id = i64::try_from(backend.lock().payments.len()).unwrap() + 100;
    backend.add_payment(id, &card_number);
    StatusCode::CREATED.into_response()
}

async fn add_order(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    if let Err(status) = backend
        .receive("add_order", HashMap::new(), Some(body))
        .await
    {
        return status.into_response();
    }

    backend.lock().cart_items.clear();
    (StatusCode::CREATED, Json(json!({ "order_id": 1 }))).into_response()
}

// =============================================================================
// Test Context
// =============================================================================

/// A running storefront wired to a fake backend.
pub struct TestContext {
    pub client: reqwest::Client,
    pub storefront_url: String,
    pub backend: FakeBackend,
}

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{addr}")
}

impl TestContext {
    /// Start a fake backend and a storefront pointed at it.
    pub async fn new() -> Self {
        Self::with_backend_timeout(5).await
    }

    /// Like [`TestContext::new`], giving up on backend calls after
    /// `timeout_secs`.
    pub async fn with_backend_timeout(timeout_secs: u64) -> Self {
        let backend = FakeBackend::default();
        let backend_url = spawn(backend.router()).await;

        let config = StorefrontConfig::from_lookup(|key| match key {
            "COMMERCE_API_URL" => Some(backend_url.clone()),
            "COMMERCE_API_TIMEOUT_SECS" => Some(timeout_secs.to_string()),
            _ => None,
        })
        .unwrap();
        let state = AppState::new(config).unwrap();
        let storefront_url = spawn(cartwheel_storefront::app(state)).await;

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .unwrap();

        Self {
            client,
            storefront_url,
            backend,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// GET a page, following redirects, and return its body.
    pub async fn get_text(&self, path: &str) -> String {
        self.client
            .get(self.url(path))
            .send()
            .await
            .unwrap()
            .text()
            .await
            .unwrap()
    }

    /// POST a form, following the redirect back to a page.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(fields)
            .send()
            .await
            .unwrap()
    }

    /// Load `customer_id` into the session.
    pub async fn sign_in(&self, customer_id: i64) {
        let id = customer_id.to_string();
        let response = self
            .post_form("/session", &[("customer_id", id.as_str()), ("name", "Ada")])
            .await;
        assert!(response.status().is_success());
    }
}
