//! Integration tests for the Kasra storefront client.
//!
//! The tests in `tests/` talk HTTP to [`MockBackend`], an `axum` app bound to
//! an ephemeral port that mimics the Kasra backend's response shapes:
//! gorm-style `ID`/`CreatedAt` keys next to snake-case fields, a
//! `{success, data, error, message}` envelope on auth, order and wallet
//! writes, and bare JSON everywhere else.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p kasra-integration-tests
//! ```

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use kasra_storefront::config::StorefrontConfig;
use kasra_storefront::state::AppState;
use kasra_storefront::storage::{KeyValueStore, MemoryStore};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Credentials the mock accepts.
pub const EMAIL: &str = "sara@example.com";
pub const PASSWORD: &str = "Str0ng!pass";

/// Bearer token issued by the mock.
pub const TOKEN: &str = "test-token";

/// Email that is already registered.
pub const TAKEN_EMAIL: &str = "taken@example.com";

/// Top-ups above this are refused with a 200 `success: false` envelope.
pub const TOP_UP_LIMIT: f64 = 10_000_000.0;

// =============================================================================
// Recorded state
// =============================================================================

/// What the mock has seen and what it will answer.
#[derive(Default)]
pub struct MockState {
    /// When set, the profile endpoint rejects every token.
    pub revoked: AtomicBool,
    /// Number of `GET /api/products` calls.
    pub product_list_hits: AtomicUsize,
    /// `X-Request-Id` values in arrival order.
    pub request_ids: Mutex<Vec<String>>,
    /// Bodies of `POST /api/orders`.
    pub orders: Mutex<Vec<Value>>,
    pub wallet_balance: Mutex<f64>,
    /// When set, the profile endpoint waits for [`release_profile`](Self::release_profile).
    pub hold_profile: AtomicBool,
    /// Signalled when a held profile request has arrived.
    pub profile_requested: Notify,
    pub release_profile: Notify,
}

impl MockState {
    fn record_request_id(&self, headers: &HeaderMap) {
        if let Some(id) = headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
        {
            self.request_ids
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(id.to_string());
        }
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let expected = format!("Bearer {TOKEN}");
        !self.revoked.load(Ordering::SeqCst)
            && headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == expected)
    }

    #[must_use]
    pub fn placed_orders(&self) -> Vec<Value> {
        self.orders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn seen_request_ids(&self) -> Vec<String> {
        self.request_ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

// =============================================================================
// MockBackend
// =============================================================================

/// Kasra backend stand-in serving `/api` on `127.0.0.1:<random>`.
pub struct MockBackend {
    addr: SocketAddr,
    state: Arc<MockState>,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap_or_else(|e| panic!("failed to bind mock backend: {e}"));
        let addr = listener
            .local_addr()
            .unwrap_or_else(|e| panic!("mock backend has no address: {e}"));

        let app = router(Arc::clone(&state));
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// API root of this backend, e.g. `http://127.0.0.1:4242/api`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    #[must_use]
    pub fn state(&self) -> &MockState {
        &self.state
    }

    /// Fresh client state over an in-memory store.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    pub fn app_state(&self) -> AppState {
        self.app_state_with(Arc::new(MemoryStore::new()))
    }

    /// Client state over a caller-supplied store, for restart scenarios.
    ///
    /// # Panics
    ///
    /// Panics if the base URL is rejected.
    #[must_use]
    pub fn app_state_with(&self, store: Arc<dyn KeyValueStore>) -> AppState {
        let config = StorefrontConfig::for_base_url(&self.base_url())
            .unwrap_or_else(|e| panic!("invalid mock base url: {e}"));
        AppState::new(config, store)
    }

    /// Stop the server and wait until its listener is closed.
    pub async fn shutdown(self) {
        self.server.abort();
        let _ = self.server.await;
    }
}

fn router(state: Arc<MockState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/profile", get(profile))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/brands", get(list_brands))
        .route("/api/orders", post(create_order))
        .route("/api/wallet", get(get_wallet))
        .route("/api/wallet/add", post(add_wallet))
        .with_state(state)
}

// =============================================================================
// Fixtures
// =============================================================================

/// Profile of the signed-in user, with gorm-style keys.
#[must_use]
pub fn profile_json() -> Value {
    json!({
        "ID": 7,
        "CreatedAt": "2024-03-01T10:00:00Z",
        "UpdatedAt": "2024-03-01T10:00:00Z",
        "DeletedAt": null,
        "username": "sara",
        "email": EMAIL,
        "phone": "+98 912 000 0000",
        "roles": [{"ID": 1, "name": "admin"}],
        "groups": [{"ID": 2, "name": "wholesale"}, {"ID": 1, "name": "retail"}]
    })
}

/// Catalog served by `/api/products`.
#[must_use]
pub fn products_json() -> Vec<Value> {
    vec![
        json!({
            "ID": 1,
            "name": "Espresso Machine",
            "sku": "ESP-1",
            "price": 150,
            "stock": 5,
            "is_active": true,
            "category_id": 3,
            "prices": [
                {"ID": 1, "group_id": 1, "price": 100},
                {"ID": 2, "group_id": 2, "price": 80},
                {"ID": 3, "group_id": null, "price": 120}
            ],
            "sizes": [{"ID": 7, "name": "Large", "stock": 2, "price": 175}],
            "colors": null
        }),
        json!({
            "ID": 2,
            "name": "Milk Frother",
            "sku": "MLK-2",
            "price": 40,
            "stock": 0,
            "is_active": true,
            "category_id": 3
        }),
        json!({
            "ID": 3,
            "name": "Old Kettle",
            "sku": "KTL-3",
            "price": 25,
            "stock": 9,
            "is_active": false,
            "category_id": 3
        }),
        json!({
            "ID": 4,
            "name": "Toaster",
            "sku": "TST-4",
            "price": 60,
            "stock": 3,
            "is_active": true,
            "category_id": 4,
            "brand_id": 1
        }),
    ]
}

// =============================================================================
// Handlers
// =============================================================================

fn envelope_error(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({"success": false, "error": error}))).into_response()
}

fn envelope_ok(status: StatusCode, message: &str, data: Value) -> Response {
    (
        status,
        Json(json!({"success": true, "message": message, "data": data})),
    )
        .into_response()
}

fn auth_payload() -> Value {
    json!({
        "token": TOKEN,
        "user": {"id": 7, "username": "sara", "email": EMAIL}
    })
}

async fn login(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record_request_id(&headers);
    if body["email"] == EMAIL && body["password"] == PASSWORD {
        envelope_ok(StatusCode::OK, "Login successful", auth_payload())
    } else {
        envelope_error(StatusCode::UNAUTHORIZED, "Invalid credentials")
    }
}

async fn register(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return envelope_error(StatusCode::CONFLICT, "Email already exists");
    }
    state.revoked.store(false, Ordering::SeqCst);
    envelope_ok(
        StatusCode::CREATED,
        "User registered successfully",
        auth_payload(),
    )
}

async fn profile(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    state.record_request_id(&headers);
    if state.hold_profile.load(Ordering::SeqCst) {
        state.profile_requested.notify_one();
        state.release_profile.notified().await;
    }
    if state.authorized(&headers) {
        Json(profile_json()).into_response()
    } else {
        envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized")
    }
}

async fn list_products(
    State(state): State<Arc<MockState>>,
    Query(query): Query<std::collections::HashMap<String, String>>,
) -> Response {
    state.product_list_hits.fetch_add(1, Ordering::SeqCst);
    let category = query.get("categoryId").cloned();
    let products: Vec<Value> = products_json()
        .into_iter()
        .filter(|p| {
            category
                .as_deref()
                .is_none_or(|c| p["category_id"].to_string() == c)
        })
        .collect();
    Json(Value::Array(products)).into_response()
}

async fn get_product(Path(id): Path<u32>) -> Response {
    products_json()
        .into_iter()
        .find(|p| p["ID"] == id)
        .map_or_else(
            || envelope_error(StatusCode::NOT_FOUND, "Product not found"),
            |p| Json(p).into_response(),
        )
}

async fn list_brands() -> Response {
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}

async fn create_order(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }

    let catalog = products_json();
    let mut total = 0.0;
    let mut details = Vec::new();
    for line in body["details"].as_array().into_iter().flatten() {
        let Some(product) = catalog.iter().find(|p| p["ID"] == line["product_id"]) else {
            return envelope_error(StatusCode::BAD_REQUEST, "Product not found");
        };
        if product["stock"].as_i64().unwrap_or(0) < line["quantity"].as_i64().unwrap_or(0) {
            return envelope_error(StatusCode::BAD_REQUEST, "Insufficient stock");
        }
        let price = product["price"].as_f64().unwrap_or(0.0);
        let quantity = line["quantity"].as_f64().unwrap_or(0.0);
        total += price * quantity;
        details.push(json!({
            "product_id": line["product_id"],
            "quantity": line["quantity"],
            "unit_price": price,
            "subtotal": price * quantity
        }));
    }

    let id = {
        let mut orders = state.orders.lock().unwrap_or_else(PoisonError::into_inner);
        orders.push(body.clone());
        orders.len()
    };

    envelope_ok(
        StatusCode::CREATED,
        "Order created successfully",
        json!({
            "ID": id,
            "CreatedAt": "2024-03-02T09:30:00Z",
            "user_id": 7,
            "total": total,
            "status": "pending",
            "address": body["address"],
            "payment_method": body["payment_method"],
            "details": details
        }),
    )
}

fn wallet_json(balance: f64) -> Value {
    json!({"ID": 3, "user_id": 7, "balance": balance, "currency": "IRR"})
}

async fn get_wallet(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Response {
    if !state.authorized(&headers) {
        return envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let balance = *state
        .wallet_balance
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    Json(wallet_json(balance)).into_response()
}

async fn add_wallet(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !state.authorized(&headers) {
        return envelope_error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    let amount = body["amount"].as_f64().unwrap_or(0.0);
    if amount > TOP_UP_LIMIT {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "message": "Top-up limit exceeded"})),
        )
            .into_response();
    }
    let balance = {
        let mut balance = state
            .wallet_balance
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *balance += amount;
        *balance
    };
    envelope_ok(StatusCode::OK, "Balance added", wallet_json(balance))
}
