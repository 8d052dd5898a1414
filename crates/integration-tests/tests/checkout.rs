//! Cart to order, the way `kasra checkout` drives it.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use kasra_core::{OrderStatus, ProductId, SizeId, resolve_variant_price};
use kasra_integration_tests::{EMAIL, MockBackend, PASSWORD};
use kasra_storefront::cart::NewCartItem;
use kasra_storefront::state::AppState;
use kasra_storefront::storage::{KeyValueStore, MemoryStore, keys};
use rust_decimal::Decimal;
use serde_json::json;

async fn add_to_cart(state: &AppState, id: u32, quantity: f64, size: Option<SizeId>) {
    let product = state.api().get_product(ProductId::new(id)).await.unwrap();
    let price = resolve_variant_price(&product, size, &state.session().group_ids());
    state.cart().add_item(
        NewCartItem::new(product.id, price)
            .with_product(product)
            .with_quantity(quantity)
            .with_size(size),
    );
}

#[tokio::test]
async fn test_checkout_places_order_and_clears_cart() {
    let backend = MockBackend::start().await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
    let state = backend.app_state_with(Arc::clone(&store));
    state.session().login(EMAIL, PASSWORD).await.unwrap();

    add_to_cart(&state, 1, 1.0, None).await;
    add_to_cart(&state, 1, 1.7, None).await;
    add_to_cart(&state, 4, 1.0, None).await;
    assert_eq!(state.cart().count(), 3);
    assert_eq!(state.cart().total(), Decimal::new(80 * 2 + 60, 0));

    let order = state
        .cart()
        .to_order(Some("Tehran".to_string()), Some("wallet".to_string()));
    let placed = state.api().create_order(&order).await.unwrap();
    state.cart().clear();

    assert_eq!(placed.id.as_u32(), 1);
    assert_eq!(placed.status, OrderStatus::Pending);
    assert_eq!(placed.item_count(), 3);
    assert_eq!(placed.total, Decimal::new(150 * 2 + 60, 0));
    assert!(placed.created_at.is_some());

    assert_eq!(
        backend.state().placed_orders(),
        vec![json!({
            "address": "Tehran",
            "payment_method": "wallet",
            "details": [
                {"product_id": 1, "quantity": 2},
                {"product_id": 4, "quantity": 1}
            ]
        })]
    );
    assert!(state.cart().is_empty());
    assert_eq!(store.get(keys::CART).unwrap(), None);
}

#[tokio::test]
async fn test_rejected_order_keeps_cart() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    state.session().login(EMAIL, PASSWORD).await.unwrap();

    add_to_cart(&state, 2, 1.0, None).await;
    let err = state
        .api()
        .create_order(&state.cart().to_order(None, None))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 400);
    assert_eq!(err.user_message(), "Insufficient stock");
    assert_eq!(state.cart().count(), 1);
    assert!(backend.state().placed_orders().is_empty());
}

#[tokio::test]
async fn test_anonymous_checkout_is_unauthorized() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    add_to_cart(&state, 4, 1.0, None).await;
    let err = state
        .api()
        .create_order(&state.cart().to_order(None, None))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn test_cart_survives_restart_with_variant_price() {
    let backend = MockBackend::start().await;
    let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());

    let first = backend.app_state_with(Arc::clone(&store));
    add_to_cart(&first, 1, 2.0, Some(SizeId::new(7))).await;

    let second = backend.app_state_with(store);
    let lines = second.cart().items();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].id, "1_7_-");
    assert_eq!(lines[0].unit_price, Decimal::new(175, 0));
    assert_eq!(lines[0].title(), "Espresso Machine");
    assert_eq!(second.cart().total(), Decimal::new(350, 0));
}
