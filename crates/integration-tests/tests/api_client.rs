//! REST client behavior over real HTTP.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::sync::atomic::Ordering;

use kasra_core::{CategoryId, ProductFilter, ProductId, SizeId, resolve_price, resolve_variant_price};
use kasra_integration_tests::{EMAIL, MockBackend, PASSWORD};
use kasra_storefront::api::ApiError;
use rust_decimal::Decimal;

#[tokio::test]
async fn test_not_found_carries_status_and_message() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    let err = state
        .api()
        .get_product(ProductId::new(999))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Status { status: 404, .. }));
    assert_eq!(err.user_message(), "Product not found");
}

#[tokio::test]
async fn test_success_false_on_ok_response_is_an_error() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    state.session().login(EMAIL, PASSWORD).await.unwrap();

    let err = state
        .api()
        .add_wallet_balance(Decimal::new(50_000_000, 0))
        .await
        .unwrap_err();

    assert_eq!(err.status(), 200);
    assert_eq!(err.user_message(), "Top-up limit exceeded");
}

#[tokio::test]
async fn test_wallet_top_up_returns_enveloped_wallet() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    state.session().login(EMAIL, PASSWORD).await.unwrap();

    let wallet = state
        .api()
        .add_wallet_balance(Decimal::new(500_000, 0))
        .await
        .unwrap();
    assert_eq!(wallet.balance, Decimal::new(500_000, 0));

    let wallet = state.api().get_wallet().await.unwrap();
    assert_eq!(wallet.balance_price().display(), "500,000 IRR");
}

#[tokio::test]
async fn test_unexpected_body_is_decode_error() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    let err = state.api().get_brands().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { status: 200, .. }));
}

#[tokio::test]
async fn test_unreachable_backend_reports_status_zero() {
    let backend = MockBackend::start().await;
    let base_url = backend.base_url();
    backend.shutdown().await;

    let config = kasra_storefront::config::StorefrontConfig::for_base_url(&base_url).unwrap();
    let state = kasra_storefront::state::AppState::new(
        config,
        std::sync::Arc::new(kasra_storefront::storage::MemoryStore::new()),
    );

    let err = state
        .api()
        .get_products(&ProductFilter::storefront())
        .await
        .unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.status(), 0);
}

#[tokio::test]
async fn test_every_request_gets_its_own_id() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    state.session().login(EMAIL, PASSWORD).await.unwrap();
    state.session().refresh_profile().await.unwrap();

    let ids = backend.state().seen_request_ids();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids.iter().collect::<HashSet<_>>().len(), 3);
}

#[tokio::test]
async fn test_product_list_is_cached_until_session_changes() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    let hits = || backend.state().product_list_hits.load(Ordering::SeqCst);

    let first = state
        .api()
        .get_products(&ProductFilter::storefront())
        .await
        .unwrap();
    let second = state
        .api()
        .get_products(&ProductFilter::storefront().with_search("toast"))
        .await
        .unwrap();
    assert_eq!(hits(), 1);
    assert_eq!(first.len(), 3, "inactive product is hidden");
    assert_eq!(second.len(), 1);

    state.session().login(EMAIL, PASSWORD).await.unwrap();
    state
        .api()
        .get_products(&ProductFilter::storefront())
        .await
        .unwrap();
    assert_eq!(hits(), 2);
}

#[tokio::test]
async fn test_category_filter_is_sent_to_backend() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    let products = state
        .api()
        .get_products(&ProductFilter::storefront().with_category(CategoryId::new(4)))
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Toaster");
}

#[tokio::test]
async fn test_related_products_share_category() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();

    let product = state.api().get_product(ProductId::new(1)).await.unwrap();
    let related = state
        .api()
        .get_related_products(&product, 4)
        .await
        .unwrap();

    let ids: Vec<u32> = related.iter().map(|p| p.id.as_u32()).collect();
    assert_eq!(ids, vec![2]);
}

#[tokio::test]
async fn test_group_pricing_follows_profile_groups() {
    let backend = MockBackend::start().await;
    let state = backend.app_state();
    let product = state.api().get_product(ProductId::new(1)).await.unwrap();

    assert_eq!(
        resolve_price(&product, &state.session().group_ids()),
        Decimal::new(120, 0)
    );

    state.session().login(EMAIL, PASSWORD).await.unwrap();
    let groups = state.session().group_ids();
    assert_eq!(resolve_price(&product, &groups), Decimal::new(80, 0));
    assert_eq!(
        resolve_variant_price(&product, Some(SizeId::new(7)), &groups),
        Decimal::new(175, 0)
    );
}
