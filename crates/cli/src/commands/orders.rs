//! Checkout, order history and wallet.

#![allow(clippy::print_stdout)] // command output

use kasra_core::OrderId;
use kasra_core::models::Order;
use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;
use rust_decimal::Decimal;
use tracing::info;

use super::{money, require_session};

/// Place an order for the cart and clear the cart once the backend accepts it.
pub async fn checkout(
    state: &AppState,
    address: Option<String>,
    payment_method: Option<String>,
) -> Result<(), AppError> {
    require_session(state).await?;
    if state.cart().is_empty() {
        return Err(AppError::BadRequest("your cart is empty".to_string()));
    }

    let order = state.cart().to_order(address, payment_method);
    let placed = state.api().create_order(&order).await?;
    state.cart().clear();
    info!(order_id = %placed.id, "Checkout complete");

    println!("Order #{} placed: {}", placed.id, money(placed.total));
    Ok(())
}

pub async fn list(state: &AppState) -> Result<(), AppError> {
    require_session(state).await?;
    let orders = state.api().get_orders().await?;
    if orders.is_empty() {
        println!("No orders yet.");
    }
    for order in &orders {
        print_summary(order);
    }
    Ok(())
}

pub async fn show(state: &AppState, id: OrderId) -> Result<(), AppError> {
    require_session(state).await?;
    let order = state.api().get_order(id).await?;
    print_summary(&order);
    if let Some(address) = &order.address {
        println!("  ship to: {address}");
    }
    for detail in &order.details {
        let name = detail
            .product
            .as_ref()
            .map_or_else(|| format!("Product #{}", detail.product_id), |p| p.name.clone());
        println!(
            "  {:<36} {:>4} x {:>16}",
            name,
            detail.quantity,
            money(detail.unit_price)
        );
    }
    Ok(())
}

pub async fn wallet(state: &AppState) -> Result<(), AppError> {
    require_session(state).await?;
    let wallet = state.api().get_wallet().await?;
    println!("Balance: {}", wallet.balance_price());
    Ok(())
}

pub async fn top_up(state: &AppState, amount: Decimal) -> Result<(), AppError> {
    if amount <= Decimal::ZERO {
        return Err(AppError::BadRequest("amount must be positive".to_string()));
    }
    require_session(state).await?;
    let wallet = state.api().add_wallet_balance(amount).await?;
    println!("Balance: {}", wallet.balance_price());
    Ok(())
}

pub(super) fn print_summary(order: &Order) {
    let date = order
        .created_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    println!(
        "#{:<6} {:<10} {:<11} {:>4} item(s)  {:>18}",
        order.id.to_string(),
        date,
        order.status.as_str(),
        order.item_count(),
        money(order.total)
    );
}
