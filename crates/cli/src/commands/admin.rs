//! Back-office commands. The backend enforces permissions too; the local
//! check only saves a round trip.

#![allow(clippy::print_stdout)] // command output

use kasra_core::{OrderId, OrderStatus, UserId};
use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;
use rust_decimal::Decimal;

use super::orders::print_summary;
use super::require_admin;

/// List every order, or move one to a new status.
pub async fn orders(
    state: &AppState,
    change: Option<(OrderId, OrderStatus)>,
) -> Result<(), AppError> {
    require_admin(state).await?;

    if let Some((id, status)) = change {
        let order = state.api().admin_update_order_status(id, status).await?;
        print_summary(&order);
        return Ok(());
    }

    for order in &state.api().admin_get_orders().await? {
        print_summary(order);
    }
    Ok(())
}

/// Show a user's wallet, topping it up first when `add` is given.
pub async fn wallet(state: &AppState, user: UserId, add: Option<Decimal>) -> Result<(), AppError> {
    require_admin(state).await?;

    let wallet = match add {
        Some(amount) if amount <= Decimal::ZERO => {
            return Err(AppError::BadRequest("amount must be positive".to_string()));
        }
        Some(amount) => state.api().admin_add_wallet_balance(user, amount).await?,
        None => state.api().admin_get_wallet(user).await?,
    };
    println!("User #{user}: {}", wallet.balance_price());
    Ok(())
}
