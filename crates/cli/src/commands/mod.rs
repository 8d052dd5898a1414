//! Command implementations.
//!
//! Output goes to stdout; diagnostics go through `tracing` to stderr.

pub mod account;
pub mod admin;
pub mod cart;
pub mod catalog;
pub mod orders;

use kasra_core::{CurrencyCode, Price};
use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;
use rust_decimal::Decimal;
use tracing::warn;

/// Restore the session from the stored token. A failed restore leaves the
/// session anonymous and is only logged.
pub async fn hydrate(state: &AppState) {
    if let Err(e) = state.session().hydrate().await {
        warn!(error = %e, "Could not restore session");
    }
}

/// Restore the session and fail unless it is authenticated.
pub async fn require_session(state: &AppState) -> Result<(), AppError> {
    hydrate(state).await;
    if state.session().is_authenticated() {
        Ok(())
    } else {
        Err(AppError::Unauthorized(
            "sign in first with `kasra login`".to_string(),
        ))
    }
}

/// Restore the session and fail unless it has an admin role.
pub async fn require_admin(state: &AppState) -> Result<(), AppError> {
    require_session(state).await?;
    if state.session().is_admin() {
        Ok(())
    } else {
        Err(AppError::Unauthorized("admin role required".to_string()))
    }
}

/// Shop amounts are rials.
pub fn money(amount: Decimal) -> String {
    Price::new(amount, CurrencyCode::IRR).display()
}
