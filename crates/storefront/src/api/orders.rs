//! Order and wallet endpoints.

use kasra_core::models::{NewOrder, Order, Wallet};
use kasra_core::{OrderId, OrderStatus, UserId};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument};

use super::{ApiClient, ApiError};

#[derive(Serialize)]
struct AmountRequest {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

#[derive(Serialize)]
struct StatusRequest {
    status: OrderStatus,
}

impl ApiClient {
    // =========================================================================
    // Orders
    // =========================================================================

    /// Orders of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/orders").await
    }

    /// # Errors
    ///
    /// Returns an error if the order is not found or the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ApiError> {
        self.get(&format!("/orders/{id}")).await
    }

    /// Place an order. The backend prices it and charges the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is rejected (stock, balance) or the
    /// request fails.
    #[instrument(skip(self, order), fields(lines = order.details.len()))]
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ApiError> {
        let created: Order = self.post("/orders", order).await?;
        info!(order_id = %created.id, total = %created.total, "Order placed");
        Ok(created)
    }

    /// Every order in the shop (admin).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn admin_get_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get("/admin/orders").await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn admin_update_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.put(&format!("/admin/orders/{id}/status"), &StatusRequest { status })
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn admin_delete_order(&self, id: OrderId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/orders/{id}")).await
    }

    // =========================================================================
    // Wallet
    // =========================================================================

    /// Wallet of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_wallet(&self) -> Result<Wallet, ApiError> {
        self.get("/wallet").await
    }

    /// Top up the signed-in user's wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn add_wallet_balance(&self, amount: Decimal) -> Result<Wallet, ApiError> {
        self.post("/wallet/add", &AmountRequest { amount }).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn admin_get_wallet(&self, user: UserId) -> Result<Wallet, ApiError> {
        self.get(&format!("/admin/wallet/{user}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user, amount = %amount))]
    pub async fn admin_add_wallet_balance(
        &self,
        user: UserId,
        amount: Decimal,
    ) -> Result<Wallet, ApiError> {
        self.post(&format!("/admin/wallet/{user}/add"), &AmountRequest { amount })
            .await
    }
}
