//! Orders and order placement payloads.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Product, null_as_default};
use crate::types::{OrderDetailId, OrderId, OrderStatus, ProductId, UserId};

const fn default_quantity() -> u32 {
    1
}

/// One line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(alias = "ID", default)]
    pub id: OrderDetailId,
    #[serde(alias = "ProductID", default)]
    pub product_id: ProductId,
    #[serde(alias = "Quantity", default = "default_quantity")]
    pub quantity: u32,
    #[serde(alias = "UnitPrice", default)]
    pub unit_price: Decimal,
    #[serde(alias = "Subtotal", default)]
    pub subtotal: Decimal,
    #[serde(alias = "Product", default)]
    pub product: Option<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    #[serde(alias = "ID", default)]
    pub id: OrderId,
    #[serde(alias = "UserID", default)]
    pub user_id: UserId,
    #[serde(alias = "Total", default)]
    pub total: Decimal,
    #[serde(alias = "Status", default)]
    pub status: OrderStatus,
    #[serde(alias = "Address", default)]
    pub address: Option<String>,
    #[serde(alias = "PaymentMethod", default)]
    pub payment_method: Option<String>,
    #[serde(alias = "CreatedAt", default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(alias = "Details", default, deserialize_with = "null_as_default")]
    pub details: Vec<OrderDetail>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.details.iter().map(|d| u64::from(d.quantity)).sum()
    }
}

/// A line of an order about to be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders`. Prices are computed server side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrder {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    pub details: Vec<NewOrderLine>,
}
