//! Canonical entity shapes returned by the Kasra backend.
//!
//! The backend is inconsistent about key casing: storefront endpoints use
//! `snake_case` JSON tags while embedded records fall back to Go's default
//! `PascalCase` (`ID`, `CreatedAt`, `GroupID`). Every struct here accepts both
//! spellings through serde aliases, so this module is the only place that
//! knows about raw field names.

mod account;
mod catalog;
mod order;

pub use account::{Group, NamedInput, Permission, Role, User, UserInput, Wallet};
pub use catalog::{
    Brand, BrandInput, Category, CategoryInput, GroupPrice, GroupPriceInput, Product,
    ProductColor, ProductImage, ProductInput, ProductSize,
};
pub use order::{NewOrder, NewOrderLine, Order, OrderDetail};

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as a missing field.
///
/// Go encodes nil slices as `null`, which `#[serde(default)]` alone rejects.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
