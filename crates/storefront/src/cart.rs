//! Shopping cart store.
//!
//! The cart is an ordered list of [`CartLine`]s kept in memory and mirrored
//! to storage under [`keys::CART`] after every mutation. Lines are keyed by
//! product and variant, so adding the same variant twice bumps the quantity
//! of the existing line instead of appending a duplicate.
//!
//! Readers get an `Arc<[CartLine]>` snapshot. Mutators always build a fresh
//! slice, so a snapshot taken earlier never changes underneath its holder.

use std::sync::{Arc, PoisonError, RwLock};

use kasra_core::models::{NewOrder, NewOrderLine, Product};
use kasra_core::{ColorId, ProductId, SizeId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::add_breadcrumb;
use crate::storage::{StorageBridge, keys};

/// One mergeable cart entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Composite key, see [`line_id`].
    pub id: String,
    pub product_id: ProductId,
    /// Product as it looked when first added, for display without a refetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
    pub quantity: u32,
    #[serde(default)]
    pub size_id: Option<SizeId>,
    #[serde(default)]
    pub color_id: Option<ColorId>,
    /// Price captured on the first add of this line.
    pub unit_price: Decimal,
}

impl CartLine {
    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    /// Display name, falling back to the product id.
    #[must_use]
    pub fn title(&self) -> String {
        self.product
            .as_ref()
            .map_or_else(|| format!("Product #{}", self.product_id), |p| p.name.clone())
    }
}

/// Input for [`CartStore::add_item`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub product: Option<Product>,
    /// Requested quantity; clamped with [`clamp_quantity`].
    pub quantity: f64,
    pub size_id: Option<SizeId>,
    pub color_id: Option<ColorId>,
    pub unit_price: Decimal,
}

impl NewCartItem {
    /// One unit of `product_id` at `unit_price`, with no variant.
    #[must_use]
    pub const fn new(product_id: ProductId, unit_price: Decimal) -> Self {
        Self {
            product_id,
            product: None,
            quantity: 1.0,
            size_id: None,
            color_id: None,
            unit_price,
        }
    }

    #[must_use]
    pub fn with_product(mut self, product: Product) -> Self {
        self.product = Some(product);
        self
    }

    #[must_use]
    pub const fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = quantity;
        self
    }

    #[must_use]
    pub const fn with_size(mut self, size_id: Option<SizeId>) -> Self {
        self.size_id = size_id;
        self
    }

    #[must_use]
    pub const fn with_color(mut self, color_id: Option<ColorId>) -> Self {
        self.color_id = color_id;
        self
    }
}

/// Composite line key `"{product}_{size|-}_{color|-}"`.
#[must_use]
pub fn line_id(product_id: ProductId, size_id: Option<SizeId>, color_id: Option<ColorId>) -> String {
    let size = size_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let color = color_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    format!("{product_id}_{size}_{color}")
}

/// `max(1, floor(quantity))`, with NaN treated as 1 and large values
/// saturating at `u32::MAX`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped to u32 range first
pub fn clamp_quantity(quantity: f64) -> u32 {
    if quantity.is_nan() {
        return 1;
    }
    quantity.floor().clamp(1.0, f64::from(u32::MAX)) as u32
}

// =============================================================================
// CartStore
// =============================================================================

/// Process-wide cart state. Cheaply cloneable; clones share the same cart.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    lines: RwLock<Arc<[CartLine]>>,
    storage: StorageBridge,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("lines", &self.items().len())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Load the cart from storage. Absent or corrupt data yields an empty cart.
    #[must_use]
    pub fn load(storage: StorageBridge) -> Self {
        let lines: Vec<CartLine> = storage.load(keys::CART);
        debug!(lines = lines.len(), "Cart loaded");
        Self {
            inner: Arc::new(CartStoreInner {
                lines: RwLock::new(lines.into()),
                storage,
            }),
        }
    }

    /// Current lines in insertion order.
    #[must_use]
    pub fn items(&self) -> Arc<[CartLine]> {
        let guard = self
            .inner
            .lines
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<CartLine> {
        self.items().iter().find(|line| line.id == id).cloned()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items().iter().map(CartLine::line_total).sum()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.items().iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Add an item, merging into an existing line with the same key.
    ///
    /// A merged line keeps the unit price and product snapshot of its first add.
    pub fn add_item(&self, item: NewCartItem) {
        let quantity = clamp_quantity(item.quantity);
        let id = line_id(item.product_id, item.size_id, item.color_id);

        self.mutate(|lines| {
            if let Some(existing) = lines.iter_mut().find(|line| line.id == id) {
                existing.quantity = existing.quantity.saturating_add(quantity);
            } else {
                lines.push(CartLine {
                    id: id.clone(),
                    product_id: item.product_id,
                    product: item.product,
                    quantity,
                    size_id: item.size_id,
                    color_id: item.color_id,
                    unit_price: item.unit_price,
                });
            }
        });

        debug!(line = %id, quantity, "Cart item added");
        add_breadcrumb("cart", "Added item", Some(&[("line", id.as_str())]));
    }

    /// Remove a line. Missing ids are ignored.
    pub fn remove_item(&self, id: &str) {
        self.mutate(|lines| lines.retain(|line| line.id != id));
        debug!(line = %id, "Cart item removed");
        add_breadcrumb("cart", "Removed item", Some(&[("line", id)]));
    }

    /// Set the quantity of an existing line. Missing ids are ignored.
    pub fn update_quantity(&self, id: &str, quantity: f64) {
        let quantity = clamp_quantity(quantity);
        self.mutate(|lines| {
            if let Some(line) = lines.iter_mut().find(|line| line.id == id) {
                line.quantity = quantity;
            }
        });
        debug!(line = %id, quantity, "Cart quantity updated");
        add_breadcrumb("cart", "Updated quantity", Some(&[("line", id)]));
    }

    /// Empty the cart and delete its storage key.
    pub fn clear(&self) {
        let mut guard = self
            .inner
            .lines
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::from(Vec::new());
        self.inner.storage.remove(keys::CART);
        drop(guard);

        debug!("Cart cleared");
        add_breadcrumb("cart", "Cleared cart", None);
    }

    /// Order payload for the current lines.
    #[must_use]
    pub fn to_order(&self, address: Option<String>, payment_method: Option<String>) -> NewOrder {
        NewOrder {
            address,
            payment_method,
            details: self
                .items()
                .iter()
                .map(|line| NewOrderLine {
                    product_id: line.product_id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }

    /// Apply `change` to a copy of the lines, publish it and persist it while
    /// still holding the write lock.
    fn mutate<F>(&self, change: F)
    where
        F: FnOnce(&mut Vec<CartLine>),
    {
        let mut guard = self
            .inner
            .lines
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let mut next = guard.to_vec();
        change(&mut next);
        *guard = next.into();
        self.inner.storage.save(keys::CART, &**guard);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::storage::tests::BrokenStore;
    use crate::storage::{FileStore, KeyValueStore, MemoryStore};

    fn store() -> (CartStore, Arc<MemoryStore>) {
        let backend = Arc::new(MemoryStore::new());
        let cart = CartStore::load(StorageBridge::new(backend.clone()));
        (cart, backend)
    }

    fn item(product: u32, price: i64) -> NewCartItem {
        NewCartItem::new(ProductId::new(product), Decimal::new(price, 0))
    }

    #[test]
    fn test_line_id_format() {
        assert_eq!(line_id(ProductId::new(3), None, None), "3_-_-");
        assert_eq!(
            line_id(ProductId::new(3), Some(SizeId::new(2)), Some(ColorId::new(7))),
            "3_2_7"
        );
        assert_eq!(line_id(ProductId::new(3), None, Some(ColorId::new(7))), "3_-_7");
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0.0), 1);
        assert_eq!(clamp_quantity(-4.0), 1);
        assert_eq!(clamp_quantity(2.9), 2);
        assert_eq!(clamp_quantity(f64::NAN), 1);
        assert_eq!(clamp_quantity(f64::INFINITY), u32::MAX);
    }

    #[test]
    fn test_same_variant_merges_and_keeps_first_price() {
        let (cart, _) = store();
        cart.add_item(item(1, 100).with_quantity(2.0).with_size(Some(SizeId::new(5))));
        cart.add_item(item(1, 90).with_quantity(0.5).with_size(Some(SizeId::new(5))));
        cart.add_item(item(1, 80).with_quantity(3.7).with_size(Some(SizeId::new(5))));

        let lines = cart.items();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].id, "1_5_-");
        assert_eq!(lines[0].quantity, 2 + 1 + 3);
        assert_eq!(lines[0].unit_price, Decimal::new(100, 0));
    }

    #[test]
    fn test_different_variants_are_separate_lines() {
        let (cart, _) = store();
        cart.add_item(item(1, 100));
        cart.add_item(item(1, 100).with_color(Some(ColorId::new(2))));
        cart.add_item(item(2, 50));

        let ids: Vec<_> = cart.items().iter().map(|l| l.id.clone()).collect();
        assert_eq!(ids, ["1_-_-", "1_-_2", "2_-_-"]);
        assert_eq!(cart.count(), 3);
        assert_eq!(cart.total(), Decimal::new(250, 0));
    }

    #[test]
    fn test_update_quantity_clamps_and_ignores_missing() {
        let (cart, _) = store();
        cart.add_item(item(1, 100));
        cart.update_quantity("1_-_-", -3.0);
        assert_eq!(cart.get("1_-_-").unwrap().quantity, 1);
        cart.update_quantity("1_-_-", 4.99);
        assert_eq!(cart.get("1_-_-").unwrap().quantity, 4);

        cart.update_quantity("9_-_-", 2.0);
        assert!(cart.get("9_-_-").is_none());
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_remove_missing_yields_new_equal_snapshot() {
        let (cart, _) = store();
        cart.add_item(item(1, 100));
        let before = cart.items();
        cart.remove_item("nope");
        let after = cart.items();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before, after);
    }

    #[test]
    fn test_snapshots_are_not_mutated() {
        let (cart, _) = store();
        cart.add_item(item(1, 100));
        let snapshot = cart.items();
        cart.add_item(item(1, 100));
        cart.add_item(item(2, 10));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].quantity, 1);
    }

    #[test]
    fn test_every_mutation_persists_whole_list() {
        let (cart, backend) = store();
        cart.add_item(item(1, 100).with_quantity(2.0));
        let stored: Vec<CartLine> =
            serde_json::from_str(&backend.get(keys::CART).unwrap().unwrap()).unwrap();
        assert_eq!(stored.as_slice(), &*cart.items());

        cart.remove_item("1_-_-");
        assert_eq!(backend.get(keys::CART).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_clear_removes_key_and_survives_restart() {
        let dir = crate::storage::tests::temp_dir();
        let cart = CartStore::load(StorageBridge::new(Arc::new(FileStore::new(&dir))));
        cart.add_item(item(1, 100));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(FileStore::new(&dir).get(keys::CART).unwrap(), None);

        let reloaded = CartStore::load(StorageBridge::new(Arc::new(FileStore::new(&dir))));
        assert!(reloaded.is_empty());
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_reload_restores_equal_lines() {
        let backend = Arc::new(MemoryStore::new());
        let cart = CartStore::load(StorageBridge::new(backend.clone()));
        let product: Product =
            serde_json::from_str(r#"{"id": 4, "name": "Toaster", "price": 1200000.5}"#).unwrap();
        cart.add_item(
            item(4, 1_200_000)
                .with_product(product)
                .with_size(Some(SizeId::new(1)))
                .with_color(Some(ColorId::new(3))),
        );

        let reloaded = CartStore::load(StorageBridge::new(backend));
        assert_eq!(reloaded.items(), cart.items());
        assert_eq!(reloaded.items()[0].title(), "Toaster");
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let backend = Arc::new(MemoryStore::new());
        backend.set(keys::CART, "{\"oops\"").unwrap();
        let cart = CartStore::load(StorageBridge::new(backend));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_storage_failures_keep_memory_state() {
        let cart = CartStore::load(StorageBridge::new(Arc::new(BrokenStore)));
        cart.add_item(item(1, 100));
        cart.add_item(item(1, 100));
        assert_eq!(cart.count(), 2);
        cart.clear();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_to_order() {
        let (cart, _) = store();
        cart.add_item(item(1, 100).with_quantity(2.0));
        cart.add_item(item(3, 10).with_size(Some(SizeId::new(4))));
        let order = cart.to_order(Some("Tehran".to_string()), None);
        assert_eq!(order.details.len(), 2);
        assert_eq!(order.details[0].product_id, ProductId::new(1));
        assert_eq!(order.details[0].quantity, 2);
        assert_eq!(order.address.as_deref(), Some("Tehran"));
    }
}
