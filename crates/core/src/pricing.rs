//! Group tier price resolution.
//!
//! A product carries a base price plus zero or more [`GroupPrice`] tiers. The
//! price a shopper sees depends on which groups they belong to:
//!
//! 1. No tiers at all: the base price.
//! 2. The first of the shopper's groups (in the order given) that has a tier.
//! 3. The default tier (no group), if one exists.
//! 4. The base price.
//!
//! [`GroupPrice`]: crate::models::GroupPrice

use rust_decimal::Decimal;

use crate::models::Product;
use crate::types::{GroupId, SizeId};

/// Price of `product` for a shopper in `group_ids`.
///
/// Group ids are scanned in the caller's order, so a user's first listed
/// group wins when several groups have a tier.
#[must_use]
pub fn resolve_price(product: &Product, group_ids: &[GroupId]) -> Decimal {
    if product.prices.is_empty() {
        return product.price;
    }

    group_ids
        .iter()
        .find_map(|&group| {
            product
                .prices
                .iter()
                .find(|tier| tier.applies_to(group))
                .map(|tier| tier.price)
        })
        .or_else(|| {
            product
                .prices
                .iter()
                .find(|tier| tier.is_default_tier())
                .map(|tier| tier.price)
        })
        .unwrap_or(product.price)
}

/// Price of a specific size of `product`.
///
/// A size with a positive price of its own overrides every tier. Otherwise
/// this is [`resolve_price`].
#[must_use]
pub fn resolve_variant_price(
    product: &Product,
    size_id: Option<SizeId>,
    group_ids: &[GroupId],
) -> Decimal {
    size_id
        .and_then(|id| product.size(id))
        .and_then(|size| size.price)
        .filter(|price| price.is_sign_positive() && !price.is_zero())
        .unwrap_or_else(|| resolve_price(product, group_ids))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn tiered_product() -> Product {
        serde_json::from_value(serde_json::json!({
            "id": 1,
            "name": "Mixer",
            "price": 150,
            "prices": [
                {"id": 1, "group_id": 1, "price": 100},
                {"id": 2, "group_id": 2, "price": 80},
                {"id": 3, "group_id": null, "price": 120}
            ],
            "sizes": [
                {"id": 10, "name": "Large", "stock": 1, "price": 175},
                {"id": 11, "name": "Small", "stock": 1, "price": 0}
            ]
        }))
        .unwrap()
    }

    fn groups(ids: &[u32]) -> Vec<GroupId> {
        ids.iter().copied().map(GroupId::new).collect()
    }

    #[test]
    fn test_caller_order_wins() {
        let product = tiered_product();
        assert_eq!(resolve_price(&product, &groups(&[2, 1])), Decimal::new(80, 0));
        assert_eq!(resolve_price(&product, &groups(&[1, 2])), Decimal::new(100, 0));
    }

    #[test]
    fn test_unmatched_group_uses_default_tier() {
        let product = tiered_product();
        assert_eq!(resolve_price(&product, &groups(&[5])), Decimal::new(120, 0));
        assert_eq!(resolve_price(&product, &[]), Decimal::new(120, 0));
    }

    #[test]
    fn test_no_tiers_uses_base_price() {
        let mut product = tiered_product();
        product.prices.clear();
        assert_eq!(resolve_price(&product, &groups(&[1, 2])), Decimal::new(150, 0));
        assert_eq!(resolve_price(&product, &[]), Decimal::new(150, 0));
    }

    #[test]
    fn test_no_default_tier_uses_base_price() {
        let mut product = tiered_product();
        product.prices.retain(|tier| !tier.is_default_tier());
        assert_eq!(resolve_price(&product, &groups(&[9])), Decimal::new(150, 0));
    }

    #[test]
    fn test_positive_size_price_overrides_tiers() {
        let product = tiered_product();
        let g = groups(&[2]);
        assert_eq!(
            resolve_variant_price(&product, Some(SizeId::new(10)), &g),
            Decimal::new(175, 0)
        );
        assert_eq!(
            resolve_variant_price(&product, Some(SizeId::new(11)), &g),
            Decimal::new(80, 0)
        );
        assert_eq!(
            resolve_variant_price(&product, Some(SizeId::new(99)), &g),
            Decimal::new(80, 0)
        );
        assert_eq!(resolve_variant_price(&product, None, &[]), Decimal::new(120, 0));
    }
}
