//! Catalog filter composition.
//!
//! Category and brand narrow the request sent to the backend. The free-text
//! search is applied to the fetched list, so it also works on cached results.

use crate::models::Product;
use crate::types::{BrandId, CategoryId};

/// Number of related products shown next to a product.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Criteria for listing products.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub search: Option<String>,
    pub active_only: bool,
}

impl ProductFilter {
    /// Filter showing only active products, as the storefront pages do.
    #[must_use]
    pub fn storefront() -> Self {
        Self {
            active_only: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_category(mut self, id: CategoryId) -> Self {
        self.category_id = Some(id);
        self
    }

    #[must_use]
    pub const fn with_brand(mut self, id: BrandId) -> Self {
        self.brand_id = Some(id);
        self
    }

    #[must_use]
    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    /// Query parameters for `GET /products`.
    #[must_use]
    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(id) = self.category_id {
            params.push(("categoryId", id.to_string()));
        }
        if let Some(id) = self.brand_id {
            params.push(("brandId", id.to_string()));
        }
        params
    }

    /// Normalized search term, or `None` when blank.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }

    /// Whether a product satisfies every criterion.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.is_active {
            return false;
        }
        if let Some(id) = self.category_id
            && product.effective_category_id() != Some(id)
        {
            return false;
        }
        if let Some(id) = self.brand_id
            && product.brand_id.or_else(|| product.brand.as_ref().map(|b| b.id)) != Some(id)
        {
            return false;
        }
        self.needle().is_none_or(|needle| {
            product.name.to_lowercase().contains(&needle)
                || product.sku.to_lowercase().contains(&needle)
                || product
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
    }

    /// Keep the products that match, preserving order.
    #[must_use]
    pub fn apply(&self, products: Vec<Product>) -> Vec<Product> {
        products.into_iter().filter(|p| self.matches(p)).collect()
    }
}

/// Active products from the same category as `current`, excluding it.
#[must_use]
pub fn related<'a>(current: &Product, products: &'a [Product], limit: usize) -> Vec<&'a Product> {
    let Some(category) = current.effective_category_id() else {
        return Vec::new();
    };
    products
        .iter()
        .filter(|p| p.id != current.id && p.is_active)
        .filter(|p| p.effective_category_id() == Some(category))
        .take(limit)
        .collect()
}
