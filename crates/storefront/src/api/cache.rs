//! Cache types for catalog responses.

use kasra_core::models::{Brand, Category, Product};
use kasra_core::{BrandId, CategoryId, ProductId};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Product(ProductId),
    Products {
        category_id: Option<CategoryId>,
        brand_id: Option<BrandId>,
    },
    Categories,
    Brand(BrandId),
    Brands,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
    Brand(Box<Brand>),
    Brands(Vec<Brand>),
}
