//! Catalog entities: products, their variants and price tiers, categories, brands.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::null_as_default;
use crate::types::{BrandId, CategoryId, ColorId, GroupId, ImageId, PriceId, ProductId, SizeId};

const fn default_true() -> bool {
    true
}

// =============================================================================
// Taxonomy
// =============================================================================

/// Product category. Categories may nest through `children`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(alias = "ID", default)]
    pub id: CategoryId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Slug", default)]
    pub slug: Option<String>,
    #[serde(alias = "ParentID", default)]
    pub parent_id: Option<CategoryId>,
    #[serde(
        alias = "Children",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub children: Vec<Self>,
    #[serde(alias = "Image", default)]
    pub image: Option<String>,
}

/// Product brand or manufacturer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(alias = "ID", default)]
    pub id: BrandId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Description", default)]
    pub description: Option<String>,
    /// URL or asset path of the logo.
    #[serde(alias = "Logo", default)]
    pub logo: Option<String>,
}

// =============================================================================
// Product Variants
// =============================================================================

/// Product image reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductImage {
    #[serde(alias = "ID", default)]
    pub id: ImageId,
    #[serde(alias = "URL", default)]
    pub url: String,
    #[serde(alias = "Alt", default)]
    pub alt: Option<String>,
    #[serde(alias = "IsPrimary", default)]
    pub is_primary: bool,
    /// Display order, ascending.
    #[serde(alias = "Order", default)]
    pub order: i32,
}

/// Size variant. A positive `price` overrides group tier pricing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSize {
    #[serde(alias = "ID", default)]
    pub id: SizeId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Stock", default)]
    pub stock: i32,
    #[serde(alias = "Price", default)]
    pub price: Option<Decimal>,
}

/// Color variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductColor {
    #[serde(alias = "ID", default)]
    pub id: ColorId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "HexCode", default)]
    pub hex_code: Option<String>,
    #[serde(alias = "Stock", default)]
    pub stock: i32,
}

/// One price tier of a product.
///
/// A missing group id marks the default tier. The backend also stores `0`
/// for "no group" on some rows, which is treated the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPrice {
    #[serde(alias = "ID", default)]
    pub id: PriceId,
    #[serde(alias = "GroupID", default)]
    pub group_id: Option<GroupId>,
    #[serde(alias = "Price", default)]
    pub price: Decimal,
}

impl GroupPrice {
    /// Whether this entry is the fallback tier for users without a matching group.
    #[must_use]
    pub fn is_default_tier(&self) -> bool {
        self.group_id.is_none_or(|id| id.as_u32() == 0)
    }

    /// Whether this entry applies to the given group.
    #[must_use]
    pub fn applies_to(&self, group: GroupId) -> bool {
        !self.is_default_tier() && self.group_id == Some(group)
    }
}

// =============================================================================
// Product
// =============================================================================

/// A sellable product with its variants and price tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(alias = "ID", default)]
    pub id: ProductId,
    #[serde(alias = "Name", default)]
    pub name: String,
    #[serde(alias = "Description", default)]
    pub description: Option<String>,
    #[serde(alias = "SKU", default)]
    pub sku: String,
    #[serde(alias = "Stock", default)]
    pub stock: i32,
    #[serde(alias = "ModelNumber", default)]
    pub model_number: Option<String>,
    #[serde(alias = "Warranty", default)]
    pub warranty: Option<String>,
    /// Weight in kilograms.
    #[serde(alias = "Weight", default)]
    pub weight: Option<Decimal>,
    #[serde(alias = "Dimensions", default)]
    pub dimensions: Option<String>,
    #[serde(alias = "Power", default)]
    pub power: Option<String>,
    #[serde(alias = "Material", default)]
    pub material: Option<String>,
    #[serde(alias = "Capacity", default)]
    pub capacity: Option<String>,
    #[serde(alias = "Features", default)]
    pub features: Option<String>,
    #[serde(alias = "IsActive", default = "default_true")]
    pub is_active: bool,
    #[serde(alias = "CategoryID", default)]
    pub category_id: Option<CategoryId>,
    #[serde(alias = "Category", default)]
    pub category: Option<Category>,
    #[serde(alias = "BrandID", default)]
    pub brand_id: Option<BrandId>,
    #[serde(alias = "Brand", default)]
    pub brand: Option<Brand>,
    #[serde(alias = "Images", default, deserialize_with = "null_as_default")]
    pub images: Vec<ProductImage>,
    #[serde(alias = "Sizes", default, deserialize_with = "null_as_default")]
    pub sizes: Vec<ProductSize>,
    #[serde(alias = "Colors", default, deserialize_with = "null_as_default")]
    pub colors: Vec<ProductColor>,
    #[serde(alias = "Prices", default, deserialize_with = "null_as_default")]
    pub prices: Vec<GroupPrice>,
    /// Base price, used when no tier applies.
    #[serde(alias = "Price", default)]
    pub price: Decimal,
}

impl Product {
    /// Image flagged as primary, else the first by display order.
    #[must_use]
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_primary)
            .or_else(|| self.images.iter().min_by_key(|img| img.order))
    }

    #[must_use]
    pub fn size(&self, id: SizeId) -> Option<&ProductSize> {
        self.sizes.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn color(&self, id: ColorId) -> Option<&ProductColor> {
        self.colors.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Category id from either the flat field or the embedded category.
    #[must_use]
    pub fn effective_category_id(&self) -> Option<CategoryId> {
        self.category_id
            .or_else(|| self.category.as_ref().map(|c| c.id))
    }
}

// =============================================================================
// Request Payloads
// =============================================================================

/// Price tier sent when creating or updating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupPriceInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Body of `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sku: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<BrandId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub prices: Vec<GroupPriceInput>,
}

/// Body of the category create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryInput {
    pub name: String,
    pub slug: String,
}

impl CategoryInput {
    /// Build an input whose slug is derived from the name.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let slug = name
            .trim()
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-");
        Self {
            name: name.trim().to_owned(),
            slug,
        }
    }
}

/// Body of the brand create and update endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_from_snake_case() {
        let json = r#"{
            "id": 3,
            "name": "Kettle",
            "sku": "KT-1",
            "price": 150,
            "stock": 4,
            "is_active": true,
            "category_id": 2,
            "prices": [{"id": 1, "group_id": 1, "price": 100}, {"id": 2, "price": 120}],
            "sizes": [{"id": 9, "name": "1L", "stock": 2, "price": 99.5}]
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Decimal::new(150, 0));
        assert_eq!(product.prices.len(), 2);
        assert!(product.prices[1].is_default_tier());
        assert_eq!(
            product.size(SizeId::new(9)).unwrap().price,
            Some(Decimal::new(995, 1))
        );
    }

    #[test]
    fn test_product_from_pascal_case() {
        let json = r#"{
            "ID": 5,
            "Name": "Blender",
            "SKU": "BL-2",
            "Price": 80,
            "IsActive": false,
            "Category": {"ID": 4, "Name": "Kitchen"},
            "Prices": [{"ID": 7, "GroupID": 2, "Price": 70}],
            "Images": null
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(5));
        assert_eq!(product.sku, "BL-2");
        assert!(!product.is_active);
        assert!(product.images.is_empty());
        assert_eq!(product.effective_category_id(), Some(CategoryId::new(4)));
        assert!(product.prices[0].applies_to(GroupId::new(2)));
    }

    #[test]
    fn test_product_defaults_to_active() {
        let product: Product = serde_json::from_str(r#"{"id": 1, "name": "x"}"#).unwrap();
        assert!(product.is_active);
        assert_eq!(product.price, Decimal::ZERO);
    }

    #[test]
    fn test_zero_group_id_is_default_tier() {
        let tier: GroupPrice = serde_json::from_str(r#"{"group_id": 0, "price": 10}"#).unwrap();
        assert!(tier.is_default_tier());
        assert!(!tier.applies_to(GroupId::new(0)));
    }

    #[test]
    fn test_primary_image_falls_back_to_order() {
        let product: Product = serde_json::from_str(
            r#"{"images": [{"id": 1, "url": "b.jpg", "order": 2}, {"id": 2, "url": "a.jpg", "order": 1}]}"#,
        )
        .unwrap();
        assert_eq!(product.primary_image().unwrap().url, "a.jpg");
    }

    #[test]
    fn test_product_input_sends_numbers() {
        let input = ProductInput {
            name: "Kettle".to_owned(),
            description: None,
            sku: "KT-1".to_owned(),
            price: Decimal::new(1_500_000, 0),
            stock: 3,
            is_active: true,
            category_id: None,
            brand_id: None,
            model_number: None,
            warranty: None,
            prices: vec![GroupPriceInput {
                group_id: Some(GroupId::new(1)),
                price: Decimal::new(1_200_000, 0),
            }],
        };
        let value = serde_json::to_value(&input).unwrap();
        assert_eq!(value["price"], serde_json::json!(1_500_000.0));
        assert_eq!(value["prices"][0]["group_id"], serde_json::json!(1));
        assert!(value.get("category_id").is_none());
    }

    #[test]
    fn test_category_slug_from_name() {
        let input = CategoryInput::from_name("  Small Kitchen & Home ");
        assert_eq!(input.name, "Small Kitchen & Home");
        assert_eq!(input.slug, "small-kitchen-home");
    }
}
