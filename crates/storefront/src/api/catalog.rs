//! Product, category and brand endpoints.

use kasra_core::filter::related;
use kasra_core::models::{
    Brand, BrandInput, Category, CategoryInput, GroupPriceInput, Product, ProductInput,
};
use kasra_core::{BrandId, CategoryId, GroupId, ProductFilter, ProductId};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::{ApiClient, ApiError};

impl ApiClient {
    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products matching `filter`.
    ///
    /// Category and brand are sent to the backend; search and the active flag
    /// are applied to the (possibly cached) result.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, ApiError> {
        let cache_key = CacheKey::Products {
            category_id: filter.category_id,
            brand_id: filter.brand_id,
        };

        let products = if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for products");
            products
        } else {
            let products: Vec<Product> = self
                .get_with_query("/products", &filter.query_params())
                .await?;
            self.inner
                .cache
                .insert(cache_key, CacheValue::Products(products.clone()))
                .await;
            products
        };

        Ok(filter.apply(products))
    }

    /// Get a single product with its variants and price tiers.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let cache_key = CacheKey::Product(id);

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get(&format!("/products/{id}")).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Active products from the same category as `product`, at most `limit`.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn get_related_products(
        &self,
        product: &Product,
        limit: usize,
    ) -> Result<Vec<Product>, ApiError> {
        let Some(category) = product.effective_category_id() else {
            return Ok(Vec::new());
        };
        let candidates = self
            .get_products(&ProductFilter::storefront().with_category(category))
            .await?;
        Ok(related(product, &candidates, limit)
            .into_iter()
            .cloned()
            .collect())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(sku = %input.sku))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product = self.post("/products", input).await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(product_id = %id))]
    pub async fn update_product(
        &self,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product = self.put(&format!("/products/{id}"), input).await?;
        self.invalidate_catalog();
        Ok(product)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), ApiError> {
        self.delete(&format!("/products/{id}")).await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Add or replace a price tier on a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, tier), fields(product_id = %id))]
    pub async fn add_product_price(
        &self,
        id: ProductId,
        tier: &GroupPriceInput,
    ) -> Result<(), ApiError> {
        self.post_ignored(&format!("/products/{id}/prices"), tier)
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id, group_id = %group))]
    pub async fn remove_product_price(&self, id: ProductId, group: GroupId) -> Result<(), ApiError> {
        self.delete(&format!("/products/{id}/prices/{group}"))
            .await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<Vec<Category>, ApiError> {
        if let Some(CacheValue::Categories(categories)) =
            self.inner.cache.get(&CacheKey::Categories).await
        {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.get("/admin/categories").await?;
        self.inner
            .cache
            .insert(
                CacheKey::Categories,
                CacheValue::Categories(categories.clone()),
            )
            .await;
        Ok(categories)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(slug = %input.slug))]
    pub async fn create_category(&self, input: &CategoryInput) -> Result<Category, ApiError> {
        let category = self.post("/admin/categories", input).await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(category_id = %id))]
    pub async fn update_category(
        &self,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, ApiError> {
        let category = self.put(&format!("/admin/categories/{id}"), input).await?;
        self.invalidate_catalog();
        Ok(category)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), ApiError> {
        self.delete(&format!("/admin/categories/{id}")).await?;
        self.invalidate_catalog();
        Ok(())
    }

    // =========================================================================
    // Brand Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(&self) -> Result<Vec<Brand>, ApiError> {
        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&CacheKey::Brands).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let brands: Vec<Brand> = self.get("/brands").await?;
        self.inner
            .cache
            .insert(CacheKey::Brands, CacheValue::Brands(brands.clone()))
            .await;
        Ok(brands)
    }

    /// # Errors
    ///
    /// Returns an error if the brand is not found or the API request fails.
    #[instrument(skip(self), fields(brand_id = %id))]
    pub async fn get_brand(&self, id: BrandId) -> Result<Brand, ApiError> {
        let cache_key = CacheKey::Brand(id);
        if let Some(CacheValue::Brand(brand)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brand");
            return Ok(*brand);
        }

        let brand: Brand = self.get(&format!("/brands/{id}")).await?;
        self.inner
            .cache
            .insert(cache_key, CacheValue::Brand(Box::new(brand.clone())))
            .await;
        Ok(brand)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_brand(&self, input: &BrandInput) -> Result<Brand, ApiError> {
        let brand = self.post("/brands", input).await?;
        self.invalidate_catalog();
        Ok(brand)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, input), fields(brand_id = %id))]
    pub async fn update_brand(&self, id: BrandId, input: &BrandInput) -> Result<Brand, ApiError> {
        let brand = self.put(&format!("/brands/{id}"), input).await?;
        self.invalidate_catalog();
        Ok(brand)
    }

    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(brand_id = %id))]
    pub async fn delete_brand(&self, id: BrandId) -> Result<(), ApiError> {
        self.delete(&format!("/brands/{id}")).await?;
        self.invalidate_catalog();
        Ok(())
    }
}
