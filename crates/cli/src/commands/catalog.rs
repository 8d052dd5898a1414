//! Catalog browsing.

#![allow(clippy::print_stdout)] // command output

use kasra_core::filter::RELATED_PRODUCTS_LIMIT;
use kasra_core::models::Product;
use kasra_core::{
    BrandId, CategoryId, GroupId, ProductFilter, ProductId, SizeId, resolve_price,
    resolve_variant_price,
};
use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;

use super::{hydrate, money};

/// List active products with the price that applies to the current user.
pub async fn list(
    state: &AppState,
    category: Option<CategoryId>,
    brand: Option<BrandId>,
    search: Option<String>,
) -> Result<(), AppError> {
    hydrate(state).await;
    let groups = state.session().group_ids();

    let mut filter = ProductFilter::storefront();
    if let Some(id) = category {
        filter = filter.with_category(id);
    }
    if let Some(id) = brand {
        filter = filter.with_brand(id);
    }
    if let Some(term) = search {
        filter = filter.with_search(term);
    }

    let products = state.api().get_products(&filter).await?;
    if products.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in &products {
        print_row(product, &groups);
    }
    Ok(())
}

/// Show a product, its variants and a few related products.
pub async fn show(state: &AppState, id: ProductId, size: Option<SizeId>) -> Result<(), AppError> {
    hydrate(state).await;
    let groups = state.session().group_ids();

    let product = state.api().get_product(id).await?;
    if let Some(size) = size
        && product.size(size).is_none()
    {
        return Err(AppError::NotFound(format!(
            "size {size} of product {id}"
        )));
    }

    println!("{} (#{}, SKU {})", product.name, product.id, product.sku);
    if let Some(brand) = &product.brand {
        println!("  brand:    {}", brand.name);
    }
    if let Some(category) = &product.category {
        println!("  category: {}", category.name);
    }
    println!(
        "  price:    {}",
        money(resolve_variant_price(&product, size, &groups))
    );
    if resolve_price(&product, &groups) != product.price {
        println!("  list:     {}", money(product.price));
    }
    println!(
        "  stock:    {}",
        if product.in_stock() { "in stock" } else { "sold out" }
    );
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }

    if !product.sizes.is_empty() {
        println!();
        println!("Sizes:");
        for s in &product.sizes {
            let price = s.price.map(money).unwrap_or_default();
            println!("  [{}] {} {} (stock {})", s.id, s.name, price, s.stock);
        }
    }
    if !product.colors.is_empty() {
        println!();
        println!("Colors:");
        for c in &product.colors {
            println!(
                "  [{}] {} {} (stock {})",
                c.id,
                c.name,
                c.hex_code.as_deref().unwrap_or(""),
                c.stock
            );
        }
    }

    let related = state
        .api()
        .get_related_products(&product, RELATED_PRODUCTS_LIMIT)
        .await?;
    if !related.is_empty() {
        println!();
        println!("Related:");
        for p in &related {
            print_row(p, &groups);
        }
    }
    Ok(())
}

fn print_row(product: &Product, groups: &[GroupId]) {
    println!(
        "{:>6}  {:<40}  {:>18}{}",
        product.id.to_string(),
        product.name,
        money(resolve_price(product, groups)),
        if product.in_stock() { "" } else { "  (sold out)" }
    );
}
