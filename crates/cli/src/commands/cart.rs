//! Cart editing. Everything except `add` works offline.

#![allow(clippy::print_stdout)] // command output

use kasra_core::{ColorId, ProductId, SizeId, resolve_variant_price};
use kasra_storefront::cart::NewCartItem;
use kasra_storefront::error::AppError;
use kasra_storefront::state::AppState;

use super::{hydrate, money};

pub fn show(state: &AppState) {
    let lines = state.cart().items();
    if lines.is_empty() {
        println!("Your cart is empty.");
        return;
    }

    for line in lines.iter() {
        println!(
            "{:<16}  {:<36}  {:>4} x {:>16}  = {:>18}",
            line.id,
            line.title(),
            line.quantity,
            money(line.unit_price),
            money(line.line_total())
        );
    }
    println!(
        "{} item(s), total {}",
        state.cart().count(),
        money(state.cart().total())
    );
}

/// Add a product at the price that applies to the current user.
pub async fn add(
    state: &AppState,
    product_id: ProductId,
    quantity: f64,
    size: Option<SizeId>,
    color: Option<ColorId>,
) -> Result<(), AppError> {
    hydrate(state).await;

    let product = state.api().get_product(product_id).await?;
    if !product.is_active {
        return Err(AppError::BadRequest(format!(
            "{} is not for sale",
            product.name
        )));
    }
    if let Some(id) = size
        && product.size(id).is_none()
    {
        return Err(AppError::NotFound(format!("size {id} of {}", product.name)));
    }
    if let Some(id) = color
        && product.color(id).is_none()
    {
        return Err(AppError::NotFound(format!("color {id} of {}", product.name)));
    }

    let unit_price = resolve_variant_price(&product, size, &state.session().group_ids());
    let name = product.name.clone();
    state.cart().add_item(
        NewCartItem::new(product_id, unit_price)
            .with_product(product)
            .with_quantity(quantity)
            .with_size(size)
            .with_color(color),
    );

    println!(
        "Added {name}. Cart: {} item(s), {}",
        state.cart().count(),
        money(state.cart().total())
    );
    Ok(())
}

pub fn remove(state: &AppState, line: &str) -> Result<(), AppError> {
    if state.cart().get(line).is_none() {
        return Err(AppError::NotFound(format!("cart line {line}")));
    }
    state.cart().remove_item(line);
    println!("Removed {line}.");
    Ok(())
}

pub fn update(state: &AppState, line: &str, quantity: f64) -> Result<(), AppError> {
    if state.cart().get(line).is_none() {
        return Err(AppError::NotFound(format!("cart line {line}")));
    }
    state.cart().update_quantity(line, quantity);
    if let Some(updated) = state.cart().get(line) {
        println!("{line}: {} x {}", updated.quantity, money(updated.unit_price));
    }
    Ok(())
}

pub fn clear(state: &AppState) {
    state.cart().clear();
    println!("Cart cleared.");
}
