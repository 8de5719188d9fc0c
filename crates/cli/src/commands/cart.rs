//! Cart commands.
//!
//! The cart is a [`CartManager`] over any [`KeyValueStore`]; the binary uses a
//! [`FileStore`](handicrafts_storefront::FileStore) so the cart survives
//! between invocations.

use std::io::Write;

use handicrafts_core::checkout::OrderSummary;
use handicrafts_core::{Cart, CartManager, Catalog, KeyValueStore};

use super::CliError;

/// Add `quantity` of a catalog product.
///
/// # Errors
///
/// Returns [`CliError::UnknownProduct`] if the id is not in the catalog.
pub fn add<S: KeyValueStore>(
    cart: &mut CartManager<S>,
    catalog: &Catalog,
    id: &str,
    quantity: u32,
) -> Result<(), CliError> {
    let product = catalog
        .find(id)
        .ok_or_else(|| CliError::UnknownProduct(id.to_owned()))?;
    if !product.in_stock {
        tracing::warn!(product_id = %product.id, "Adding a product that is out of stock");
    }
    cart.add(product, quantity);
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns [`CliError::NotInCart`] if the product has no cart line.
pub fn remove<S: KeyValueStore>(cart: &mut CartManager<S>, id: &str) -> Result<(), CliError> {
    if !cart.contains(id) {
        return Err(CliError::NotInCart(id.to_owned()));
    }
    cart.remove(id);
    Ok(())
}

/// Set a line's quantity; zero or less removes it.
///
/// # Errors
///
/// Returns [`CliError::NotInCart`] if the product has no cart line.
pub fn set_quantity<S: KeyValueStore>(
    cart: &mut CartManager<S>,
    id: &str,
    quantity: i64,
) -> Result<(), CliError> {
    if !cart.contains(id) {
        return Err(CliError::NotInCart(id.to_owned()));
    }
    cart.set_quantity(id, quantity);
    Ok(())
}

/// Print each cart line and the totals.
///
/// # Errors
///
/// Returns an error if writing output fails.
pub fn show(cart: &Cart, out: &mut impl Write) -> Result<(), CliError> {
    if cart.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    for entry in cart.entries() {
        writeln!(
            out,
            "{:<4} {:<32} {:>3} x {:>8} = {:>9}",
            entry.id().as_str(),
            entry.product.title,
            entry.quantity,
            entry.product.display_price().display(),
            entry.display_line_total().display(),
        )?;
    }

    let summary = OrderSummary::from_cart(cart);
    writeln!(out, "Items: {}", cart.item_count())?;
    writeln!(out, "Subtotal: {}", summary.display_subtotal())?;
    writeln!(out, "Shipping: Free")?;
    writeln!(out, "Total: {}", summary.display_total())?;
    Ok(())
}
