//! Catalog browsing commands.

use std::io::Write;

use handicrafts_core::listing::{self, ListingQuery};
use handicrafts_core::{Catalog, Product};

use super::CliError;

fn stock_label(product: &Product) -> &'static str {
    if product.in_stock { "in stock" } else { "out of stock" }
}

/// Print the products matching `query`, one per line, then a summary.
///
/// # Errors
///
/// Returns an error if writing output fails.
pub fn list(catalog: &Catalog, query: &ListingQuery, out: &mut impl Write) -> Result<(), CliError> {
    let products = query.apply(catalog);
    tracing::debug!(shown = products.len(), "Listing products");

    for product in &products {
        let discount = match product.discount_percent() {
            0 => String::new(),
            pct => format!(" (-{pct}%)"),
        };
        writeln!(
            out,
            "{:<4} {:<32} {:<12} {:>8}{} {:.1}★ {}",
            product.id.as_str(),
            product.title,
            product.category,
            product.display_price().display(),
            discount,
            product.rating,
            stock_label(product),
        )?;
    }
    writeln!(
        out,
        "{}",
        listing::summary(products.len(), catalog.len(), &query.category)
    )?;
    Ok(())
}

/// Print the details of one product.
///
/// # Errors
///
/// Returns [`CliError::UnknownProduct`] if no product has this id.
pub fn show(catalog: &Catalog, id: &str, out: &mut impl Write) -> Result<(), CliError> {
    let product = catalog
        .find(id)
        .ok_or_else(|| CliError::UnknownProduct(id.to_owned()))?;

    writeln!(out, "{} [{}]", product.title, product.id)?;
    writeln!(out, "Category: {}", product.category)?;
    match product.display_original_price() {
        Some(original) => writeln!(
            out,
            "Price: {} (was {}, save {}%)",
            product.display_price(),
            original,
            product.discount_percent()
        )?,
        None => writeln!(out, "Price: {}", product.display_price())?,
    }
    writeln!(
        out,
        "Rating: {:.1} ({} reviews)",
        product.rating, product.reviews
    )?;
    writeln!(out, "Availability: {}", stock_label(product))?;
    writeln!(out)?;
    writeln!(out, "{}", product.description)?;

    if let Some(features) = product.features.as_ref().filter(|f| !f.is_empty()) {
        writeln!(out)?;
        for feature in features {
            writeln!(out, "  - {feature}")?;
        }
    }

    let related = catalog.related(product, 4);
    if !related.is_empty() {
        writeln!(out)?;
        writeln!(out, "Related:")?;
        for other in related {
            writeln!(out, "  {} {} ({})", other.id, other.title, other.display_price())?;
        }
    }
    Ok(())
}
