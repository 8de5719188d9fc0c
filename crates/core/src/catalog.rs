//! Products and the read-only catalog.
//!
//! The catalog is loaded once (from JSON) and never mutated afterwards. Cart
//! entries copy the [`Product`] they were created from, so nothing here needs
//! interior mutability.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, ProductId, discount_percent};

/// Highest rating a product can carry.
pub const MAX_RATING: f32 = 5.0;

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate product id: {0}")]
    DuplicateId(ProductId),
    #[error("product {id} has a negative price")]
    NegativePrice { id: ProductId },
    #[error("product {id} has rating {rating}, expected 0-5")]
    RatingOutOfRange { id: ProductId, rating: f32 },
}

/// A purchasable product.
///
/// Field names serialize in camelCase (`originalPrice`, `inStock`) so stored
/// carts keep the same layout as the browser storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Primary image URL.
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery: Option<Vec<String>>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    pub in_stock: bool,
    pub rating: f32,
    pub reviews: u32,
}

impl Product {
    /// Display price, e.g. `$24.99`.
    #[must_use]
    pub fn display_price(&self) -> Price {
        Price::usd(self.price)
    }

    /// Display price before discount, if the product has one.
    #[must_use]
    pub fn display_original_price(&self) -> Option<Price> {
        self.original_price.map(Price::usd)
    }

    /// Whole-number discount against the original price (0 if none).
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        discount_percent(self.price, self.original_price)
    }

    /// Images for the detail gallery; falls back to the primary image.
    #[must_use]
    pub fn images(&self) -> Vec<&str> {
        match &self.gallery {
            Some(gallery) if !gallery.is_empty() => gallery.iter().map(String::as_str).collect(),
            _ => vec![self.image.as_str()],
        }
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.price.is_sign_negative() {
            return Err(CatalogError::NegativePrice {
                id: self.id.clone(),
            });
        }
        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(CatalogError::RatingOutOfRange {
                id: self.id.clone(),
                rating: self.rating,
            });
        }
        Ok(())
    }
}

/// The static, read-only set of purchasable products.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from products, rejecting duplicate ids and out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] for the first invalid product.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            product.validate()?;
            if !seen.insert(&product.id) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }
        Ok(Self { products })
    }

    /// Parse a catalog from a JSON array of products.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Parse`] for malformed JSON, or a validation error.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        Self::new(products)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id.as_str() == id)
    }

    /// The first `limit` products, shown on the home page.
    #[must_use]
    pub fn featured(&self, limit: usize) -> &[Product] {
        self.products
            .get(..limit.min(self.products.len()))
            .unwrap_or_default()
    }

    /// Other products in the same category, in catalog order.
    #[must_use]
    pub fn related(&self, product: &Product, limit: usize) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .take(limit)
            .collect()
    }
}
