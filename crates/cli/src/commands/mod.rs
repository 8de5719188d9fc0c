//! CLI command implementations.
//!
//! Commands write human-readable output to any [`std::io::Write`] so they can
//! be exercised against an in-memory buffer.

pub mod cart;
pub mod products;

use handicrafts_core::StorageError;
use handicrafts_storefront::state::StateError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The catalog could not be loaded.
    #[error(transparent)]
    Catalog(#[from] StateError),

    /// The cart directory could not be opened.
    #[error("Cart storage error: {0}")]
    Storage(#[from] StorageError),

    /// No product has this id.
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    /// No cart line has this id.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Io(#[from] std::io::Error),
}
