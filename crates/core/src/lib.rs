//! Handicrafts Core - catalog, cart and listing logic.
//!
//! This crate provides the domain logic shared by every Handicrafts component:
//! - `storefront` - Public-facing web shop
//! - `cli` - Command-line catalog browser and cart driver
//!
//! # Architecture
//!
//! The core crate contains types, pure functions and traits only. It never
//! touches the network or the filesystem; persistence goes through the
//! [`storage::KeyValueStore`] trait so callers decide where a cart lives.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices and emails
//! - [`catalog`] - Products and the read-only catalog
//! - [`cart`] - Cart value type and the persisting [`cart::CartManager`]
//! - [`listing`] - Filter and sort for the product listing
//! - [`storage`] - Key-value persistence trait and the in-memory store
//! - [`checkout`] - Checkout form validation and order summaries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod listing;
pub mod storage;
pub mod types;

pub use cart::{Cart, CartEntry, CartManager, DEFAULT_CART_KEY};
pub use catalog::{Catalog, CatalogError, Product};
pub use listing::{CategoryFilter, ListingQuery, SortKey};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use types::*;
