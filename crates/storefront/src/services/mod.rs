//! Storefront services.
//!
//! - [`cart`] - Cart persisted in the visitor's session
//! - [`checkout`] - Simulated order submission

pub mod cart;
pub mod checkout;

pub use cart::SessionCart;
pub use checkout::{CheckoutError, PlacedOrder, submit_order};
