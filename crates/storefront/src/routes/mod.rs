//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//! GET  /about                  - About page
//!
//! # Products
//! GET  /products               - Product listing (?q=&category=&sort=)
//! GET  /products/{id}          - Product detail (?image=N)
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart, redirect back
//! POST /cart/update            - Set quantity, redirect to cart
//! POST /cart/remove            - Remove line, redirect to cart
//! POST /cart/clear             - Empty cart, redirect to cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Checkout form
//! POST /checkout               - Validate and place simulated order
//! ```

pub mod cart;
pub mod checkout;
pub mod home;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/about", get(pages::about))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::submit))
}
