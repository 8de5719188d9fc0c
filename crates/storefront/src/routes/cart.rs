//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every mutation loads it, applies
//! the change through [`CartManager`](handicrafts_core::CartManager), writes
//! the slot back, and redirects (post/redirect/get).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use handicrafts_core::checkout::OrderSummary;
use handicrafts_core::{Cart, CartEntry};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::flash::FlashKey;
use crate::services::SessionCart;
use crate::services::cart::visitor_id;
use crate::state::AppState;

/// Where add-to-cart returns when the form names no page.
const DEFAULT_RETURN: &str = "/products";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub line_price: String,
    pub quantity: u32,
    pub decrement_to: i64,
    pub increment_to: i64,
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        let quantity = i64::from(entry.quantity);
        Self {
            id: entry.id().to_string(),
            title: entry.product.title.clone(),
            category: entry.product.category.clone(),
            image: entry.product.image.clone(),
            price: entry.product.display_price().display(),
            line_price: entry.display_line_total().display(),
            quantity: entry.quantity,
            decrement_to: quantity - 1,
            increment_to: quantity + 1,
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u64,
    pub subtotal: String,
    pub total: String,
    pub free_shipping: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let summary = OrderSummary::from_cart(cart);
        Self {
            items: cart.entries().iter().map(CartItemView::from).collect(),
            item_count: cart.item_count(),
            subtotal: summary.display_subtotal().display(),
            total: summary.display_total().display(),
            free_shipping: summary.is_free_shipping(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    /// `detail` when posted from the product page, otherwise a listing card.
    pub source: Option<String>,
    /// Page to return to after adding.
    pub return_to: Option<String>,
    /// Present when the "Buy Now" button was used.
    pub buy_now: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart_count: u64,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Load the visitor's cart using the configured slot key.
pub async fn load_cart(state: &AppState, session: Session) -> SessionCart {
    SessionCart::load(session, &state.config().cart_key).await
}

/// Accept only same-site absolute paths as redirect targets.
fn safe_return_to(return_to: Option<&str>) -> &str {
    match return_to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => DEFAULT_RETURN,
    }
}

/// Display cart page.
///
/// Navigating here drops any pending "added" confirmations for the visitor.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> CartShowTemplate {
    let visitor = visitor_id(&session).await;
    let cancelled = state.flashes().cancel_scope(&visitor);
    if cancelled > 0 {
        tracing::debug!(cancelled, "Cancelled pending flashes");
    }

    let cart = load_cart(&state, session).await;
    CartShowTemplate {
        cart_count: cart.cart().item_count(),
        cart: CartView::from(cart.cart()),
    }
}

/// Add a product to the cart, then redirect back.
///
/// # Errors
///
/// Returns 404 if the product does not exist, 500 if the session cannot be
/// written.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find(&form.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;
    let quantity = form.quantity.unwrap_or(1);

    let visitor = visitor_id(&session).await;
    let mut cart = load_cart(&state, session).await;
    cart.manager().add(product, quantity);
    let count = cart.cart().item_count();
    cart.save().await?;

    let quantity_text = quantity.to_string();
    add_breadcrumb(
        "cart",
        "Added to cart",
        &[
            ("product_id", product.id.as_str()),
            ("quantity", quantity_text.as_str()),
        ],
    );
    tracing::info!(product_id = %product.id, quantity, count, "Added to cart");

    if quantity > 0 {
        let timing = state.config().timing;
        let duration = if form.source.as_deref() == Some("detail") {
            timing.detail_flash
        } else {
            timing.card_flash
        };
        state
            .flashes()
            .trigger(FlashKey::new(visitor, product.id.clone()), duration);
    }

    let target = if form.buy_now.is_some() {
        "/cart"
    } else {
        safe_return_to(form.return_to.as_deref())
    };
    Ok(Redirect::to(target).into_response())
}

/// Set a line's quantity; zero or less removes it.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let mut cart = load_cart(&state, session).await;
    cart.manager().set_quantity(&form.product_id, form.quantity);
    cart.save().await?;

    tracing::info!(product_id = %form.product_id, quantity = form.quantity, "Updated cart line");
    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let mut cart = load_cart(&state, session).await;
    cart.manager().remove(&form.product_id);
    cart.save().await?;

    add_breadcrumb("cart", "Removed from cart", &[("product_id", form.product_id.as_str())]);
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns 500 if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    let mut cart = load_cart(&state, session).await;
    cart.manager().clear();
    cart.save().await?;

    tracing::info!("Cleared cart");
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge fragment.
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> CartCountTemplate {
    let cart = load_cart(&state, session).await;
    CartCountTemplate {
        count: cart.cart().item_count(),
    }
}

#[cfg(test)]
mod tests {
    use handicrafts_core::{Product, ProductId};
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_safe_return_to() {
        assert_eq!(safe_return_to(Some("/products?q=red")), "/products?q=red");
        assert_eq!(safe_return_to(Some("/products/3")), "/products/3");
        assert_eq!(safe_return_to(Some("//evil.example")), DEFAULT_RETURN);
        assert_eq!(safe_return_to(Some("https://evil.example")), DEFAULT_RETURN);
        assert_eq!(safe_return_to(None), DEFAULT_RETURN);
    }

    #[test]
    fn test_cart_view_totals() {
        let product = Product {
            id: ProductId::new("tote"),
            title: "Tote".to_string(),
            category: "Crochet".to_string(),
            price: Decimal::new(1250, 2),
            original_price: None,
            image: "tote.svg".to_string(),
            gallery: None,
            description: "Bag".to_string(),
            features: None,
            in_stock: true,
            rating: 4.0,
            reviews: 1,
        };
        let mut cart = Cart::new();
        cart.add(&product, 3);

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "$37.50");
        assert_eq!(view.total, "$37.50");
        assert!(view.free_shipping);

        let item = view.items.first().map(|i| (i.decrement_to, i.increment_to));
        assert_eq!(item, Some((2, 4)));
    }
}
