//! Static content page route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::load_cart;
use crate::state::AppState;

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub cart_count: u64,
}

/// Display the About page.
#[instrument(skip(state, session))]
pub async fn about(State(state): State<AppState>, session: Session) -> AboutTemplate {
    let cart = load_cart(&state, session).await;
    AboutTemplate {
        cart_count: cart.cart().item_count(),
    }
}
