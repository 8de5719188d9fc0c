//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use handicrafts_core::listing::{self, CategoryFilter, ListingQuery};
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;
use crate::routes::cart::load_cart;
use crate::routes::products::{ProductCardView, listing_url};
use crate::services::cart::visitor_id;
use crate::state::AppState;

/// Featured products on the home page.
const FEATURED_LIMIT: usize = 4;

/// Category tile linking into the filtered listing.
#[derive(Clone)]
pub struct CategoryTile {
    pub name: String,
    pub href: String,
    pub product_count: usize,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub cart_count: u64,
    pub featured: Vec<ProductCardView>,
    pub categories: Vec<CategoryTile>,
}

/// Display the home page.
#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> HomeTemplate {
    let catalog = state.catalog();
    let visitor = visitor_id(&session).await;
    let flashed = state.flashes().active_in_scope(&visitor);
    let cart = load_cart(&state, session).await;

    let categories = listing::categories(catalog)
        .into_iter()
        .skip(1)
        .map(|name| CategoryTile {
            href: listing_url(&ListingQuery {
                category: CategoryFilter::from(name.as_str()),
                ..ListingQuery::default()
            }),
            product_count: catalog
                .products()
                .iter()
                .filter(|p| p.category == name)
                .count(),
            name,
        })
        .collect();

    HomeTemplate {
        cart_count: cart.cart().item_count(),
        featured: catalog
            .featured(FEATURED_LIMIT)
            .iter()
            .map(|p| ProductCardView::new(p, cart.cart(), &flashed))
            .collect(),
        categories,
    }
}
