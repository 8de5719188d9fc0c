//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use handicrafts_core::listing::{self, CategoryFilter, ListingQuery, SortKey};
use handicrafts_core::{Cart, Product, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::flash::FlashKey;
use crate::routes::cart::load_cart;
use crate::services::cart::visitor_id;
use crate::state::AppState;

/// Related products shown under the detail view.
const RELATED_LIMIT: usize = 4;

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub title: String,
    pub category: String,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: u32,
    pub image: String,
    pub rating: f32,
    pub reviews: u32,
    pub in_stock: bool,
    pub in_cart: bool,
    /// "Added!" confirmation is showing.
    pub just_added: bool,
}

impl ProductCardView {
    #[must_use]
    pub fn new(product: &Product, cart: &Cart, flashed: &[ProductId]) -> Self {
        Self {
            id: product.id.to_string(),
            title: product.title.clone(),
            category: product.category.clone(),
            price: product.display_price().display(),
            original_price: product.display_original_price().map(|p| p.display()),
            discount_percent: product.discount_percent(),
            image: product.image.clone(),
            rating: product.rating,
            reviews: product.reviews,
            in_stock: product.in_stock,
            in_cart: cart.contains(product.id.as_str()),
            just_added: flashed.contains(&product.id),
        }
    }
}

/// Option in a `<select>`.
#[derive(Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub cart_count: u64,
    pub query: String,
    pub categories: Vec<SelectOption>,
    pub sort_options: Vec<SelectOption>,
    pub products: Vec<ProductCardView>,
    pub summary: String,
    pub return_to: String,
}

/// One image in the detail gallery.
#[derive(Clone)]
pub struct GalleryImage {
    pub index: usize,
    pub url: String,
    pub selected: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub cart_count: u64,
    pub product: Product,
    pub price: String,
    pub original_price: Option<String>,
    pub discount_percent: u32,
    pub main_image: String,
    pub gallery: Vec<GalleryImage>,
    pub features: Vec<String>,
    /// Quantity already in the cart, 0 if none.
    pub in_cart_quantity: u32,
    pub just_added: bool,
    pub related_products: Vec<ProductCardView>,
    pub return_to: String,
}

/// Detail page query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    /// Selected gallery image.
    pub image: Option<usize>,
}

fn category_options(categories: Vec<String>, selected: &CategoryFilter) -> Vec<SelectOption> {
    categories
        .into_iter()
        .map(|category| SelectOption {
            selected: category == selected.as_str(),
            label: category.clone(),
            value: category,
        })
        .collect()
}

fn sort_options(selected: SortKey) -> Vec<SelectOption> {
    SortKey::options()
        .into_iter()
        .map(|(key, label)| SelectOption {
            value: key.as_str().to_string(),
            label: label.to_string(),
            selected: key == selected,
        })
        .collect()
}

/// The listing URL that reproduces `query`, for redirects back after adding.
pub(crate) fn listing_url(query: &ListingQuery) -> String {
    let mut url = String::from("/products");
    let mut params = Vec::new();
    if !query.query.is_empty() {
        params.push(format!("q={}", urlencoding::encode(&query.query)));
    }
    if let CategoryFilter::Only(category) = &query.category {
        params.push(format!("category={}", urlencoding::encode(category)));
    }
    if query.sort != SortKey::default() {
        params.push(format!("sort={}", query.sort.as_str()));
    }
    if !params.is_empty() {
        url.push('?');
        url.push_str(&params.join("&"));
    }
    url
}

/// Display product listing page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<ListingQuery>,
) -> ProductsIndexTemplate {
    let catalog = state.catalog();
    let products = query.apply(catalog);

    let visitor = visitor_id(&session).await;
    let flashed = state.flashes().active_in_scope(&visitor);
    let cart = load_cart(&state, session).await;

    tracing::debug!(
        query = %query.query,
        category = %query.category,
        sort = query.sort.as_str(),
        shown = products.len(),
        "Listing products"
    );

    ProductsIndexTemplate {
        cart_count: cart.cart().item_count(),
        query: query.query.clone(),
        categories: category_options(listing::categories(catalog), &query.category),
        sort_options: sort_options(query.sort),
        summary: listing::summary(products.len(), catalog.len(), &query.category),
        products: products
            .into_iter()
            .map(|p| ProductCardView::new(p, cart.cart(), &flashed))
            .collect(),
        return_to: listing_url(&query),
    }
}

/// Display product detail page.
///
/// # Errors
///
/// Returns 404 if no product has this id.
#[instrument(skip(state, session))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Query(query): Query<DetailQuery>,
) -> Result<ProductShowTemplate> {
    let catalog = state.catalog();
    let product = catalog
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let visitor = visitor_id(&session).await;
    let flashed = state.flashes().active_in_scope(&visitor);
    let just_added = state
        .flashes()
        .is_active(&FlashKey::new(visitor, product.id.clone()));
    let cart = load_cart(&state, session).await;

    let images = product.images();
    let selected = query.image.filter(|i| *i < images.len()).unwrap_or(0);
    let gallery: Vec<GalleryImage> = images
        .iter()
        .enumerate()
        .map(|(index, url)| GalleryImage {
            index,
            url: (*url).to_string(),
            selected: index == selected,
        })
        .collect();
    let main_image = gallery
        .iter()
        .find(|g| g.selected)
        .map_or_else(|| product.image.clone(), |g| g.url.clone());

    let in_cart_quantity = cart
        .cart()
        .get(product.id.as_str())
        .map_or(0, |entry| entry.quantity);

    Ok(ProductShowTemplate {
        cart_count: cart.cart().item_count(),
        price: product.display_price().display(),
        original_price: product.display_original_price().map(|p| p.display()),
        discount_percent: product.discount_percent(),
        main_image,
        gallery,
        features: product.features.clone().unwrap_or_default(),
        in_cart_quantity,
        just_added,
        related_products: catalog
            .related(product, RELATED_LIMIT)
            .into_iter()
            .map(|p| ProductCardView::new(p, cart.cart(), &flashed))
            .collect(),
        return_to: format!("/products/{}", urlencoding::encode(product.id.as_str())),
        product: product.clone(),
    })
}
