//! Integration tests for the Handicrafts storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p handicrafts-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `storefront_pages` - Catalog, listing and detail pages
//! - `storefront_cart` - Cart flow through sessions, flashes
//! - `storefront_checkout` - Checkout validation and simulated orders
//! - `cart_persistence` - File-backed cart round trips
//!
//! Tests drive the real [`axum::Router`] in-process with
//! [`tower::ServiceExt::oneshot`]; no server or network is needed.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use handicrafts_core::Catalog;
use handicrafts_storefront::config::TimingConfig;
use handicrafts_storefront::{AppState, StorefrontConfig, app};
use tower::ServiceExt;

/// Small catalog shared by the router tests.
pub const TEST_CATALOG: &str = r#"[
    {"id": "scarf", "title": "Red Scarf", "category": "Crochet", "price": "20.00",
     "originalPrice": "25.00", "image": "/static/scarf.svg", "description": "A warm winter scarf",
     "features": ["Merino blend"], "inStock": true, "rating": 4.5, "reviews": 12},
    {"id": "calendar", "title": "Blue Calendar", "category": "Calendars", "price": "15.00",
     "image": "/static/calendar.svg", "description": "Twelve months of watercolor",
     "inStock": true, "rating": 4.8, "reviews": 30},
    {"id": "bookmark", "title": "Red Bookmark", "category": "Gifts", "price": "5.00",
     "image": "/static/bookmark.svg",
     "gallery": ["/static/bookmark.svg", "/static/bookmark-back.svg"],
     "description": "Pressed flowers", "inStock": true, "rating": 4.1, "reviews": 7},
    {"id": "hat", "title": "Cozy Hat", "category": "Crochet", "price": "18.00",
     "image": "/static/hat.svg", "description": "Chunky knit", "inStock": false,
     "rating": 3.9, "reviews": 2}
]"#;

/// Configuration with timings short enough for tests.
#[must_use]
pub fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        timing: TimingConfig {
            checkout_delay: Duration::from_millis(10),
            card_flash: Duration::from_millis(300),
            detail_flash: Duration::from_millis(300),
        },
        ..StorefrontConfig::default()
    }
}

/// A response with the body collected as text.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

/// An in-process storefront with a single visitor's cookie jar.
pub struct TestApp {
    router: Router,
    cookie: Option<String>,
}

impl TestApp {
    /// Storefront over [`TEST_CATALOG`] with [`test_config`].
    ///
    /// # Panics
    ///
    /// Panics if the test catalog is invalid.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn new() -> Self {
        let catalog = Catalog::from_json(TEST_CATALOG).unwrap();
        Self::with_state(AppState::new(test_config(), catalog))
    }

    #[must_use]
    pub fn with_state(state: AppState) -> Self {
        Self {
            router: app(state),
            cookie: None,
        }
    }

    /// A second visitor sharing the same server (and session store).
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            router: self.router.clone(),
            cookie: None,
        }
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        let request = Request::get(uri);
        self.send(request, Body::empty()).await
    }

    /// Send a form POST; `fields` are URL-encoded.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        self.send(request, Body::from(body)).await
    }

    #[allow(clippy::unwrap_used)]
    async fn send(&mut self, mut request: axum::http::request::Builder, body: Body) -> TestResponse {
        if let Some(cookie) = &self.cookie {
            request = request.header(header::COOKIE, cookie);
        }
        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            location,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(char::from(byte));
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
