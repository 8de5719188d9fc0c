//! Cart flow through the session-backed cart.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use handicrafts_integration_tests::TestApp;

#[tokio::test]
async fn test_empty_cart() {
    let mut app = TestApp::new();
    let res = app.get("/cart").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Your cart is empty"));

    let res = app.get("/cart/count").await;
    assert!(res.body.contains(">0</span>"));
}

#[tokio::test]
async fn test_add_redirects_back_and_accumulates() {
    let mut app = TestApp::new();

    let res = app
        .post_form(
            "/cart/add",
            &[("product_id", "scarf"), ("return_to", "/products?q=red")],
        )
        .await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/products?q=red"));

    app.post_form("/cart/add", &[("product_id", "scarf"), ("quantity", "2")])
        .await;
    app.post_form("/cart/add", &[("product_id", "bookmark")])
        .await;

    let res = app.get("/cart/count").await;
    assert!(res.body.contains(">4</span>"));

    let res = app.get("/cart").await;
    assert!(res.body.contains("Cart Items (4)"));
    // 3 x $20.00 + 1 x $5.00
    assert!(res.body.contains("$60.00"));
    assert!(res.body.contains("$65.00"));
    // Lines keep first-add order
    let scarf = res.body.find("Red Scarf").unwrap();
    let bookmark = res.body.find("Red Bookmark").unwrap();
    assert!(scarf < bookmark);
}

#[tokio::test]
async fn test_add_rejects_offsite_return() {
    let mut app = TestApp::new();
    let res = app
        .post_form(
            "/cart/add",
            &[("product_id", "scarf"), ("return_to", "//evil.example/")],
        )
        .await;
    assert_eq!(res.location.as_deref(), Some("/products"));
}

#[tokio::test]
async fn test_buy_now_goes_to_cart() {
    let mut app = TestApp::new();
    let res = app
        .post_form(
            "/cart/add",
            &[
                ("product_id", "calendar"),
                ("source", "detail"),
                ("return_to", "/products/calendar"),
                ("buy_now", "1"),
            ],
        )
        .await;
    assert_eq!(res.location.as_deref(), Some("/cart"));
}

#[tokio::test]
async fn test_add_unknown_product_is_404() {
    let mut app = TestApp::new();
    let res = app.post_form("/cart/add", &[("product_id", "ghost")]).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_zero_quantity_is_ignored() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("product_id", "scarf"), ("quantity", "0")])
        .await;
    let res = app.get("/cart").await;
    assert!(res.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_update_remove_and_clear() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("product_id", "scarf"), ("quantity", "2")])
        .await;
    app.post_form("/cart/add", &[("product_id", "calendar")])
        .await;

    let res = app
        .post_form("/cart/update", &[("product_id", "scarf"), ("quantity", "5")])
        .await;
    assert_eq!(res.location.as_deref(), Some("/cart"));
    let res = app.get("/cart").await;
    assert!(res.body.contains("Cart Items (6)"));

    // Quantity zero or below removes the line
    app.post_form("/cart/update", &[("product_id", "scarf"), ("quantity", "-3")])
        .await;
    let res = app.get("/cart").await;
    assert!(!res.body.contains("Red Scarf"));
    assert!(res.body.contains("Cart Items (1)"));

    app.post_form("/cart/remove", &[("product_id", "calendar")])
        .await;
    let res = app.get("/cart").await;
    assert!(res.body.contains("Your cart is empty"));

    app.post_form("/cart/add", &[("product_id", "bookmark")])
        .await;
    let res = app.post_form("/cart/clear", &[]).await;
    assert_eq!(res.location.as_deref(), Some("/cart"));
    let res = app.get("/cart/count").await;
    assert!(res.body.contains(">0</span>"));
}

#[tokio::test]
async fn test_carts_are_per_visitor() {
    let mut alice = TestApp::new();
    let mut bob = alice.new_visitor();

    alice
        .post_form("/cart/add", &[("product_id", "scarf")])
        .await;

    let res = bob.get("/cart").await;
    assert!(res.body.contains("Your cart is empty"));
    let res = alice.get("/cart").await;
    assert!(res.body.contains("Red Scarf"));
}

#[tokio::test]
async fn test_added_flash_expires() {
    let mut app = TestApp::new();
    app.post_form(
        "/cart/add",
        &[("product_id", "calendar"), ("return_to", "/products")],
    )
    .await;

    let res = app.get("/products").await;
    assert!(res.body.contains("Added!"));

    tokio::time::sleep(Duration::from_millis(600)).await;
    let res = app.get("/products").await;
    assert!(!res.body.contains("Added!"));
    assert!(res.body.contains("Add Another"));
}

#[tokio::test]
async fn test_visiting_cart_cancels_flash() {
    let mut app = TestApp::new();
    app.post_form(
        "/cart/add",
        &[("product_id", "calendar"), ("source", "detail")],
    )
    .await;

    let res = app.get("/products/calendar").await;
    assert!(res.body.contains("Added to Cart!"));

    app.get("/cart").await;
    let res = app.get("/products/calendar").await;
    assert!(!res.body.contains("Added to Cart!"));
}
