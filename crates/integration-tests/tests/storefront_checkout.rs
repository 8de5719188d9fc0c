//! Checkout validation and simulated order placement.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use handicrafts_integration_tests::TestApp;

const VALID_PAYPAL: &[(&str, &str)] = &[
    ("first_name", "Ada"),
    ("last_name", "Lovelace"),
    ("email", "ada@example.com"),
    ("phone", "555-0100"),
    ("address", "1 Loom Lane"),
    ("city", "London"),
    ("state", "LDN"),
    ("zip_code", "12345"),
    ("payment_method", "paypal"),
    ("agree_to_terms", "on"),
];

#[tokio::test]
async fn test_empty_cart_redirects_to_cart() {
    let mut app = TestApp::new();

    let res = app.get("/checkout").await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location.as_deref(), Some("/cart"));

    let res = app.post_form("/checkout", VALID_PAYPAL).await;
    assert_eq!(res.location.as_deref(), Some("/cart"));
}

#[tokio::test]
async fn test_checkout_form_shows_summary() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("product_id", "scarf"), ("quantity", "2")])
        .await;

    let res = app.get("/checkout").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Order Summary"));
    assert!(res.body.contains("$40.00"));
    assert!(res.body.contains("Free"));
}

#[tokio::test]
async fn test_invalid_form_reports_every_error_and_keeps_values() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("product_id", "scarf")]).await;

    let res = app
        .post_form(
            "/checkout",
            &[
                ("first_name", "Ada"),
                ("email", "not-an-email"),
                ("payment_method", "credit"),
            ],
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Please correct the highlighted fields."));
    assert!(res.body.contains(r#"value="Ada""#));
    assert!(res.body.contains("Last name is required"));
    assert!(res.body.contains("Enter a valid email address"));
    assert!(res.body.contains("Card number is required"));
    assert!(res.body.contains("You must agree to the terms"));
    assert!(!res.body.contains("First name is required"));

    // Nothing was ordered
    let res = app.get("/cart").await;
    assert!(res.body.contains("Red Scarf"));
}

#[tokio::test]
async fn test_paypal_order_needs_no_card_and_clears_cart() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("product_id", "calendar"), ("quantity", "3")])
        .await;

    let res = app.post_form("/checkout", VALID_PAYPAL).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("Order Confirmed!"));
    assert!(res.body.contains("Thank you, Ada Lovelace."));
    assert!(res.body.contains("HC-"));
    assert!(res.body.contains("$45.00"));
    assert!(res.body.contains("PayPal"));

    let res = app.get("/cart").await;
    assert!(res.body.contains("Your cart is empty"));
}

#[tokio::test]
async fn test_card_order() {
    let mut app = TestApp::new();
    app.post_form("/cart/add", &[("product_id", "bookmark")]).await;

    let mut fields: Vec<(&str, &str)> = VALID_PAYPAL
        .iter()
        .copied()
        .filter(|(k, _)| *k != "payment_method")
        .collect();
    fields.extend([
        ("payment_method", "credit"),
        ("card_number", "4242 4242 4242 4242"),
        ("expiry_date", "12/30"),
        ("cvv", "123"),
    ]);

    let res = app.post_form("/checkout", &fields).await;
    assert!(res.body.contains("Order Confirmed!"));
    assert!(res.body.contains("Credit Card"));
}
