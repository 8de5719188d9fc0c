//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Renders a 0-5 rating as five stars, rounding to the nearest whole star.
///
/// Usage in templates: `{{ product.rating|stars }}`
#[askama::filter_fn]
pub fn stars(rating: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(star_string(&rating.to_string()))
}

fn star_string(rating: &str) -> String {
    let value = rating.parse::<f32>().unwrap_or(0.0).clamp(0.0, 5.0);
    // value is within 0..=5
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let filled = value.round() as usize;
    let mut out = "★".repeat(filled);
    out.push_str(&"☆".repeat(5 - filled));
    out
}
