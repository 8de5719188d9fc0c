//! Session-related types.
//!
//! The storefront has no accounts; the session only carries the cart slot
//! and an anonymous visitor id used to scope flash messages.

/// Session keys.
pub mod keys {
    /// Key for the anonymous visitor id.
    pub const VISITOR_ID: &str = "visitor_id";
}
