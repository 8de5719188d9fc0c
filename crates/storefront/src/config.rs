//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//!
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `STOREFRONT_CATALOG_PATH` - Product catalog JSON (default: crates/storefront/data/products.json)
//! - `STOREFRONT_CART_KEY` - Session slot holding the cart (default: handicrafts-cart)
//! - `STOREFRONT_CHECKOUT_DELAY_MS` - Simulated order processing time (default: 2000)
//! - `STOREFRONT_CARD_FLASH_MS` - "Added" flash on product cards (default: 2000)
//! - `STOREFRONT_DETAIL_FLASH_MS` - "Added" flash on the product page (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate, 0.0-1.0 (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Transaction sample rate, 0.0-1.0 (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use handicrafts_core::DEFAULT_CART_KEY;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Path of the JSON product catalog
    pub catalog_path: PathBuf,
    /// Session slot the cart is mirrored into
    pub cart_key: String,
    /// Timings for simulated and transient UI behaviour
    pub timing: TimingConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "production", "staging")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry performance traces sample rate
    pub sentry_traces_sample_rate: f32,
}

/// Delays for the simulated checkout and the "added to cart" flashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub checkout_delay: Duration,
    pub card_flash: Duration,
    pub detail_flash: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            checkout_delay: Duration::from_millis(2000),
            card_flash: Duration::from_millis(2000),
            detail_flash: Duration::from_millis(3000),
        }
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            catalog_path: PathBuf::from("crates/storefront/data/products.json"),
            cart_key: DEFAULT_CART_KEY.to_string(),
            timing: TimingConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = parse_or("STOREFRONT_HOST", &lookup, defaults.host)?;
        let port = parse_or("STOREFRONT_PORT", &lookup, defaults.port)?;
        let base_url = lookup("STOREFRONT_BASE_URL").unwrap_or(defaults.base_url);
        let catalog_path = lookup("STOREFRONT_CATALOG_PATH")
            .map_or(defaults.catalog_path, PathBuf::from);
        let cart_key = lookup("STOREFRONT_CART_KEY")
            .filter(|key| !key.trim().is_empty())
            .unwrap_or(defaults.cart_key);

        let timing = TimingConfig {
            checkout_delay: millis_or("STOREFRONT_CHECKOUT_DELAY_MS", &lookup, defaults.timing.checkout_delay)?,
            card_flash: millis_or("STOREFRONT_CARD_FLASH_MS", &lookup, defaults.timing.card_flash)?,
            detail_flash: millis_or("STOREFRONT_DETAIL_FLASH_MS", &lookup, defaults.timing.detail_flash)?,
        };

        let sentry_sample_rate = parse_rate("SENTRY_SAMPLE_RATE", &lookup, defaults.sentry_sample_rate)?;
        let sentry_traces_sample_rate =
            parse_rate("SENTRY_TRACES_SAMPLE_RATE", &lookup, defaults.sentry_traces_sample_rate)?;

        Ok(Self {
            host,
            port,
            base_url,
            catalog_path,
            cart_key,
            timing,
            sentry_dsn: lookup("SENTRY_DSN").filter(|dsn| !dsn.is_empty()),
            sentry_environment: lookup("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable if present, otherwise use the default.
fn parse_or<T>(key: &str, lookup: impl Fn(&str) -> Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn millis_or(
    key: &str,
    lookup: impl Fn(&str) -> Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    lookup(key).map_or(Ok(default), |raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Parse a sample rate and check it lies in 0.0-1.0.
fn parse_rate(
    key: &str,
    lookup: impl Fn(&str) -> Option<String>,
    default: f32,
) -> Result<f32, ConfigError> {
    let rate = parse_or(key, lookup, default)?;
    if (0.0..=1.0).contains(&rate) {
        Ok(rate)
    } else {
        Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must be between 0.0 and 1.0 (got {rate})"),
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.cart_key, "handicrafts-cart");
        assert_eq!(config.timing, TimingConfig::default());
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = StorefrontConfig::from_lookup(lookup_from(&[
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_CART_KEY", "my-cart"),
            ("STOREFRONT_CHECKOUT_DELAY_MS", "0"),
            ("STOREFRONT_CATALOG_PATH", "/srv/products.json"),
            ("SENTRY_SAMPLE_RATE", "0.5"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.cart_key, "my-cart");
        assert_eq!(config.timing.checkout_delay, Duration::ZERO);
        assert_eq!(config.catalog_path, PathBuf::from("/srv/products.json"));
        assert!((config.sentry_sample_rate - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_cart_key_uses_default() {
        let config =
            StorefrontConfig::from_lookup(lookup_from(&[("STOREFRONT_CART_KEY", "  ")])).unwrap();
        assert_eq!(config.cart_key, DEFAULT_CART_KEY);
    }

    #[test]
    fn test_invalid_port() {
        let err = StorefrontConfig::from_lookup(lookup_from(&[("STOREFRONT_PORT", "http")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "STOREFRONT_PORT"));
    }

    #[test]
    fn test_invalid_delay() {
        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("STOREFRONT_CARD_FLASH_MS", "-1")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_sample_rate_out_of_range() {
        let result =
            StorefrontConfig::from_lookup(lookup_from(&[("SENTRY_TRACES_SAMPLE_RATE", "1.5")]));
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }
}
