//! Application state shared across handlers.

use std::path::Path;
use std::sync::Arc;

use handicrafts_core::{Catalog, CatalogError};

use crate::config::StorefrontConfig;
use crate::flash::FlashBoard;

/// Error loading the catalog at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("failed to read catalog {path}: {source}")]
    ReadCatalog {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The catalog is read-only after
/// startup; carts live in sessions, not here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    flashes: FlashBoard,
}

impl AppState {
    /// Create a new application state from an already loaded catalog.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                flashes: FlashBoard::new(),
            }),
        }
    }

    /// Load the catalog named by `config.catalog_path` and build the state.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog file is missing or invalid.
    pub fn load(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = load_catalog(&config.catalog_path)?;
        tracing::info!(
            path = %config.catalog_path.display(),
            products = catalog.len(),
            "Catalog loaded"
        );
        Ok(Self::new(config, catalog))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the flash message registry.
    #[must_use]
    pub fn flashes(&self) -> &FlashBoard {
        &self.inner.flashes
    }
}

/// Read and validate a JSON catalog file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not hold a valid catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog, StateError> {
    let json = std::fs::read_to_string(path).map_err(|source| StateError::ReadCatalog {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Catalog::from_json(&json)?)
}
