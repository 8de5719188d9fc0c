//! Key-value persistence for carts.
//!
//! A cart is mirrored into a single string slot of a [`KeyValueStore`]. The
//! browser storefront used local storage; here the backing store is pluggable
//! so the cart logic runs the same against memory, a file, or a web session.

use std::collections::HashMap;

use thiserror::Error;

/// Errors a store can report. Cart code logs these and carries on.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store could not be reached at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Writing the value would exceed the store's capacity.
    #[error("storage quota exceeded: {needed} bytes needed, {limit} available")]
    QuotaExceeded { needed: usize, limit: usize },

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be encoded or decoded.
    #[error("storage serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A synchronous string key-value store with a get/set/clear surface.
pub trait KeyValueStore {
    /// Read the value under `key`; `Ok(None)` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the value cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove the value under `key`. Clearing a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the store cannot be modified.
    fn clear(&mut self, key: &str) -> Result<(), StorageError>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn clear(&mut self, key: &str) -> Result<(), StorageError> {
        (**self).clear(key)
    }
}

/// In-memory store, optionally capped at a total byte quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects writes once keys plus values exceed `bytes`.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            values: HashMap::new(),
            quota: Some(bytes),
        }
    }

    /// Seed a store with a single value, e.g. a cart read from a session.
    #[must_use]
    pub fn with_value(key: &str, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.to_owned(), value.into());
        Self {
            values,
            quota: None,
        }
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(limit) = self.quota {
            let needed = self.used_bytes_without(key) + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn clear(&mut self, key: &str) -> Result<(), StorageError> {
        self.values.remove(key);
        Ok(())
    }
}
