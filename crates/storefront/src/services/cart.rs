//! Cart persisted in the visitor's session.
//!
//! The session slot plays the part browser local storage played for the
//! static storefront: each request hydrates a [`CartManager`] over a
//! [`MemoryStore`] snapshot of the slot, mutates it, and copies the slot back.

use handicrafts_core::{Cart, CartManager, KeyValueStore, MemoryStore};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::Result;
use crate::models::session_keys;

/// A request-scoped cart backed by the session.
#[derive(Debug)]
pub struct SessionCart {
    session: Session,
    manager: CartManager<MemoryStore>,
}

impl SessionCart {
    /// Hydrate the cart stored under `key`. Read failures give an empty cart.
    pub async fn load(session: Session, key: &str) -> Self {
        let stored = match session.get::<String>(key).await {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(key, "Failed to read cart from session: {e}");
                None
            }
        };
        let store = stored.map_or_else(MemoryStore::new, |raw| MemoryStore::with_value(key, raw));

        Self {
            session,
            manager: CartManager::hydrate_with_key(store, key),
        }
    }

    #[must_use]
    pub fn cart(&self) -> &Cart {
        self.manager.cart()
    }

    /// The underlying manager, for mutations.
    pub fn manager(&mut self) -> &mut CartManager<MemoryStore> {
        &mut self.manager
    }

    /// Copy the slot back into the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read or the session store
    /// rejects the write.
    pub async fn save(self) -> Result<()> {
        let key = self.manager.key().to_owned();
        let store = self.manager.into_store();

        let Some(stored) = store.get(&key)? else {
            return Ok(());
        };
        self.session.insert(&key, stored).await?;
        Ok(())
    }
}

/// Stable per-session visitor id, created on first use.
pub async fn visitor_id(session: &Session) -> String {
    if let Ok(Some(id)) = session.get::<String>(session_keys::VISITOR_ID).await {
        return id;
    }

    let id = Uuid::new_v4().to_string();
    if let Err(e) = session.insert(session_keys::VISITOR_ID, &id).await {
        tracing::warn!("Failed to store visitor id: {e}");
    }
    id
}
