//! Shopping cart state.
//!
//! [`Cart`] is the plain value: an ordered list of [`CartEntry`] with at most
//! one entry per product. [`CartManager`] owns a cart plus a
//! [`KeyValueStore`] and mirrors the whole cart into one slot after every
//! mutation. The in-memory cart stays authoritative; storage failures are
//! logged and swallowed.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::catalog::Product;
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{Price, ProductId};

/// Storage slot used when no other key is configured.
pub const DEFAULT_CART_KEY: &str = "handicrafts-cart";

/// A product snapshot plus the quantity the shopper wants.
///
/// Serialized flat: every product field followed by `quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartEntry {
    #[serde(flatten)]
    pub product: Product,
    pub quantity: u32,
}

impl CartEntry {
    #[must_use]
    pub fn id(&self) -> &ProductId {
        &self.product.id
    }

    /// `price * quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }

    #[must_use]
    pub fn display_line_total(&self) -> Price {
        Price::usd(self.line_total())
    }
}

/// An ordered collection of cart entries, in first-added order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a cart from raw entries, merging duplicate ids and dropping
    /// zero-quantity lines. The first occurrence keeps its position and
    /// product snapshot.
    #[must_use]
    pub fn from_entries(entries: impl IntoIterator<Item = CartEntry>) -> Self {
        let mut cart = Self::new();
        for entry in entries {
            if entry.quantity == 0 {
                continue;
            }
            match cart.position(entry.id().as_str()) {
                Some(idx) => {
                    if let Some(existing) = cart.entries.get_mut(idx) {
                        existing.quantity = existing.quantity.saturating_add(entry.quantity);
                    }
                }
                None => cart.entries.push(entry),
            }
        }
        cart
    }

    /// Parse a serialized cart (a JSON array of entries).
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the value is not a list of entries.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<CartEntry> = serde_json::from_str(json)?;
        Ok(Self::from_entries(entries))
    }

    /// Serialize to the persisted layout.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.entries)
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of distinct lines (not units; see [`Cart::item_count`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, product_id: &str) -> Option<&CartEntry> {
        self.entries.iter().find(|e| e.id().as_str() == product_id)
    }

    fn position(&self, product_id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.id().as_str() == product_id)
    }

    /// Add `quantity` units of `product`.
    ///
    /// An existing line is incremented; otherwise a snapshot of the product is
    /// appended. A zero quantity is ignored. Returns whether the cart changed.
    pub fn add(&mut self, product: &Product, quantity: u32) -> bool {
        if quantity == 0 {
            return false;
        }
        match self.entries.iter_mut().find(|e| e.product.id == product.id) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => self.entries.push(CartEntry {
                product: product.clone(),
                quantity,
            }),
        }
        true
    }

    /// Remove the line for `product_id`. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id().as_str() != product_id);
        self.entries.len() != before
    }

    /// Replace a line's quantity; zero or negative removes the line.
    ///
    /// Unknown ids are left alone. Returns whether the cart changed.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> bool {
        if quantity <= 0 {
            return self.remove(product_id);
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        match self.entries.iter_mut().find(|e| e.id().as_str() == product_id) {
            Some(entry) if entry.quantity != quantity => {
                entry.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entries.iter().map(CartEntry::line_total).sum()
    }

    /// Sum of quantities across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.position(product_id).is_some()
    }
}

/// Decode a stored slot value.
fn decode(raw: &str) -> Result<Cart, StorageError> {
    Ok(Cart::from_json(raw)?)
}

/// A cart bound to a persistence slot.
///
/// Hydrates once on construction and writes the full cart back after every
/// mutating call. Storage errors never reach the caller.
#[derive(Debug)]
pub struct CartManager<S> {
    cart: Cart,
    store: S,
    key: String,
}

impl<S: KeyValueStore> CartManager<S> {
    /// Hydrate from the default slot ([`DEFAULT_CART_KEY`]).
    pub fn hydrate(store: S) -> Self {
        Self::hydrate_with_key(store, DEFAULT_CART_KEY)
    }

    /// Hydrate from `key`. Absent or unreadable data yields an empty cart.
    pub fn hydrate_with_key(store: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let cart = match store.get(&key) {
            Ok(Some(raw)) => decode(&raw).unwrap_or_else(|e| {
                tracing::warn!(key = %key, error = %e, "Discarding malformed stored cart");
                Cart::new()
            }),
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to load cart from storage");
                Cart::new()
            }
        };
        tracing::debug!(key = %key, lines = cart.len(), "Cart hydrated");

        Self { cart, store, key }
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Give the store back, e.g. to copy the slot into a web session.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub fn add(&mut self, product: &Product, quantity: u32) {
        if !self.cart.add(product, quantity) {
            tracing::debug!("Ignoring add with zero quantity");
            return;
        }
        self.persist();
    }

    #[instrument(skip(self))]
    pub fn remove(&mut self, product_id: &str) {
        self.cart.remove(product_id);
        self.persist();
    }

    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) {
        self.cart.set_quantity(product_id, quantity);
        self.persist();
    }

    #[instrument(skip(self))]
    pub fn clear(&mut self) {
        self.cart.clear();
        self.persist();
    }

    #[must_use]
    pub fn total(&self) -> Decimal {
        self.cart.total()
    }

    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.cart.item_count()
    }

    #[must_use]
    pub fn contains(&self, product_id: &str) -> bool {
        self.cart.contains(product_id)
    }

    fn persist(&mut self) {
        let result = self
            .cart
            .to_json()
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(&self.key, &json));
        if let Err(e) = result {
            tracing::error!(key = %self.key, error = %e, "Failed to save cart to storage");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::tests::product;
    use crate::storage::MemoryStore;

    /// A store whose reads and writes always fail.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }

        fn clear(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable("disk on fire".to_string()))
        }
    }

    fn scarf() -> Product {
        product("a", "Red Scarf", "Crochet", 20)
    }

    fn calendar() -> Product {
        product("b", "Blue Calendar", "Calendars", 15)
    }

    #[test]
    fn test_repeated_add_merges() {
        let mut cart = Cart::new();
        cart.add(&scarf(), 1);
        cart.add(&scarf(), 2);
        cart.add(&scarf(), 4);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get("a").unwrap().quantity, 7);
    }

    #[test]
    fn test_add_keeps_first_added_order() {
        let mut cart = Cart::new();
        cart.add(&calendar(), 1);
        cart.add(&scarf(), 1);
        cart.add(&calendar(), 1);

        let ids: Vec<_> = cart.entries().iter().map(|e| e.id().as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_add_zero_is_ignored() {
        let mut cart = Cart::new();
        assert!(!cart.add(&scarf(), 0));
        assert!(cart.is_empty());
        assert!(!cart.contains("a"));
    }

    #[test]
    fn test_add_snapshots_product() {
        let mut cart = Cart::new();
        let mut p = scarf();
        cart.add(&p, 1);

        p.price = Decimal::new(99, 0);
        cart.add(&p, 1);

        // The line keeps the price from the first add
        assert_eq!(cart.get("a").unwrap().product.price, Decimal::new(20, 0));
        assert_eq!(cart.total(), Decimal::new(40, 0));
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        cart.add(&scarf(), 1);
        cart.add(&calendar(), 1);

        assert!(cart.remove("a"));
        assert!(!cart.contains("a"));
        assert!(cart.contains("b"));

        let before = cart.clone();
        assert!(!cart.remove("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_set_quantity_non_positive_removes() {
        for quantity in [0, -5] {
            let mut cart = Cart::new();
            cart.add(&scarf(), 3);
            cart.set_quantity("a", quantity);
            assert!(!cart.contains("a"), "quantity {quantity} should remove");
        }
    }

    #[test]
    fn test_set_quantity_replaces() {
        let mut cart = Cart::new();
        cart.add(&scarf(), 3);
        assert!(cart.set_quantity("a", 10));
        assert_eq!(cart.get("a").unwrap().quantity, 10);
        assert!(!cart.set_quantity("a", 10));
        assert!(!cart.set_quantity("missing", 2));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_and_item_count() {
        let mut cart = Cart::new();
        cart.add(&scarf(), 2);
        cart.add(&calendar(), 3);
        cart.add(&product("c", "Red Bookmark", "Gifts", 5), 1);

        // 2*20 + 3*15 + 1*5
        assert_eq!(cart.total(), Decimal::new(90, 0));
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.len(), 3);

        cart.set_quantity("b", 1);
        assert_eq!(cart.total(), Decimal::new(60, 0));
        assert_eq!(cart.item_count(), 4);

        cart.clear();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_decimal_total_is_exact() {
        let mut cheap = product("p", "Pin", "Gifts", 0);
        cheap.price = Decimal::new(10, 2);
        let mut cart = Cart::new();
        cart.add(&cheap, 3);
        assert_eq!(cart.total(), Decimal::new(30, 2));
    }

    #[test]
    fn test_persisted_layout_is_flat() {
        let mut cart = Cart::new();
        cart.add(&scarf(), 2);
        let value: serde_json::Value = serde_json::from_str(&cart.to_json().unwrap()).unwrap();

        let entry = &value[0];
        assert_eq!(entry["id"], "a");
        assert_eq!(entry["title"], "Red Scarf");
        assert_eq!(entry["inStock"], true);
        assert_eq!(entry["quantity"], 2);
    }

    #[test]
    fn test_from_json_normalizes() {
        let mut cart = Cart::new();
        cart.add(&scarf(), 2);
        cart.add(&calendar(), 1);
        let mut entries: Vec<CartEntry> = cart.entries().to_vec();
        entries.push(CartEntry {
            product: scarf(),
            quantity: 3,
        });
        entries.push(CartEntry {
            product: product("z", "Zero", "Gifts", 1),
            quantity: 0,
        });
        let json = serde_json::to_string(&entries).unwrap();

        let restored = Cart::from_json(&json).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.get("a").unwrap().quantity, 5);
        assert!(!restored.contains("z"));
    }

    #[test]
    fn test_manager_persists_every_mutation() {
        let mut manager = CartManager::hydrate(MemoryStore::new());
        manager.add(&scarf(), 2);

        let stored = manager.store().get(DEFAULT_CART_KEY).unwrap().unwrap();
        assert_eq!(Cart::from_json(&stored).unwrap(), *manager.cart());

        manager.set_quantity("a", 5);
        let stored = manager.store().get(DEFAULT_CART_KEY).unwrap().unwrap();
        assert_eq!(Cart::from_json(&stored).unwrap().item_count(), 5);

        manager.clear();
        let stored = manager.store().get(DEFAULT_CART_KEY).unwrap().unwrap();
        assert_eq!(stored, "[]");
    }

    #[test]
    fn test_manager_round_trip() {
        let mut manager = CartManager::hydrate(MemoryStore::new());
        let mut discounted = product("c", "Red Bookmark", "Gifts", 5);
        discounted.original_price = Some(Decimal::new(750, 2));
        discounted.gallery = Some(vec!["one.jpg".to_string(), "two.jpg".to_string()]);
        discounted.features = Some(vec!["Pressed flowers".to_string()]);
        discounted.in_stock = false;

        manager.add(&calendar(), 1);
        manager.add(&discounted, 4);
        manager.add(&scarf(), 2);
        let original = manager.cart().clone();

        let reloaded = CartManager::hydrate(manager.into_store());
        assert_eq!(*reloaded.cart(), original);
    }

    #[test]
    fn test_manager_custom_key() {
        let mut manager = CartManager::hydrate_with_key(MemoryStore::new(), "other-cart");
        manager.add(&scarf(), 1);
        assert_eq!(manager.key(), "other-cart");

        let store = manager.into_store();
        assert!(store.get(DEFAULT_CART_KEY).unwrap().is_none());
        assert!(store.get("other-cart").unwrap().is_some());
    }

    #[test]
    fn test_manager_malformed_storage_is_empty() {
        for raw in ["not json", "{\"id\":1}", "[{\"quantity\":2}]"] {
            let store = MemoryStore::with_value(DEFAULT_CART_KEY, raw);
            let manager = CartManager::hydrate(store);
            assert!(manager.cart().is_empty(), "{raw} should hydrate empty");
        }
    }

    #[test]
    fn test_malformed_slot_is_a_serialization_error() {
        let err = decode("[{\"quantity\":2}]").unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
        assert!(err.to_string().starts_with("storage serialization error"));

        let cart = decode("[]").unwrap();
        assert!(cart.is_empty());
    }

    #[test]
    fn test_manager_survives_broken_store() {
        let mut manager = CartManager::hydrate(BrokenStore);
        assert!(manager.cart().is_empty());

        manager.add(&scarf(), 2);
        manager.add(&calendar(), 1);
        assert_eq!(manager.item_count(), 3);
        assert_eq!(manager.total(), Decimal::new(55, 0));
        assert!(manager.contains("b"));
    }

    #[test]
    fn test_manager_quota_keeps_memory_state() {
        let mut manager = CartManager::hydrate(MemoryStore::with_quota(32));
        manager.add(&scarf(), 1);

        // The write failed, but the session still sees the line
        assert!(manager.contains("a"));
        assert!(manager.store().get(DEFAULT_CART_KEY).unwrap().is_none());
    }

    #[test]
    fn test_manager_add_zero_does_not_write() {
        let mut manager = CartManager::hydrate(MemoryStore::new());
        manager.add(&scarf(), 0);
        assert!(manager.store().get(DEFAULT_CART_KEY).unwrap().is_none());
    }
}
