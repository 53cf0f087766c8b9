//! Cart reconciliation and persistence.
//!
//! The cart is a product-identity to entry mapping with add-time price
//! snapshots. Every mutation persists through a [`CartStore`] before
//! returning; a persist failure is logged and the in-memory state kept.
//! Each user's cart lives under its own key so identities never share or
//! merge carts.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::Product;

/// Key for the shared unauthenticated cart.
pub const GUEST_CART_KEY: &str = "cart_guest";

/// Persistence key for a user's cart, or the guest key.
pub fn cart_key(email: Option<&str>) -> String {
    match email {
        Some(email) => format!("cart_{email}"),
        None => GUEST_CART_KEY.to_string(),
    }
}

/// One cart line: identity plus an add-time snapshot. Quantity is always
/// at least 1; a zero-quantity entry is removed, never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartEntry {
    pub product_id: Uuid,
    pub name: String,
    pub price: f64,
    pub image: Option<String>,
    pub quantity: u32,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persistent key-value storage for carts.
pub trait CartStore {
    fn load(&self, key: &str) -> Result<Option<Vec<CartEntry>>, StoreError>;
    fn save(&self, key: &str, entries: &[CartEntry]) -> Result<(), StoreError>;
    fn delete(&self, key: &str) -> Result<(), StoreError>;
}

impl<S: CartStore + ?Sized> CartStore for std::sync::Arc<S> {
    fn load(&self, key: &str) -> Result<Option<Vec<CartEntry>>, StoreError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, entries: &[CartEntry]) -> Result<(), StoreError> {
        (**self).save(key, entries)
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        (**self).delete(key)
    }
}

/// In-memory store, mainly for tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, Vec<CartEntry>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<CartEntry>>, StoreError> {
        let map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        Ok(map.get(key).cloned())
    }

    fn save(&self, key: &str, entries: &[CartEntry]) -> Result<(), StoreError> {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.insert(key.to_string(), entries.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        let mut map = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        map.remove(key);
        Ok(())
    }
}

/// JSON-file-backed store: one file per cart key.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl CartStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<CartEntry>>, StoreError> {
        match fs::read_to_string(self.path(key)) {
            Ok(data) => Ok(Some(serde_json::from_str(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, entries: &[CartEntry]) -> Result<(), StoreError> {
        let data = serde_json::to_string(entries)?;
        fs::write(self.path(key), data)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// The cart itself: ordered entries, persisted after every mutation.
pub struct Cart<S> {
    store: S,
    key: String,
    items: Vec<CartEntry>,
}

impl<S: CartStore> Cart<S> {
    /// Load whatever is persisted for the given user (or guest).
    pub fn load(store: S, user_email: Option<&str>) -> Self {
        let key = cart_key(user_email);
        let items = Self::load_items(&store, &key);
        Cart { store, key, items }
    }

    fn load_items(store: &S, key: &str) -> Vec<CartEntry> {
        match store.load(key) {
            Ok(items) => items.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(key, error = %e, "cart load failed, starting empty");
                Vec::new()
            }
        }
    }

    /// Replace the in-memory cart with the persisted cart of another
    /// identity. Called on login and logout; never merges.
    pub fn switch_user(&mut self, user_email: Option<&str>) {
        self.key = cart_key(user_email);
        self.items = Self::load_items(&self.store, &self.key);
    }

    /// Add a product: existing entries gain quantity 1, new products
    /// enter with quantity 1 and a price/name/image snapshot.
    pub fn add(&mut self, product: &Product) {
        match self.items.iter_mut().find(|e| e.product_id == product.id) {
            Some(entry) => entry.quantity += 1,
            None => self.items.push(CartEntry {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                image: product.image.clone(),
                quantity: 1,
            }),
        }
        self.persist();
    }

    /// Set an entry's quantity; zero or below removes the entry.
    /// Unknown ids are ignored.
    pub fn set_quantity(&mut self, id: Uuid, quantity: i64) {
        if quantity <= 0 {
            self.items.retain(|e| e.product_id != id);
        } else if let Some(entry) = self.items.iter_mut().find(|e| e.product_id == id) {
            entry.quantity = quantity as u32;
        }
        self.persist();
    }

    /// Remove an entry unconditionally; a no-op for absent ids.
    pub fn remove(&mut self, id: Uuid) {
        self.items.retain(|e| e.product_id != id);
        self.persist();
    }

    /// Empty the cart and erase its persisted record.
    pub fn clear(&mut self) {
        self.items.clear();
        if let Err(e) = self.store.delete(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "cart record removal failed");
        }
    }

    /// Quantity of a product in the cart; 0 when absent.
    pub fn quantity_of(&self, id: Uuid) -> u32 {
        self.items
            .iter()
            .find(|e| e.product_id == id)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    /// Total price, computed fresh on every call.
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|e| e.price * e.quantity as f64)
            .sum()
    }

    pub fn items(&self) -> &[CartEntry] {
        &self.items
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn persist(&self) {
        if let Err(e) = self.store.save(&self.key, &self.items) {
            tracing::warn!(key = %self.key, error = %e, "cart persist failed, keeping in-memory state");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;

    fn product(name: &str, price: f64) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            category: crate::models::Category::Electronics,
            price,
            quantity: 10,
            image: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn adding_same_product_twice_merges_quantities() {
        let mut cart = Cart::load(MemoryStore::new(), None);
        let p = product("Mouse", 10.0);
        cart.add(&p);
        cart.add(&p);
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(p.id), 2);
    }

    #[test]
    fn total_is_price_times_quantity_summed() {
        let mut cart = Cart::load(MemoryStore::new(), None);
        let a = product("A", 10.0);
        let b = product("B", 5.0);
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);
        assert_eq!(cart.total(), 25.0);
    }

    #[test]
    fn zero_quantity_removes_entry() {
        let mut cart = Cart::load(MemoryStore::new(), None);
        let p = product("Mouse", 10.0);
        cart.add(&p);
        cart.set_quantity(p.id, 0);
        assert!(cart.items().is_empty());

        // Removing an already-absent id is a no-op, not an error.
        cart.remove(p.id);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn set_quantity_on_unknown_id_is_ignored() {
        let mut cart = Cart::load(MemoryStore::new(), None);
        cart.set_quantity(Uuid::new_v4(), 3);
        assert!(cart.items().is_empty());
    }

    #[test]
    fn mutations_persist_immediately() {
        let store = Arc::new(MemoryStore::new());
        let p = product("Mouse", 10.0);

        let mut cart = Cart::load(Arc::clone(&store), Some("a@example.com"));
        cart.add(&p);

        // A fresh cart over the same store sees the write.
        let reloaded = Cart::load(Arc::clone(&store), Some("a@example.com"));
        assert_eq!(reloaded.quantity_of(p.id), 1);
    }

    #[test]
    fn clear_erases_the_persisted_record() {
        let store = Arc::new(MemoryStore::new());
        let p = product("Mouse", 10.0);

        let mut cart = Cart::load(Arc::clone(&store), Some("a@example.com"));
        cart.add(&p);
        cart.clear();

        assert!(cart.items().is_empty());
        assert_eq!(store.load("cart_a@example.com").unwrap(), None);
    }

    #[test]
    fn switching_users_never_merges_carts() {
        let store = Arc::new(MemoryStore::new());
        let pa = product("A", 10.0);
        let pb = product("B", 5.0);

        let mut cart = Cart::load(Arc::clone(&store), Some("a@example.com"));
        cart.add(&pa);

        cart.switch_user(Some("b@example.com"));
        assert!(cart.items().is_empty());
        cart.add(&pb);

        cart.switch_user(Some("a@example.com"));
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.quantity_of(pa.id), 1);
        assert_eq!(cart.quantity_of(pb.id), 0);
    }

    #[test]
    fn guest_and_user_keys_differ() {
        assert_eq!(cart_key(None), "cart_guest");
        assert_eq!(cart_key(Some("a@example.com")), "cart_a@example.com");
    }
}
