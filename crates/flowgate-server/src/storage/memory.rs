#![allow(clippy::disallowed_types, reason = "Synchronous in-memory operations only")]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use flowgate_core::{Cart, CartKey, Category, DiningTable, InventoryAction, MenuItem, Order, Variant};

use super::{Catalog, StorageError, Store};

/// In-memory store for tests and single-process deployments.
///
/// All state sits behind one `Arc<Mutex<>>`, so every operation, including
/// checkout, is serialized and atomic. A poisoned mutex surfaces as
/// `StorageError::Io` rather than a panic.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Default)]
struct MemoryStoreInner {
    categories: Vec<Category>,
    variants: Vec<Variant>,
    menu_items: Vec<MenuItem>,
    tables: Vec<DiningTable>,

    /// Units on hand per SKU; every catalog SKU has an entry
    stock: HashMap<String, u32>,

    orders: HashMap<String, Order>,

    /// Non-empty carts only
    carts: HashMap<CartKey, Cart>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store seeded with `catalog`.
    pub fn with_catalog(catalog: &Catalog) -> Result<Self, StorageError> {
        let store = Self::new();
        store.seed(catalog)?;
        Ok(store)
    }

    /// Number of stored orders.
    pub fn order_count(&self) -> Result<usize, StorageError> {
        Ok(self.lock()?.orders.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryStoreInner>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Io("memory store mutex poisoned".to_string()))
    }
}

impl Store for MemoryStore {
    fn seed(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let mut inner = self.lock()?;

        inner.categories.clone_from(&catalog.categories);
        inner.variants = catalog.variant_list();
        inner.menu_items.clone_from(&catalog.menu_items);
        inner.tables.clone_from(&catalog.tables);
        for seed in &catalog.variants {
            inner.stock.entry(seed.variant.sku.clone()).or_insert(seed.quantity);
        }

        Ok(())
    }

    fn categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self.lock()?.categories.clone())
    }

    fn variants(&self) -> Result<Vec<Variant>, StorageError> {
        Ok(self.lock()?.variants.clone())
    }

    fn menu_items(&self) -> Result<Vec<MenuItem>, StorageError> {
        Ok(self.lock()?.menu_items.clone())
    }

    fn tables(&self) -> Result<Vec<DiningTable>, StorageError> {
        Ok(self.lock()?.tables.clone())
    }

    fn orders(&self) -> Result<Vec<Order>, StorageError> {
        Ok(self.lock()?.orders.values().cloned().collect())
    }

    fn order(&self, id: &str) -> Result<Option<Order>, StorageError> {
        Ok(self.lock()?.orders.get(id).cloned())
    }

    fn insert_order(&self, order: &Order) -> Result<(), StorageError> {
        let mut inner = self.lock()?;
        if inner.orders.contains_key(&order.id) {
            return Err(StorageError::Conflict(format!("order {}", order.id)));
        }
        inner.orders.insert(order.id.clone(), order.clone());
        Ok(())
    }

    fn update_order(&self, id: &str, update: &dyn Fn(&mut Order)) -> Result<Option<Order>, StorageError> {
        let mut inner = self.lock()?;
        Ok(inner.orders.get_mut(id).map(|order| {
            update(order);
            order.clone()
        }))
    }

    fn adjust_stock(&self, sku: &str, action: InventoryAction, amount: u32) -> Result<Option<u32>, StorageError> {
        let mut inner = self.lock()?;
        Ok(inner.stock.get_mut(sku).map(|level| {
            *level = action.apply(*level, amount);
            *level
        }))
    }

    fn stock(&self, sku: &str) -> Result<Option<u32>, StorageError> {
        Ok(self.lock()?.stock.get(sku).copied())
    }

    fn cart(&self, key: &CartKey) -> Result<Cart, StorageError> {
        Ok(self.lock()?.carts.get(key).cloned().unwrap_or_default())
    }

    fn update_cart(
        &self,
        key: &CartKey,
        update: &dyn Fn(&mut Cart) -> Result<(), StorageError>,
    ) -> Result<Cart, StorageError> {
        let mut inner = self.lock()?;

        let mut cart = inner.carts.get(key).cloned().unwrap_or_default();
        update(&mut cart)?;
        if cart.is_empty() {
            inner.carts.remove(key);
        } else {
            inner.carts.insert(key.clone(), cart.clone());
        }
        Ok(cart)
    }

    fn checkout(&self, key: &CartKey, make_order: &dyn Fn(&Cart) -> Order) -> Result<Option<Order>, StorageError> {
        let mut inner = self.lock()?;

        let Some(cart) = inner.carts.get(key).filter(|cart| !cart.is_empty()) else {
            return Ok(None);
        };
        let order = make_order(cart);
        if inner.orders.contains_key(&order.id) {
            return Err(StorageError::Conflict(format!("order {}", order.id)));
        }

        inner.orders.insert(order.id.clone(), order.clone());
        inner.carts.remove(key);
        Ok(Some(order))
    }
}
