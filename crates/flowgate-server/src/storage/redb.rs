//! Redb-backed durable storage implementation.
//!
//! Uses Redb's ACID transactions with Copy-on-Write for crash safety. Each
//! mutation is one write transaction, so a checkout either stores the order
//! and clears the cart or does neither. All state survives server restarts.

use std::{fmt::Display, path::Path, sync::Arc};

use flowgate_core::{Cart, CartKey, Category, DiningTable, InventoryAction, MenuItem, Order, Variant};
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition, WriteTransaction};
use serde::{Serialize, de::DeserializeOwned};

use super::{Catalog, StorageError, Store};

/// Table: catalog
/// Key: [`CATALOG_KEY`]
/// Value: CBOR-encoded Catalog (insertion order preserved)
const CATALOG: TableDefinition<&str, &[u8]> = TableDefinition::new("catalog");

/// Table: stock
/// Key: SKU
/// Value: units on hand
const STOCK: TableDefinition<&str, u32> = TableDefinition::new("stock");

/// Table: orders
/// Key: order id
/// Value: CBOR-encoded Order
const ORDERS: TableDefinition<&str, &[u8]> = TableDefinition::new("orders");

/// Table: carts
/// Key: cart key
/// Value: CBOR-encoded Cart; empty carts are deleted
const CARTS: TableDefinition<&str, &[u8]> = TableDefinition::new("carts");

const CATALOG_KEY: &str = "current";

/// Durable store backed by Redb.
///
/// Thread-safe through Redb's internal locking. Clone is cheap (Arc).
#[derive(Clone)]
pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open or create a Redb database at the given path.
    ///
    /// Creates tables if they don't exist (CATALOG, STOCK, ORDERS, CARTS).
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the database cannot be opened or created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let db = Database::create(path.as_ref()).map_err(io)?;

        let txn = db.begin_write().map_err(io)?;
        {
            let _ = txn.open_table(CATALOG).map_err(io)?;
            let _ = txn.open_table(STOCK).map_err(io)?;
            let _ = txn.open_table(ORDERS).map_err(io)?;
            let _ = txn.open_table(CARTS).map_err(io)?;
        }
        txn.commit().map_err(io)?;

        Ok(Self { db: Arc::new(db) })
    }

    /// Number of stored orders.
    pub fn order_count(&self) -> Result<u64, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(ORDERS).map_err(io)?;
        table.len().map_err(io)
    }

    fn catalog(&self) -> Result<Catalog, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(CATALOG).map_err(io)?;

        match table.get(CATALOG_KEY).map_err(io)? {
            Some(bytes) => from_cbor(bytes.value()),
            None => Ok(Catalog::default()),
        }
    }

    /// Insert an order inside an open write transaction.
    fn put_new_order(txn: &WriteTransaction, order: &Order) -> Result<(), StorageError> {
        let mut table = txn.open_table(ORDERS).map_err(io)?;
        if table.get(order.id.as_str()).map_err(io)?.is_some() {
            return Err(StorageError::Conflict(format!("order {}", order.id)));
        }

        let bytes = to_cbor(order)?;
        table.insert(order.id.as_str(), bytes.as_slice()).map_err(io)?;
        Ok(())
    }
}

impl Store for RedbStore {
    fn seed(&self, catalog: &Catalog) -> Result<(), StorageError> {
        let bytes = to_cbor(catalog)?;
        let txn = self.db.begin_write().map_err(io)?;

        {
            let mut table = txn.open_table(CATALOG).map_err(io)?;
            table.insert(CATALOG_KEY, bytes.as_slice()).map_err(io)?;

            let mut stock = txn.open_table(STOCK).map_err(io)?;
            for seed in &catalog.variants {
                let sku = seed.variant.sku.as_str();
                if stock.get(sku).map_err(io)?.is_none() {
                    stock.insert(sku, seed.quantity).map_err(io)?;
                }
            }
        }

        txn.commit().map_err(io)?;
        Ok(())
    }

    fn categories(&self) -> Result<Vec<Category>, StorageError> {
        Ok(self.catalog()?.categories)
    }

    fn variants(&self) -> Result<Vec<Variant>, StorageError> {
        Ok(self.catalog()?.variant_list())
    }

    fn menu_items(&self) -> Result<Vec<MenuItem>, StorageError> {
        Ok(self.catalog()?.menu_items)
    }

    fn tables(&self) -> Result<Vec<DiningTable>, StorageError> {
        Ok(self.catalog()?.tables)
    }

    fn orders(&self) -> Result<Vec<Order>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(ORDERS).map_err(io)?;

        let mut orders = Vec::new();
        for entry in table.iter().map_err(io)? {
            let (_, value) = entry.map_err(io)?;
            orders.push(from_cbor(value.value())?);
        }
        Ok(orders)
    }

    fn order(&self, id: &str) -> Result<Option<Order>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(ORDERS).map_err(io)?;

        table.get(id).map_err(io)?.map(|bytes| from_cbor(bytes.value())).transpose()
    }

    fn insert_order(&self, order: &Order) -> Result<(), StorageError> {
        let txn = self.db.begin_write().map_err(io)?;
        Self::put_new_order(&txn, order)?;
        txn.commit().map_err(io)?;
        Ok(())
    }

    fn update_order(&self, id: &str, update: &dyn Fn(&mut Order)) -> Result<Option<Order>, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;

        let order = {
            let mut table = txn.open_table(ORDERS).map_err(io)?;
            let stored = table.get(id).map_err(io)?.map(|bytes| from_cbor::<Order>(bytes.value())).transpose()?;
            let Some(mut order) = stored else {
                return Ok(None);
            };

            update(&mut order);
            let bytes = to_cbor(&order)?;
            table.insert(id, bytes.as_slice()).map_err(io)?;
            order
        };

        txn.commit().map_err(io)?;
        Ok(Some(order))
    }

    fn adjust_stock(&self, sku: &str, action: InventoryAction, amount: u32) -> Result<Option<u32>, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;

        let level = {
            let mut table = txn.open_table(STOCK).map_err(io)?;
            let current = table.get(sku).map_err(io)?.map(|level| level.value());
            let Some(current) = current else {
                return Ok(None);
            };

            let level = action.apply(current, amount);
            table.insert(sku, level).map_err(io)?;
            level
        };

        txn.commit().map_err(io)?;
        Ok(Some(level))
    }

    fn stock(&self, sku: &str) -> Result<Option<u32>, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(STOCK).map_err(io)?;

        Ok(table.get(sku).map_err(io)?.map(|level| level.value()))
    }

    fn cart(&self, key: &CartKey) -> Result<Cart, StorageError> {
        let txn = self.db.begin_read().map_err(io)?;
        let table = txn.open_table(CARTS).map_err(io)?;

        match table.get(key.as_str()).map_err(io)? {
            Some(bytes) => from_cbor(bytes.value()),
            None => Ok(Cart::default()),
        }
    }

    fn update_cart(
        &self,
        key: &CartKey,
        update: &dyn Fn(&mut Cart) -> Result<(), StorageError>,
    ) -> Result<Cart, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;

        let cart = {
            let mut table = txn.open_table(CARTS).map_err(io)?;
            let mut cart: Cart = match table.get(key.as_str()).map_err(io)? {
                Some(bytes) => from_cbor(bytes.value())?,
                None => Cart::default(),
            };

            update(&mut cart)?;
            if cart.is_empty() {
                table.remove(key.as_str()).map_err(io)?;
            } else {
                let bytes = to_cbor(&cart)?;
                table.insert(key.as_str(), bytes.as_slice()).map_err(io)?;
            }
            cart
        };

        txn.commit().map_err(io)?;
        Ok(cart)
    }

    fn checkout(&self, key: &CartKey, make_order: &dyn Fn(&Cart) -> Order) -> Result<Option<Order>, StorageError> {
        let txn = self.db.begin_write().map_err(io)?;

        let order = {
            let mut carts = txn.open_table(CARTS).map_err(io)?;
            let cart: Cart = match carts.get(key.as_str()).map_err(io)? {
                Some(bytes) => from_cbor(bytes.value())?,
                None => return Ok(None),
            };
            if cart.is_empty() {
                return Ok(None);
            }

            let order = make_order(&cart);
            Self::put_new_order(&txn, &order)?;
            carts.remove(key.as_str()).map_err(io)?;
            order
        };

        txn.commit().map_err(io)?;
        Ok(Some(order))
    }
}

fn io(err: impl Display) -> StorageError {
    StorageError::Io(err.to_string())
}

fn to_cbor<T: Serialize>(value: &T) -> Result<Vec<u8>, StorageError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes).map_err(|e| StorageError::Serialization(e.to_string()))?;
    Ok(bytes)
}

fn from_cbor<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StorageError> {
    ciborium::from_reader(bytes).map_err(|e| StorageError::Serialization(e.to_string()))
}
