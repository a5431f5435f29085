//! Storage abstraction for Flowgate business data
//!
//! Trait-based abstraction for persisting the catalog, stock levels, orders
//! and carts. The trait is synchronous; [`crate::provider::StoreProvider`]
//! moves every call onto the blocking pool and layers the business rules on
//! top.

mod catalog;
mod chaotic;
mod error;
mod memory;
mod redb;

pub use catalog::{Catalog, SeedVariant};
pub use chaotic::ChaoticStore;
pub use error::StorageError;
use flowgate_core::{Cart, CartKey, Category, DiningTable, InventoryAction, MenuItem, Order, Variant};
pub use memory::MemoryStore;

pub use self::redb::RedbStore;

/// Storage for everything the data provider reads and writes.
///
/// Must be Clone (shared by the provider and the blocking pool), Send + Sync
/// and synchronous. Implementations share internal state via Arc, so clones
/// access the same underlying storage.
///
/// # Invariants
///
/// - Listings come back in insertion order
/// - Every mutating call is atomic: it either fully applies or leaves the
///   store unchanged
pub trait Store: Clone + Send + Sync + 'static {
    /// Replace the catalog.
    ///
    /// Stock is initialised from the seed for SKUs without a stock record;
    /// existing stock levels, orders and carts are kept.
    fn seed(&self, catalog: &Catalog) -> Result<(), StorageError>;

    /// All categories.
    fn categories(&self) -> Result<Vec<Category>, StorageError>;

    /// All variants, across categories.
    fn variants(&self) -> Result<Vec<Variant>, StorageError>;

    /// All menu entries.
    fn menu_items(&self) -> Result<Vec<MenuItem>, StorageError>;

    /// All dining tables.
    fn tables(&self) -> Result<Vec<DiningTable>, StorageError>;

    /// All orders, in no particular order.
    fn orders(&self) -> Result<Vec<Order>, StorageError>;

    /// One order, `None` if unknown.
    fn order(&self, id: &str) -> Result<Option<Order>, StorageError>;

    /// Store a new order.
    ///
    /// # Errors
    ///
    /// - `Conflict`: an order with this id exists
    fn insert_order(&self, order: &Order) -> Result<(), StorageError>;

    /// Modify an order in place and return the result, `None` if the id is
    /// unknown.
    fn update_order(&self, id: &str, update: &dyn Fn(&mut Order)) -> Result<Option<Order>, StorageError>;

    /// Apply a stock adjustment to a known SKU and return the new level.
    ///
    /// Returns `None` when the SKU is not in the catalog.
    fn adjust_stock(&self, sku: &str, action: InventoryAction, amount: u32) -> Result<Option<u32>, StorageError>;

    /// Current stock of a SKU, `None` when the SKU is not in the catalog.
    fn stock(&self, sku: &str) -> Result<Option<u32>, StorageError>;

    /// A cart; empty when nothing was stored under the key.
    fn cart(&self, key: &CartKey) -> Result<Cart, StorageError>;

    /// Modify a cart in place and return the result.
    ///
    /// `update` may fail, in which case the cart is left unchanged.
    fn update_cart(
        &self,
        key: &CartKey,
        update: &dyn Fn(&mut Cart) -> Result<(), StorageError>,
    ) -> Result<Cart, StorageError>;

    /// Turn a cart into an order in one atomic step.
    ///
    /// `make_order` sees the current cart. The order is inserted and the cart
    /// cleared together. Returns `None`, changing nothing, when the cart is
    /// empty.
    ///
    /// # Errors
    ///
    /// - `Conflict`: the built order's id exists
    fn checkout(&self, key: &CartKey, make_order: &dyn Fn(&Cart) -> Order) -> Result<Option<Order>, StorageError>;
}
