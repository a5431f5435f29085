//! Data provider abstraction.
//!
//! Every business read and write the dispatcher performs goes through
//! [`DataProvider`]. The dispatcher owns no state; implementations own all of
//! it, and each mutation is one atomic unit.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    Cart, CartAddition, CartKey, Category, Customer, DiningTable, Inventory, InventoryAction,
    MenuItem, Order, OrderDraft, OrderStatus, Variant,
};

/// Errors from data provider operations.
///
/// The dispatcher turns every variant into a soft error inside the encrypted
/// reply; none of them surfaces as a transport failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// Entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind, e.g. `order`
        entity: &'static str,
        /// Requested id
        id: String,
    },

    /// Input rejected by a business rule; the message is user-facing
    #[error("{0}")]
    Validation(String),

    /// Backing store failed
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded the dispatcher deadline
    #[error("provider call timed out after {0:?}")]
    Timeout(Duration),
}

/// Business data operations used by the Flow dispatcher.
///
/// # Invariants
///
/// - `list_categories`, `list_variants_by_category`, `list_menu_items` and
///   `list_tables` return entries in insertion order
/// - `list_orders` returns only orders whose status is in the filter; `None`
///   or an empty filter means every order. Order is unspecified; the
///   dispatcher sorts
/// - `adjust_inventory` never produces a negative quantity
/// - `confirm_cart` is atomic: either the order exists and the cart is empty,
///   or nothing changed
///
/// Implementations are shared across concurrent requests.
#[async_trait]
pub trait DataProvider: Send + Sync + 'static {
    /// All product categories.
    async fn list_categories(&self) -> Result<Vec<Category>, ProviderError>;

    /// Variants of one category. Unknown category yields an empty list.
    async fn list_variants_by_category(&self, category_id: &str) -> Result<Vec<Variant>, ProviderError>;

    /// Orders, optionally restricted to a set of statuses.
    async fn list_orders(&self, statuses: Option<&[OrderStatus]>) -> Result<Vec<Order>, ProviderError>;

    /// One order.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no order with this id
    async fn get_order(&self, id: &str) -> Result<Order, ProviderError>;

    /// Create a `Pending` order from a staff-entered draft.
    ///
    /// # Errors
    ///
    /// - `Validation`: unknown category, SKU outside the category, no lines
    async fn create_order(&self, draft: OrderDraft) -> Result<Order, ProviderError>;

    /// Change an order's status, replacing the note when one is given.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no order with this id
    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, ProviderError>;

    /// Add, remove or set the stock of a SKU.
    ///
    /// # Errors
    ///
    /// - `Validation`: unknown SKU
    async fn adjust_inventory(
        &self,
        sku: &str,
        action: InventoryAction,
        quantity: u32,
    ) -> Result<Inventory, ProviderError>;

    /// Menu entries whose title contains `search`, ignoring case.
    async fn list_menu_items(&self, search: Option<&str>) -> Result<Vec<MenuItem>, ProviderError>;

    /// All dining tables.
    async fn list_tables(&self) -> Result<Vec<DiningTable>, ProviderError>;

    /// Current cart; empty if nothing was added yet.
    async fn get_cart(&self, key: &CartKey) -> Result<Cart, ProviderError>;

    /// Add a menu item or SKU to a cart, returning the updated cart.
    ///
    /// # Errors
    ///
    /// - `Validation`: unknown item or zero quantity
    async fn add_to_cart(&self, key: &CartKey, addition: CartAddition) -> Result<Cart, ProviderError>;

    /// Turn a cart into a `Confirmed` order and empty it.
    ///
    /// # Errors
    ///
    /// - `Validation`: cart is empty
    async fn confirm_cart(&self, key: &CartKey, customer: Customer) -> Result<Order, ProviderError>;
}

#[async_trait]
impl<T: DataProvider + ?Sized> DataProvider for Arc<T> {
    async fn list_categories(&self) -> Result<Vec<Category>, ProviderError> {
        (**self).list_categories().await
    }

    async fn list_variants_by_category(&self, category_id: &str) -> Result<Vec<Variant>, ProviderError> {
        (**self).list_variants_by_category(category_id).await
    }

    async fn list_orders(&self, statuses: Option<&[OrderStatus]>) -> Result<Vec<Order>, ProviderError> {
        (**self).list_orders(statuses).await
    }

    async fn get_order(&self, id: &str) -> Result<Order, ProviderError> {
        (**self).get_order(id).await
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, ProviderError> {
        (**self).create_order(draft).await
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, ProviderError> {
        (**self).update_order_status(id, status, note).await
    }

    async fn adjust_inventory(
        &self,
        sku: &str,
        action: InventoryAction,
        quantity: u32,
    ) -> Result<Inventory, ProviderError> {
        (**self).adjust_inventory(sku, action, quantity).await
    }

    async fn list_menu_items(&self, search: Option<&str>) -> Result<Vec<MenuItem>, ProviderError> {
        (**self).list_menu_items(search).await
    }

    async fn list_tables(&self) -> Result<Vec<DiningTable>, ProviderError> {
        (**self).list_tables().await
    }

    async fn get_cart(&self, key: &CartKey) -> Result<Cart, ProviderError> {
        (**self).get_cart(key).await
    }

    async fn add_to_cart(&self, key: &CartKey, addition: CartAddition) -> Result<Cart, ProviderError> {
        (**self).add_to_cart(key, addition).await
    }

    async fn confirm_cart(&self, key: &CartKey, customer: Customer) -> Result<Order, ProviderError> {
        (**self).confirm_cart(key, customer).await
    }
}
