//! [`DataProvider`] over any [`Store`].
//!
//! The store persists records; this layer owns the business rules (catalog
//! validation, order ids, cart pricing) and moves every store call onto
//! tokio's blocking pool so redb I/O never stalls the runtime.

use async_trait::async_trait;
use flowgate_core::{
    Cart, CartAddition, CartKey, CartLine, Category, Customer, DataProvider, DiningTable, Environment,
    Inventory, InventoryAction, MenuItem, Order, OrderDraft, OrderItem, OrderStatus, ProviderError,
    Variant, new_order_id,
};

use crate::storage::{StorageError, Store};

/// Attempts at finding an unused order id before giving up.
const ORDER_ID_ATTEMPTS: usize = 4;

/// Business data provider backed by a [`Store`].
#[derive(Clone)]
pub struct StoreProvider<S, E> {
    store: S,
    env: E,
}

impl<S: Store, E: Environment> StoreProvider<S, E> {
    /// Provider over `store`, taking time and randomness from `env`.
    pub fn new(store: S, env: E) -> Self {
        Self { store, env }
    }

    /// Underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, ProviderError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, StorageError> + Send + 'static,
    {
        Ok(self.spawn(op).await??)
    }

    async fn spawn<T, F>(&self, op: F) -> Result<Result<T, StorageError>, ProviderError>
    where
        T: Send + 'static,
        F: FnOnce(&S) -> Result<T, StorageError> + Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|e| ProviderError::Unavailable(format!("storage task failed: {e}")))
    }

    /// Run `insert` with fresh order ids until one is unused.
    async fn with_fresh_id<T, F>(&self, insert: F) -> Result<T, ProviderError>
    where
        T: Send + 'static,
        F: Fn(&S, String) -> Result<T, StorageError> + Clone + Send + 'static,
    {
        for attempt in 1..=ORDER_ID_ATTEMPTS {
            let id = new_order_id(&self.env);
            let insert = insert.clone();
            match self.spawn(move |store| insert(store, id)).await? {
                Err(StorageError::Conflict(existing)) => {
                    tracing::debug!(attempt, %existing, "order id collision, retrying");
                },
                other => return Ok(other?),
            }
        }
        Err(ProviderError::Unavailable("no free order id".to_string()))
    }
}

#[async_trait]
impl<S: Store, E: Environment> DataProvider for StoreProvider<S, E> {
    async fn list_categories(&self) -> Result<Vec<Category>, ProviderError> {
        self.blocking(Store::categories).await
    }

    async fn list_variants_by_category(&self, category_id: &str) -> Result<Vec<Variant>, ProviderError> {
        let category_id = category_id.to_string();
        self.blocking(move |store| {
            let mut variants = store.variants()?;
            variants.retain(|variant| variant.category_id == category_id);
            Ok(variants)
        })
        .await
    }

    async fn list_orders(&self, statuses: Option<&[OrderStatus]>) -> Result<Vec<Order>, ProviderError> {
        let statuses: Vec<OrderStatus> = statuses.map(<[OrderStatus]>::to_vec).unwrap_or_default();
        self.blocking(move |store| {
            let mut orders = store.orders()?;
            if !statuses.is_empty() {
                orders.retain(|order| statuses.contains(&order.status));
            }
            Ok(orders)
        })
        .await
    }

    async fn get_order(&self, id: &str) -> Result<Order, ProviderError> {
        let key = id.to_string();
        self.blocking(move |store| store.order(&key))
            .await?
            .ok_or_else(|| ProviderError::NotFound { entity: "order", id: id.to_string() })
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, ProviderError> {
        let category_id = draft.category_id.clone();
        let (categories, variants) = self
            .blocking(move |store| {
                let categories = store.categories()?;
                let mut variants = store.variants()?;
                variants.retain(|variant| variant.category_id == category_id);
                Ok((categories, variants))
            })
            .await?;

        if !categories.iter().any(|category| category.id == draft.category_id) {
            return Err(invalid_catalog_choice());
        }
        if draft.lines.is_empty() {
            return Err(ProviderError::Validation("Add at least one item".to_string()));
        }

        let mut items = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let variant = variants.iter().find(|v| v.sku == line.sku).ok_or_else(invalid_catalog_choice)?;
            if line.quantity == 0 {
                return Err(ProviderError::Validation("Quantity must be at least 1".to_string()));
            }
            items.push(OrderItem {
                sku: variant.sku.clone(),
                title: variant.title.clone(),
                size: line.size.clone().or_else(|| variant.size.clone()),
                color: line.color.clone().or_else(|| variant.color.clone()),
                quantity: line.quantity,
                unit_price: line.unit_price,
            });
        }

        let template = Order {
            id: String::new(),
            status: OrderStatus::Pending,
            customer: draft.customer,
            fulfillment_date: draft.fulfillment_date,
            note: draft.note,
            created_at: self.env.now(),
            items,
        };

        let order = self
            .with_fresh_id(move |store, id| {
                let order = Order { id, ..template.clone() };
                store.insert_order(&order)?;
                Ok(order)
            })
            .await?;

        tracing::info!(order_id = %order.id, "order created");
        Ok(order)
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, ProviderError> {
        let key = id.to_string();
        let updated = self
            .blocking(move |store| {
                store.update_order(&key, &|order| {
                    order.status = status;
                    if note.is_some() {
                        order.note.clone_from(&note);
                    }
                })
            })
            .await?;

        updated.ok_or_else(|| ProviderError::NotFound { entity: "order", id: id.to_string() })
    }

    async fn adjust_inventory(
        &self,
        sku: &str,
        action: InventoryAction,
        quantity: u32,
    ) -> Result<Inventory, ProviderError> {
        let key = sku.to_string();
        let level = self.blocking(move |store| store.adjust_stock(&key, action, quantity)).await?;

        match level {
            Some(quantity) => Ok(Inventory { sku: sku.to_string(), quantity }),
            None => Err(ProviderError::Validation("Unknown sku".to_string())),
        }
    }

    async fn list_menu_items(&self, search: Option<&str>) -> Result<Vec<MenuItem>, ProviderError> {
        let needle = search.map(str::trim).unwrap_or_default().to_lowercase();
        self.blocking(move |store| {
            let mut items = store.menu_items()?;
            if !needle.is_empty() {
                items.retain(|item| item.title.to_lowercase().contains(&needle));
            }
            Ok(items)
        })
        .await
    }

    async fn list_tables(&self) -> Result<Vec<DiningTable>, ProviderError> {
        self.blocking(Store::tables).await
    }

    async fn get_cart(&self, key: &CartKey) -> Result<Cart, ProviderError> {
        let key = key.clone();
        self.blocking(move |store| store.cart(&key)).await
    }

    async fn add_to_cart(&self, key: &CartKey, addition: CartAddition) -> Result<Cart, ProviderError> {
        if addition.quantity == 0 {
            return Err(ProviderError::Validation("Quantity must be at least 1".to_string()));
        }

        let item_id = addition.item_id.clone();
        let line = self
            .blocking(move |store| {
                if let Some(item) = store.menu_items()?.into_iter().find(|item| item.id == item_id) {
                    return Ok(Some((item.title, Some(item.price))));
                }
                Ok(store.variants()?.into_iter().find(|v| v.sku == item_id).map(|v| (v.title, None)))
            })
            .await?;

        let Some((title, catalog_price)) = line else {
            return Err(ProviderError::Validation("Unknown item".to_string()));
        };
        let line = CartLine {
            unit_price: catalog_price.or(addition.unit_price).unwrap_or(0),
            item_id: addition.item_id,
            title,
            quantity: addition.quantity,
        };

        let key = key.clone();
        self.blocking(move |store| {
            store.update_cart(&key, &|cart| {
                cart.add(line.clone());
                Ok(())
            })
        })
        .await
    }

    async fn confirm_cart(&self, key: &CartKey, customer: Customer) -> Result<Order, ProviderError> {
        let key = key.clone();
        let created_at = self.env.now();

        let order = self
            .with_fresh_id(move |store, id| {
                store.checkout(&key, &|cart| Order {
                    id: id.clone(),
                    status: OrderStatus::Confirmed,
                    customer: customer.clone(),
                    fulfillment_date: None,
                    note: None,
                    created_at,
                    items: cart
                        .lines
                        .iter()
                        .map(|line| OrderItem {
                            sku: line.item_id.clone(),
                            title: line.title.clone(),
                            size: None,
                            color: None,
                            quantity: line.quantity,
                            unit_price: Some(line.unit_price),
                        })
                        .collect(),
                })
            })
            .await?;

        let order = order.ok_or_else(|| ProviderError::Validation("Cart is empty".to_string()))?;
        tracing::info!(order_id = %order.id, "cart confirmed");
        Ok(order)
    }
}

fn invalid_catalog_choice() -> ProviderError {
    ProviderError::Validation("Invalid category or SKU".to_string())
}
