//! Chaotic store wrapper for fault injection testing
//!
//! Store wrapper that randomly fails operations, so tests can check that the
//! dispatcher still answers every request with a well-formed payload and that
//! atomic operations leave no partial state behind.

#![allow(clippy::disallowed_types, reason = "Locking simple RNG state")]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use flowgate_core::{Cart, CartKey, Category, DiningTable, InventoryAction, MenuItem, Order, Variant};

use super::{Catalog, StorageError, Store};

/// Store wrapper that randomly injects `StorageError::Io` failures.
///
/// A failed call never reaches the inner store. Cloning shares the RNG and
/// the counter.
#[derive(Clone)]
pub struct ChaoticStore<S: Store> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    /// RNG state for deterministic chaos
    rng: Arc<Mutex<ChaoticRng>>,
    operations: Arc<AtomicUsize>,
}

/// Linear congruential generator; reproducible with the same seed.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: Store> ChaoticStore<S> {
    /// Wrap `inner` with the default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng { state: seed })),
            operations: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying store (for checking invariants after chaos).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Total number of store operations attempted.
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::Relaxed)
    }

    /// Count the operation and decide whether it fails.
    fn gate(&self) -> Result<(), StorageError> {
        self.operations.fetch_add(1, Ordering::Relaxed);

        let roll = self
            .rng
            .lock()
            .map_err(|_| StorageError::Io("chaotic rng mutex poisoned".to_string()))?
            .next();
        if roll < self.failure_rate {
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }
        Ok(())
    }
}

impl<S: Store> Store for ChaoticStore<S> {
    fn seed(&self, catalog: &Catalog) -> Result<(), StorageError> {
        self.gate()?;
        self.inner.seed(catalog)
    }

    fn categories(&self) -> Result<Vec<Category>, StorageError> {
        self.gate()?;
        self.inner.categories()
    }

    fn variants(&self) -> Result<Vec<Variant>, StorageError> {
        self.gate()?;
        self.inner.variants()
    }

    fn menu_items(&self) -> Result<Vec<MenuItem>, StorageError> {
        self.gate()?;
        self.inner.menu_items()
    }

    fn tables(&self) -> Result<Vec<DiningTable>, StorageError> {
        self.gate()?;
        self.inner.tables()
    }

    fn orders(&self) -> Result<Vec<Order>, StorageError> {
        self.gate()?;
        self.inner.orders()
    }

    fn order(&self, id: &str) -> Result<Option<Order>, StorageError> {
        self.gate()?;
        self.inner.order(id)
    }

    fn insert_order(&self, order: &Order) -> Result<(), StorageError> {
        self.gate()?;
        self.inner.insert_order(order)
    }

    fn update_order(&self, id: &str, update: &dyn Fn(&mut Order)) -> Result<Option<Order>, StorageError> {
        self.gate()?;
        self.inner.update_order(id, update)
    }

    fn adjust_stock(&self, sku: &str, action: InventoryAction, amount: u32) -> Result<Option<u32>, StorageError> {
        self.gate()?;
        self.inner.adjust_stock(sku, action, amount)
    }

    fn stock(&self, sku: &str) -> Result<Option<u32>, StorageError> {
        self.gate()?;
        self.inner.stock(sku)
    }

    fn cart(&self, key: &CartKey) -> Result<Cart, StorageError> {
        self.gate()?;
        self.inner.cart(key)
    }

    fn update_cart(
        &self,
        key: &CartKey,
        update: &dyn Fn(&mut Cart) -> Result<(), StorageError>,
    ) -> Result<Cart, StorageError> {
        self.gate()?;
        self.inner.update_cart(key, update)
    }

    fn checkout(&self, key: &CartKey, make_order: &dyn Fn(&Cart) -> Order) -> Result<Option<Order>, StorageError> {
        self.gate()?;
        self.inner.checkout(key, make_order)
    }
}
