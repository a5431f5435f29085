//! Fuzz target for cart and order operations under storage failures
//!
//! Drives the store-backed provider over a `ChaoticStore` that fails
//! operations at a fuzzed rate.
//!
//! # Strategy
//!
//! - Variable failure rates (0% to 90%)
//! - Interleaved cart additions, checkouts, stock moves and status updates
//!   across several tables
//!
//! # Invariants
//!
//! - The provider NEVER panics on storage errors
//! - Every unit added to a cart ends up in exactly one place: a cart or an
//!   order (atomic or nothing)

#![no_main]

use arbitrary::Arbitrary;
use flowgate_core::{CartAddition, CartKey, Customer, DataProvider, InventoryAction, OrderStatus};
use flowgate_server::{Catalog, ChaoticStore, MemoryStore, Store, StoreProvider, SystemEnv};
use libfuzzer_sys::fuzz_target;

const CATALOG: &[u8] = include_bytes!("../../crates/flowgate-server/catalog.example.json");
const TABLES: [&str; 3] = ["table_1", "table_2", "table_3"];
const MENU: [&str; 4] = ["m-dosa", "m-idli", "m-coffee", "m-thali"];

#[derive(Debug, Clone, Arbitrary)]
struct ChaosScenario {
    /// Seed for ChaoticStore RNG (deterministic failures)
    chaos_seed: u64,
    /// Failure rate 0-9 maps to 0%-90%
    failure_rate_tenth: u8,
    operations: Vec<ChaosOperation>,
}

#[derive(Debug, Clone, Arbitrary)]
enum ChaosOperation {
    Add { table: u8, item: u8, quantity: u8 },
    Confirm { table: u8 },
    AdjustStock { remove: bool, amount: u8 },
    UpdateFirstOrder { delivered: bool },
}

fuzz_target!(|scenario: ChaosScenario| {
    let failure_rate = f64::from(scenario.failure_rate_tenth % 10) / 10.0;
    let catalog = Catalog::from_json(CATALOG).expect("example catalog");
    let inner = MemoryStore::with_catalog(&catalog).expect("seed");
    let store = ChaoticStore::with_seed(inner.clone(), failure_rate, scenario.chaos_seed);
    let provider = StoreProvider::new(store, SystemEnv::new());

    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
    let mut added = 0u64;

    runtime.block_on(async {
        for op in scenario.operations {
            match op {
                ChaosOperation::Add { table, item, quantity } => {
                    let key = CartKey::new(TABLES[usize::from(table) % TABLES.len()]);
                    let addition = CartAddition {
                        item_id: MENU[usize::from(item) % MENU.len()].to_string(),
                        quantity: u32::from(quantity),
                        unit_price: None,
                    };
                    if provider.add_to_cart(&key, addition).await.is_ok() {
                        added += u64::from(quantity);
                    }
                },
                ChaosOperation::Confirm { table } => {
                    let key = CartKey::new(TABLES[usize::from(table) % TABLES.len()]);
                    let customer =
                        Customer { name: key.as_str().to_string(), phone: String::new(), email: None, address: None };
                    let _ = provider.confirm_cart(&key, customer).await;
                },
                ChaosOperation::AdjustStock { remove, amount } => {
                    let action = if remove { InventoryAction::Remove } else { InventoryAction::Add };
                    let _ = provider.adjust_inventory("SKU-3", action, u32::from(amount)).await;
                },
                ChaosOperation::UpdateFirstOrder { delivered } => {
                    let status = if delivered { OrderStatus::Delivered } else { OrderStatus::Cancelled };
                    if let Some(order) = inner.orders().expect("memory store").first() {
                        let _ = provider.update_order_status(&order.id, status, None).await;
                    }
                },
            }
        }
    });

    let ordered: u64 = inner
        .orders()
        .expect("memory store")
        .iter()
        .flat_map(|order| &order.items)
        .map(|item| u64::from(item.quantity))
        .sum();
    let in_carts: u64 = TABLES
        .iter()
        .map(|table| inner.cart(&CartKey::new(*table)).expect("memory store"))
        .flat_map(|cart| cart.lines)
        .map(|line| u64::from(line.quantity))
        .sum();

    assert_eq!(ordered + in_carts, added, "cart units were lost or duplicated");
});
