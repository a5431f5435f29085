//! Crash recovery tests for `RedbStore`.
//!
//! These tests verify that data persists across database close/reopen cycles,
//! simulating server restarts.

use flowgate_core::{
    CartAddition, CartKey, Customer, DataProvider, DraftLine, InventoryAction, OrderDraft, OrderStatus,
};
use flowgate_server::{Catalog, RedbStore, Store, StoreProvider, SystemEnv};
use tempfile::tempdir;

fn catalog() -> Catalog {
    Catalog::from_json(include_bytes!("../catalog.example.json")).unwrap()
}

fn draft() -> OrderDraft {
    OrderDraft {
        customer: Customer { name: "Meera".into(), phone: "98860".into(), email: None, address: None },
        category_id: "saree".into(),
        lines: vec![DraftLine { sku: "SKU-3".into(), quantity: 1, unit_price: Some(5200), size: None, color: None }],
        fulfillment_date: None,
        note: None,
    }
}

#[tokio::test]
async fn orders_and_carts_survive_restart() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("flowgate.redb");
    let table = CartKey::new("table_3");

    // Write, then simulate shutdown
    let order_id = {
        let store = RedbStore::open(&db_path).unwrap();
        store.seed(&catalog()).unwrap();
        let provider = StoreProvider::new(store, SystemEnv::new());

        let order = provider.create_order(draft()).await.unwrap();
        provider.update_order_status(&order.id, OrderStatus::Preparing, Some("blouse stitched".into())).await.unwrap();
        provider
            .add_to_cart(&table, CartAddition { item_id: "m-thali".into(), quantity: 2, unit_price: None })
            .await
            .unwrap();
        order.id
    };

    // Reopen and verify
    let store = RedbStore::open(&db_path).unwrap();
    let provider = StoreProvider::new(store.clone(), SystemEnv::new());

    let order = provider.get_order(&order_id).await.unwrap();
    assert_eq!(order.status, OrderStatus::Preparing);
    assert_eq!(order.note.as_deref(), Some("blouse stitched"));
    assert_eq!(order.total(), Some(5200));

    let cart = provider.get_cart(&table).await.unwrap();
    assert_eq!(cart.total(), 500);

    assert_eq!(provider.list_categories().await.unwrap().len(), 3);
    assert_eq!(store.order_count().unwrap(), 1);
}

#[test]
fn reseeding_after_restart_keeps_stock() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("flowgate.redb");

    {
        let store = RedbStore::open(&db_path).unwrap();
        store.seed(&catalog()).unwrap();
        assert_eq!(store.adjust_stock("SKU-2", InventoryAction::Remove, 3).unwrap(), Some(2));
    }

    {
        let store = RedbStore::open(&db_path).unwrap();
        store.seed(&catalog()).unwrap();

        assert_eq!(store.stock("SKU-2").unwrap(), Some(2));
        assert_eq!(store.stock("SKU-1").unwrap(), Some(12));
        assert_eq!(store.tables().unwrap()[2].title, "Table 3 (patio)");
    }
}

#[tokio::test]
async fn checkout_is_durable() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("flowgate.redb");
    let table = CartKey::new("table_1");

    let order_id = {
        let store = RedbStore::open(&db_path).unwrap();
        store.seed(&catalog()).unwrap();
        let provider = StoreProvider::new(store, SystemEnv::new());

        provider
            .add_to_cart(&table, CartAddition { item_id: "m-dosa".into(), quantity: 1, unit_price: None })
            .await
            .unwrap();
        let customer = Customer { name: "table_1".into(), phone: String::new(), email: None, address: None };
        provider.confirm_cart(&table, customer).await.unwrap().id
    };

    let store = RedbStore::open(&db_path).unwrap();
    assert!(store.cart(&table).unwrap().is_empty());

    let order = store.order(&order_id).unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Confirmed);
    assert_eq!(order.items[0].title, "Masala Dosa");
}

#[test]
fn reopening_an_empty_database_is_empty() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("flowgate.redb");

    drop(RedbStore::open(&db_path).unwrap());
    let store = RedbStore::open(&db_path).unwrap();

    assert!(store.categories().unwrap().is_empty());
    assert!(store.orders().unwrap().is_empty());
    assert_eq!(store.stock("SKU-1").unwrap(), None);
}
