//! Dispatcher scenarios against a fixed in-test provider.

use std::{
    collections::HashMap,
    sync::Mutex,
    time::Duration,
};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use flowgate_core::{
    Cart, CartAddition, CartKey, CartLine, Category, Customer, DataProvider, DiningTable,
    DispatcherConfig, FlowDispatcher, GENERIC_FAILURE, Inventory, InventoryAction, MenuItem, Order,
    OrderDraft, OrderItem, OrderStatus, ProviderError, Variant,
};
use flowgate_proto::{FlowRequest, ResponsePayload, ScreenData, ScreenId};
use proptest::prelude::*;
use serde_json::{Value, json};

#[derive(Default)]
struct Fixture {
    carts: Mutex<HashMap<CartKey, Cart>>,
    stall: Option<Duration>,
    broken: bool,
}

fn at(day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, day, 10, 0, 0).single().unwrap()
}

fn order(id: &str, status: OrderStatus, day: u32) -> Order {
    Order {
        id: id.to_string(),
        status,
        customer: Customer { name: "Asha".into(), phone: "9876543210".into(), email: None, address: None },
        fulfillment_date: None,
        note: None,
        created_at: at(day),
        items: vec![OrderItem {
            sku: "SKU-1".into(),
            title: "Skirt Black S".into(),
            size: Some("S".into()),
            color: Some("Black".into()),
            quantity: 1,
            unit_price: Some(1200),
        }],
    }
}

fn orders() -> Vec<Order> {
    vec![
        order("BTQ-A", OrderStatus::Pending, 1),
        order("BTQ-B", OrderStatus::Delivered, 3),
        order("BTQ-C", OrderStatus::Pending, 2),
    ]
}

impl Fixture {
    fn stalled(stall: Duration) -> Self {
        Self { stall: Some(stall), ..Self::default() }
    }

    fn broken() -> Self {
        Self { broken: true, ..Self::default() }
    }

    async fn enter(&self) -> Result<(), ProviderError> {
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        if self.broken {
            return Err(ProviderError::Unavailable("connection refused by db.internal:5432".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl DataProvider for Fixture {
    async fn list_categories(&self) -> Result<Vec<Category>, ProviderError> {
        self.enter().await?;
        Ok(vec![
            Category { id: "skirts".into(), title: "Skirts".into() },
            Category { id: "scarves".into(), title: "Scarves".into() },
        ])
    }

    async fn list_variants_by_category(&self, category_id: &str) -> Result<Vec<Variant>, ProviderError> {
        self.enter().await?;
        if category_id != "skirts" {
            return Ok(Vec::new());
        }
        Ok(vec![Variant {
            sku: "SKU-1".into(),
            title: "Skirt Black S".into(),
            category_id: "skirts".into(),
            size: Some("S".into()),
            color: Some("Black".into()),
        }])
    }

    async fn list_orders(&self, statuses: Option<&[OrderStatus]>) -> Result<Vec<Order>, ProviderError> {
        self.enter().await?;
        Ok(orders()
            .into_iter()
            .filter(|order| statuses.is_none_or(|statuses| statuses.contains(&order.status)))
            .collect())
    }

    async fn get_order(&self, id: &str) -> Result<Order, ProviderError> {
        self.enter().await?;
        orders()
            .into_iter()
            .find(|order| order.id == id)
            .ok_or(ProviderError::NotFound { entity: "order", id: id.to_string() })
    }

    async fn create_order(&self, draft: OrderDraft) -> Result<Order, ProviderError> {
        self.enter().await?;
        let mut created = order("BTQ-NEW", OrderStatus::Pending, 4);
        created.customer = draft.customer;
        Ok(created)
    }

    async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        note: Option<String>,
    ) -> Result<Order, ProviderError> {
        let mut order = self.get_order(id).await?;
        order.status = status;
        order.note = note;
        Ok(order)
    }

    async fn adjust_inventory(
        &self,
        sku: &str,
        action: InventoryAction,
        quantity: u32,
    ) -> Result<Inventory, ProviderError> {
        self.enter().await?;
        if sku != "SKU-1" {
            return Err(ProviderError::Validation(format!("Unknown SKU {sku}")));
        }
        Ok(Inventory { sku: sku.to_string(), quantity: action.apply(10, quantity) })
    }

    async fn list_menu_items(&self, search: Option<&str>) -> Result<Vec<MenuItem>, ProviderError> {
        self.enter().await?;
        let menu = vec![
            MenuItem { id: "m1".into(), title: "Masala Dosa".into(), price: 120 },
            MenuItem { id: "m2".into(), title: "Filter Coffee".into(), price: 40 },
        ];
        let needle = search.map(str::to_lowercase).unwrap_or_default();
        Ok(menu.into_iter().filter(|item| item.title.to_lowercase().contains(&needle)).collect())
    }

    async fn list_tables(&self) -> Result<Vec<DiningTable>, ProviderError> {
        self.enter().await?;
        Ok(vec![DiningTable { id: "table_1".into(), title: "Table 1".into() }])
    }

    async fn get_cart(&self, key: &CartKey) -> Result<Cart, ProviderError> {
        self.enter().await?;
        Ok(self.carts.lock().unwrap().get(key).cloned().unwrap_or_default())
    }

    async fn add_to_cart(&self, key: &CartKey, addition: CartAddition) -> Result<Cart, ProviderError> {
        self.enter().await?;
        let item = self
            .list_menu_items(None)
            .await?
            .into_iter()
            .find(|item| item.id == addition.item_id)
            .ok_or_else(|| ProviderError::Validation("Unknown item".into()))?;

        let mut carts = self.carts.lock().unwrap();
        let cart = carts.entry(key.clone()).or_default();
        cart.add(CartLine {
            item_id: item.id,
            title: item.title,
            unit_price: item.price,
            quantity: addition.quantity,
        });
        Ok(cart.clone())
    }

    async fn confirm_cart(&self, key: &CartKey, customer: Customer) -> Result<Order, ProviderError> {
        self.enter().await?;
        let cart = self.carts.lock().unwrap().remove(key).unwrap_or_default();
        if cart.is_empty() {
            return Err(ProviderError::Validation("Cart is empty".into()));
        }

        let mut confirmed = order("BTQ-CART", OrderStatus::Confirmed, 5);
        confirmed.customer = customer;
        confirmed.items = cart
            .lines
            .into_iter()
            .map(|line| OrderItem {
                sku: line.item_id,
                title: line.title,
                size: None,
                color: None,
                quantity: line.quantity,
                unit_price: Some(line.unit_price),
            })
            .collect();
        Ok(confirmed)
    }
}

fn request(value: Value) -> FlowRequest {
    FlowRequest::parse(value.to_string().as_bytes()).unwrap()
}

fn exchange(screen: &str, data: Value) -> FlowRequest {
    request(json!({"version": "3.0", "action": "data_exchange", "screen": screen, "data": data}))
}

fn to_value(payload: &ResponsePayload) -> Value {
    serde_json::from_slice(&payload.to_json_bytes().unwrap()).unwrap()
}

async fn handle(dispatcher: &FlowDispatcher<Fixture>, request: FlowRequest) -> Value {
    to_value(&dispatcher.handle(&request).await)
}

#[test]
fn prop_ping_ignores_screen_and_data() {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap();
    let dispatcher = FlowDispatcher::new(Fixture::broken());

    proptest!(|(
        screen in prop::option::of("[A-Z_]{0,20}"),
        key in "[a-z]{1,8}",
        value in any::<i64>(),
    )| {
        let mut body = json!({"version": "3.0", "action": "ping", "data": {key: value}});
        if let Some(screen) = screen {
            body["screen"] = json!(screen);
        }

        let payload = runtime.block_on(dispatcher.handle(&request(body)));
        prop_assert_eq!(to_value(&payload), json!({"version": "3.0", "data": {"status": "active"}}));
    });
}

#[tokio::test]
async fn init_without_screen_lands_on_navigation() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, request(json!({"version": "3.0", "action": "INIT"}))).await;

    assert_eq!(reply["screen"], "CHOOSE_NAV");
    assert_eq!(reply["data"]["categories"][0], json!({"id": "skirts", "title": "Skirts"}));
    assert_eq!(reply["data"]["items"], json!([{"id": "SKU-1", "title": "Skirt Black S"}]));
    assert_eq!(reply["data"]["statuses"][0], json!({"id": "ALL", "title": "All orders"}));
    assert_eq!(reply["data"]["orders"].as_array().map(Vec::len), Some(3));
}

#[tokio::test]
async fn unknown_screen_answers_entry_screen_with_empty_data() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, exchange("NOT_A_SCREEN", json!({"trigger": "apply_filter"}))).await;

    assert_eq!(reply, json!({"version": "3.0", "screen": "CHOOSE_NAV", "data": {}}));
}

#[tokio::test]
async fn filtered_orders_are_newest_first_partial_update() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply =
        handle(&dispatcher, exchange("VIEW_ORDER", json!({"trigger": "apply_filter", "filter": ["Pending"]}))).await;

    assert!(reply.get("screen").is_none());
    let ids: Vec<&str> = reply["data"]["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|order| order["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["BTQ-C", "BTQ-A"]);
}

#[tokio::test]
async fn all_in_filter_list_means_unfiltered() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange("VIEW_ORDER", json!({"trigger": "apply_filter", "filter": ["Pending", "ALL"]})),
    )
    .await;

    let ids: Vec<&str> = reply["data"]["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|order| order["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["BTQ-B", "BTQ-C", "BTQ-A"]);
}

#[tokio::test]
async fn unknown_order_still_navigates_to_details() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply =
        handle(&dispatcher, exchange("VIEW_ORDER", json!({"trigger": "select_order", "orderId": "BTQ-404"}))).await;

    assert_eq!(reply["screen"], "VIEW_ORDER_DETAILS");
    assert_eq!(reply["data"]["order_detail_text"], "Unable to load order details.");
}

#[tokio::test]
async fn select_order_without_id_stays_on_list() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, exchange("VIEW_ORDER", json!({"trigger": "select_order"}))).await;

    assert_eq!(reply, json!({"version": "3.0", "screen": "VIEW_ORDER", "data": {}}));
}

#[tokio::test]
async fn known_order_renders_summary() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply =
        handle(&dispatcher, exchange("VIEW_ORDER", json!({"trigger": "view_order", "orderId": "BTQ-B"}))).await;

    assert_eq!(reply["screen"], "VIEW_ORDER_DETAILS");
    assert_eq!(reply["data"]["orderId"], "BTQ-B");
    let text = reply["data"]["order_detail_text"].as_str().unwrap();
    assert!(text.contains("BTQ-B"));
    assert!(text.contains("Delivered"));
}

#[tokio::test]
async fn status_update_reports_new_status() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange("VIEW_ORDER_DETAILS", json!({"trigger": "update_status", "orderId": "BTQ-A", "status": "Preparing"})),
    )
    .await;

    assert!(reply.get("screen").is_none());
    assert_eq!(reply["data"]["message"], "Order BTQ-A is now Preparing");
}

#[tokio::test]
async fn invalid_status_is_a_soft_error() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange("VIEW_ORDER_DETAILS", json!({"trigger": "update_status", "orderId": "BTQ-A", "status": "Lost"})),
    )
    .await;

    assert_eq!(reply["data"]["error"], "Choose a valid status");
    assert!(reply["data"]["order_detail_text"].as_str().unwrap().contains("BTQ-A"));
}

#[tokio::test]
async fn catalog_filter_lists_category_variants() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange("NEW_ORDER", json!({"trigger": "filter_menu_items", "selected_category": "skirts"})),
    )
    .await;

    assert!(reply.get("screen").is_none());
    assert_eq!(reply["data"]["variantOptions"], json!([{"id": "SKU-1", "title": "Skirt Black S"}]));
    assert_eq!(reply["data"]["total"], "₹0");
}

#[tokio::test]
async fn catalog_filter_with_empty_category_is_empty() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange("NEW_ORDER", json!({"trigger": "filter_menu_items", "selected_category": ""})),
    )
    .await;

    assert_eq!(reply["data"]["variantOptions"], json!([]));
}

#[tokio::test]
async fn unknown_trigger_falls_back_to_screen_load() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, exchange("MANAGE_INVENTORY", json!({"trigger": "launch_rockets"}))).await;

    assert_eq!(reply["screen"], "MANAGE_INVENTORY");
    assert_eq!(reply["data"]["items"], json!([{"id": "SKU-1", "title": "Skirt Black S"}]));
}

#[tokio::test]
async fn inventory_adjustment_reports_stock() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange(
            "MANAGE_INVENTORY",
            json!({"trigger": "adjust_inventory", "sku": "SKU-1", "inventory_action": "remove", "qty": 4}),
        ),
    )
    .await;

    assert_eq!(reply["data"]["message"], "Stock for SKU-1 is now 6");
}

#[tokio::test]
async fn menu_cart_flow_confirms_order() {
    let dispatcher = FlowDispatcher::new(Fixture::default());
    let table = json!("table_7");

    let added = handle(
        &dispatcher,
        exchange(
            "ADD_ITEMS",
            json!({"trigger": "add_item_to_cart", "selectedTable": table, "selectedItem": "m1", "quantity": 2}),
        ),
    )
    .await;
    assert_eq!(added["data"]["message"], "Item added to cart");
    assert_eq!(added["data"]["total"], "₹240");
    assert_eq!(added["data"]["cart_review_text"], "Masala Dosa x 2 – ₹240");

    let confirmed = handle(
        &dispatcher,
        exchange("REVIEW_ORDER", json!({"trigger": "confirm_order", "selectedTable": table})),
    )
    .await;
    assert_eq!(confirmed["screen"], "ORDER_CONFIRMED");
    assert_eq!(confirmed["data"]["orderId"], "BTQ-CART");
    assert_eq!(confirmed["data"]["total"], "₹240");

    let again = handle(
        &dispatcher,
        exchange("REVIEW_ORDER", json!({"trigger": "confirm_order", "selectedTable": table})),
    )
    .await;
    assert_eq!(again["screen"], "REVIEW_ORDER");
    assert_eq!(again["data"]["error"], "Cart is empty");
}

#[tokio::test]
async fn add_to_cart_without_item_is_a_soft_error() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, exchange("ADD_ITEMS", json!({"trigger": "add_item_to_cart"}))).await;

    assert!(reply.get("screen").is_none());
    assert_eq!(reply["data"]["error"], "No item selected");
}

#[tokio::test]
async fn menu_search_is_case_insensitive() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange("ADD_ITEMS", json!({"trigger": "filter_menu_items", "search_query": "COFFEE"})),
    )
    .await;

    assert_eq!(reply["data"]["menu_items_filtered"][0]["id"], "m2");
    assert_eq!(reply["data"]["menu_items_filtered"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn create_order_navigates_to_confirmation() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange(
            "NEW_ORDER",
            json!({
                "trigger": "create_order",
                "customer_name": "Meera",
                "customer_phone": "9000000000",
                "category": "skirts",
                "item_variant": "SKU-1",
                "quantity": 1,
                "unit_price": 1200,
                "fulfillment_date": "2024-03-09"
            }),
        ),
    )
    .await;

    assert_eq!(reply["screen"], "ORDER_CONFIRMED");
    assert_eq!(reply["data"]["orderId"], "BTQ-NEW");
}

#[tokio::test]
async fn create_order_without_name_stays_on_form() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, exchange("NEW_ORDER", json!({"trigger": "create_order"}))).await;

    assert!(reply.get("screen").is_none());
    assert_eq!(reply["data"]["error"], "Customer name is required");
}

#[tokio::test]
async fn negative_price_is_rejected_before_the_cart() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange(
            "NEW_ORDER",
            json!({"trigger": "add_item_to_cart", "selectedTable": "table_2", "selectedItem": "m1", "unit_price": -500}),
        ),
    )
    .await;

    assert!(reply.get("screen").is_none());
    assert_eq!(reply["data"]["error"], "Enter a valid price");
    assert!(dispatcher.provider().get_cart(&CartKey::new("table_2")).await.unwrap().is_empty());
}

#[tokio::test]
async fn huge_price_keeps_order_form_open() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(
        &dispatcher,
        exchange(
            "NEW_ORDER",
            json!({
                "trigger": "create_order",
                "customer_name": "Meera",
                "customer_phone": "9000000000",
                "category": "skirts",
                "item_variant": "SKU-1",
                "unit_price": i64::MAX
            }),
        ),
    )
    .await;

    assert!(reply.get("screen").is_none());
    assert_eq!(reply["data"]["error"], "Enter a valid price");
}

#[tokio::test]
async fn broken_provider_yields_generic_notice() {
    let dispatcher = FlowDispatcher::new(Fixture::broken());

    let payload = dispatcher.handle(&exchange("MANAGE_INVENTORY", json!({}))).await;

    assert_eq!(payload.data, ScreenData::Notice(flowgate_proto::NoticeData { error: GENERIC_FAILURE.into() }));
    assert!(!to_value(&payload).to_string().contains("db.internal"));
}

#[tokio::test(start_paused = true)]
async fn stalled_provider_times_out_into_notice() {
    let config = DispatcherConfig { provider_timeout: Duration::from_millis(50) };
    let dispatcher = FlowDispatcher::with_config(Fixture::stalled(Duration::from_secs(60)), config);

    let payload = dispatcher.handle(&exchange("SELECT_TABLE", json!({}))).await;

    assert!(payload.is_partial());
    assert_eq!(to_value(&payload)["data"]["error"], GENERIC_FAILURE);
}

#[tokio::test]
async fn table_selection_requires_a_table() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply = handle(&dispatcher, exchange("SELECT_TABLE", json!({"trigger": "select_table"}))).await;

    assert_eq!(reply, json!({"version": "3.0", "data": {"error": "Please select a table"}}));
}

#[tokio::test]
async fn table_selection_opens_menu_for_that_table() {
    let dispatcher = FlowDispatcher::new(Fixture::default());

    let reply =
        handle(&dispatcher, exchange("SELECT_TABLE", json!({"trigger": "select_table", "selectedTable": "table_3"})))
            .await;

    assert_eq!(reply["screen"], ScreenId::AddItems.as_str());
    assert_eq!(reply["data"]["selectedTable"], "table_3");
    assert_eq!(reply["data"]["menu_items_filtered"].as_array().map(Vec::len), Some(2));
}
