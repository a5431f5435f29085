//! Fuzz target for request parsing and dispatch
//!
//! # Strategy
//!
//! - Raw plaintext: arbitrary bytes as the decrypted request
//! - Shaped requests: valid JSON with fuzzed screen, action, trigger and
//!   form values, so the dispatcher's handlers are reached
//!
//! # Invariants
//!
//! - Parsing NEVER panics
//! - Every parsed request gets a payload that serializes with version 3.0
//! - `ping` is always answered with the health payload

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use flowgate_core::FlowDispatcher;
use flowgate_proto::{FlowAction, FlowRequest, ResponsePayload, ScreenId};
use flowgate_server::{Catalog, MemoryStore, StoreProvider, SystemEnv};
use libfuzzer_sys::fuzz_target;
use serde_json::{Map, Value, json};

const CATALOG: &[u8] = include_bytes!("../../crates/flowgate-server/catalog.example.json");

const TRIGGERS: [&str; 11] = [
    "apply_filter",
    "select_order",
    "view_order",
    "update_status",
    "filter_menu_items",
    "add_item_to_cart",
    "confirm_order",
    "create_order",
    "adjust_inventory",
    "select_table",
    "unknown_trigger",
];

const KEYS: [&str; 12] = [
    "filter",
    "orderId",
    "status",
    "sku",
    "inventory_action",
    "qty",
    "selected_category",
    "selectedTable",
    "selectedItem",
    "quantity",
    "search_query",
    "customer_name",
];

#[derive(Debug, Clone, Arbitrary)]
enum Input {
    Raw(Vec<u8>),
    Shaped { action: u8, screen: u8, trigger: u8, fields: Vec<(u8, FieldValue)> },
}

#[derive(Debug, Clone, Arbitrary)]
enum FieldValue {
    Text(String),
    Number(i64),
    Float(f64),
    List(Vec<String>),
    Null,
}

impl FieldValue {
    fn into_json(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text),
            Self::Number(n) => json!(n),
            Self::Float(f) => serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number),
            Self::List(items) => json!(items),
            Self::Null => Value::Null,
        }
    }
}

type Dispatcher = FlowDispatcher<StoreProvider<MemoryStore, SystemEnv>>;

fn harness() -> &'static (tokio::runtime::Runtime, Dispatcher) {
    static HARNESS: OnceLock<(tokio::runtime::Runtime, Dispatcher)> = OnceLock::new();
    HARNESS.get_or_init(|| {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
        let catalog = Catalog::from_json(CATALOG).expect("example catalog");
        let store = MemoryStore::with_catalog(&catalog).expect("seed");
        (runtime, FlowDispatcher::new(StoreProvider::new(store, SystemEnv::new())))
    })
}

fn shaped(action: u8, screen: u8, trigger: u8, fields: Vec<(u8, FieldValue)>) -> Vec<u8> {
    let action = ["ping", "INIT", "BACK", "data_exchange"][usize::from(action) % 4];
    let screen = ScreenId::ALL.get(usize::from(screen)).map_or("NOT_A_SCREEN", |screen| screen.as_str());

    let mut data = Map::new();
    data.insert("trigger".into(), json!(TRIGGERS[usize::from(trigger) % TRIGGERS.len()]));
    for (key, value) in fields {
        data.insert(KEYS[usize::from(key) % KEYS.len()].into(), value.into_json());
    }

    let body = json!({"version": "3.0", "action": action, "screen": screen, "data": data});
    serde_json::to_vec(&body).expect("json value serializes")
}

fuzz_target!(|input: Input| {
    let plaintext = match input {
        Input::Raw(bytes) => bytes,
        Input::Shaped { action, screen, trigger, fields } => shaped(action, screen, trigger, fields),
    };

    let Ok(request) = FlowRequest::parse(&plaintext) else {
        return;
    };

    let (runtime, dispatcher) = harness();
    let payload = runtime.block_on(dispatcher.handle(&request));

    if request.action == FlowAction::Ping {
        assert_eq!(payload, ResponsePayload::health());
    }

    let bytes = payload.to_json_bytes().expect("payload serializes");
    let reply: Value = serde_json::from_slice(&bytes).expect("payload is JSON");
    assert_eq!(reply["version"], "3.0");
    assert!(reply["data"].is_object());
});
