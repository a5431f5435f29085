//! Decrypted request and its typed form.
//!
//! The platform sends loosely shaped JSON. [`DecryptedRequest`] mirrors it
//! field for field; [`FlowRequest`] is what the dispatcher consumes: the
//! action becomes a [`FlowAction`], the trigger a [`Trigger`], and the free
//! form `data` map is wrapped in [`RequestData`] with typed accessors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::ProtocolError;

/// Request exactly as decrypted from the envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptedRequest {
    /// Protocol version announced by the client
    pub version: String,
    /// `ping`, `data_exchange`, `INIT`, `BACK`, ...
    pub action: String,
    /// Screen the client is currently on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screen: Option<String>,
    /// Form values and the `trigger` of a data exchange
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// Opaque per-conversation token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_token: Option<String>,
}

/// Wire shape with every field optional, so missing fields can be reported
/// by name instead of through a serde message.
#[derive(Deserialize)]
struct LooseRequest {
    version: Option<String>,
    action: Option<String>,
    #[serde(default)]
    screen: Option<String>,
    #[serde(default)]
    data: Option<Map<String, Value>>,
    #[serde(default)]
    flow_token: Option<String>,
}

impl DecryptedRequest {
    /// Parse decrypted plaintext.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest`: not UTF-8 JSON, or a field has the wrong type
    /// - `MissingField`: `version` or `action` absent
    pub fn from_slice(plaintext: &[u8]) -> Result<Self, ProtocolError> {
        let loose: LooseRequest = serde_json::from_slice(plaintext)
            .map_err(|e| ProtocolError::InvalidRequest { reason: e.to_string() })?;

        let version = loose.version.ok_or(ProtocolError::MissingField("version"))?;
        let action = loose.action.ok_or(ProtocolError::MissingField("action"))?;

        Ok(Self { version, action, screen: loose.screen, data: loose.data, flow_token: loose.flow_token })
    }
}

/// What the client asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowAction {
    /// Health check; answered without touching any screen
    Ping,
    /// Form submission on the current screen
    DataExchange {
        /// Named event, `None` when the client sent no trigger
        trigger: Option<Trigger>,
    },
    /// Any other action (`INIT`, `BACK`, `navigate`): load the screen
    InitialLoad {
        /// Action name as sent
        name: String,
    },
}

impl FlowAction {
    /// Classify a raw action name, taking the trigger from `data`.
    pub fn classify(action: &str, data: &RequestData) -> Self {
        match action {
            "ping" => Self::Ping,
            "data_exchange" => {
                Self::DataExchange { trigger: data.text(&["trigger"]).map(|t| Trigger::from_wire(&t)) }
            },
            other => Self::InitialLoad { name: other.to_string() },
        }
    }

    /// Action name for logs and diagnostics.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ping => "ping",
            Self::DataExchange { .. } => "data_exchange",
            Self::InitialLoad { name } => name,
        }
    }

    /// Trigger of a data exchange, if any.
    pub fn trigger(&self) -> Option<&Trigger> {
        match self {
            Self::DataExchange { trigger } => trigger.as_ref(),
            Self::Ping | Self::InitialLoad { .. } => None,
        }
    }
}

/// Named event inside a data exchange.
///
/// Historical client builds use a few alternative names; those are folded
/// into one variant here. Names outside the set are kept as `Unknown` so they
/// can be logged, and never match a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Narrow a listing (`apply_filter`, `filter_by_category`)
    ApplyFilter,
    /// Open one order (`select_order`, `view_order`)
    SelectOrder,
    /// Change an order's status
    UpdateStatus,
    /// Narrow the catalog or menu
    FilterMenuItems,
    /// Put an item into the cart
    AddItemToCart,
    /// Confirm the cart as an order
    ConfirmOrder,
    /// Create an order from a staff form
    CreateOrder,
    /// Add, remove or set stock
    AdjustInventory,
    /// Pick a dining table
    SelectTable,
    /// Anything else
    Unknown(String),
}

impl Trigger {
    /// Map a wire name to a trigger, folding aliases.
    pub fn from_wire(name: &str) -> Self {
        match name.trim() {
            "apply_filter" | "filter_by_category" => Self::ApplyFilter,
            "select_order" | "view_order" => Self::SelectOrder,
            "update_status" => Self::UpdateStatus,
            "filter_menu_items" => Self::FilterMenuItems,
            "add_item_to_cart" => Self::AddItemToCart,
            "confirm_order" => Self::ConfirmOrder,
            "create_order" => Self::CreateOrder,
            "adjust_inventory" => Self::AdjustInventory,
            "select_table" => Self::SelectTable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Canonical wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ApplyFilter => "apply_filter",
            Self::SelectOrder => "select_order",
            Self::UpdateStatus => "update_status",
            Self::FilterMenuItems => "filter_menu_items",
            Self::AddItemToCart => "add_item_to_cart",
            Self::ConfirmOrder => "confirm_order",
            Self::CreateOrder => "create_order",
            Self::AdjustInventory => "adjust_inventory",
            Self::SelectTable => "select_table",
            Self::Unknown(name) => name,
        }
    }
}

/// Form values sent with a request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestData(Map<String, Value>);

impl RequestData {
    /// Wrap a JSON object.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Raw value under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// True when no fields were sent.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First non-blank text value among `keys`, trimmed.
    ///
    /// Numbers are accepted and rendered in decimal, since dropdown ids are
    /// sometimes sent unquoted.
    pub fn text(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| match self.0.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    /// Non-negative count under `key`, from a number or a numeric string.
    pub fn count(&self, key: &str) -> Option<u32> {
        match self.0.get(key)? {
            Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
                .and_then(|v| u32::try_from(v).ok()),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Whole-rupee amount under `key`, from a number or a numeric string.
    pub fn amount(&self, key: &str) -> Option<i64> {
        match self.0.get(key)? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Values under `key` as a list: a single string becomes a one-element
    /// list, an array keeps its non-blank string members.
    pub fn text_list(&self, key: &str) -> Vec<String> {
        match self.0.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// A request ready for dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowRequest {
    /// Protocol version announced by the client
    pub version: String,
    /// Classified action
    pub action: FlowAction,
    /// Raw screen name; resolution to [`crate::ScreenId`] happens at dispatch
    pub screen: Option<String>,
    /// Form values
    pub data: RequestData,
    /// Opaque per-conversation token
    pub flow_token: Option<String>,
}

impl FlowRequest {
    /// Parse decrypted plaintext straight into the typed form.
    ///
    /// # Errors
    ///
    /// See [`DecryptedRequest::from_slice`].
    pub fn parse(plaintext: &[u8]) -> Result<Self, ProtocolError> {
        DecryptedRequest::from_slice(plaintext).map(Self::from)
    }

    /// Screen name, or `None` when absent or blank.
    pub fn screen_name(&self) -> Option<&str> {
        self.screen.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }
}

impl From<DecryptedRequest> for FlowRequest {
    fn from(request: DecryptedRequest) -> Self {
        let data = RequestData::new(request.data.unwrap_or_default());
        let action = FlowAction::classify(&request.action, &data);
        Self { version: request.version, action, screen: request.screen, data, flow_token: request.flow_token }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> RequestData {
        match value {
            Value::Object(map) => RequestData::new(map),
            _ => RequestData::default(),
        }
    }

    #[test]
    fn data_exchange_reads_trigger_from_data() {
        let request = FlowRequest::parse(
            br#"{"version":"3.0","action":"data_exchange","screen":"VIEW_ORDER","data":{"trigger":"apply_filter","filter":"Pending"}}"#,
        )
        .unwrap();

        assert_eq!(request.action, FlowAction::DataExchange { trigger: Some(Trigger::ApplyFilter) });
        assert_eq!(request.screen_name(), Some("VIEW_ORDER"));
        assert_eq!(request.data.text(&["filter"]).as_deref(), Some("Pending"));
    }

    #[test]
    fn ping_ignores_everything_else() {
        let request = FlowRequest::parse(br#"{"version":"3.0","action":"ping"}"#).unwrap();
        assert_eq!(request.action, FlowAction::Ping);
        assert!(request.data.is_empty());
    }

    #[test]
    fn other_actions_are_initial_loads() {
        let request = FlowRequest::parse(br#"{"version":"3.0","action":"INIT","screen":""}"#).unwrap();

        assert_eq!(request.action, FlowAction::InitialLoad { name: "INIT".to_string() });
        assert_eq!(request.action.trigger(), None);
        assert_eq!(request.screen_name(), None);
    }

    #[test]
    fn blank_trigger_counts_as_absent() {
        let request = FlowRequest::parse(
            br#"{"version":"3.0","action":"data_exchange","screen":"NEW_ORDER","data":{"trigger":"  "}}"#,
        )
        .unwrap();
        assert_eq!(request.action, FlowAction::DataExchange { trigger: None });
    }

    #[test]
    fn missing_version_or_action_is_reported_by_name() {
        assert_eq!(
            DecryptedRequest::from_slice(br#"{"action":"ping"}"#).unwrap_err(),
            ProtocolError::MissingField("version")
        );
        assert_eq!(
            DecryptedRequest::from_slice(br#"{"version":"3.0"}"#).unwrap_err(),
            ProtocolError::MissingField("action")
        );
    }

    #[test]
    fn non_json_plaintext_is_invalid_request() {
        let err = DecryptedRequest::from_slice(&[0xFF, 0xFE, 0x00]).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidRequest { .. }));
    }

    #[test]
    fn trigger_aliases_fold() {
        assert_eq!(Trigger::from_wire("filter_by_category"), Trigger::ApplyFilter);
        assert_eq!(Trigger::from_wire("view_order"), Trigger::SelectOrder);
        assert_eq!(Trigger::from_wire("refresh"), Trigger::Unknown("refresh".to_string()));
    }

    #[test]
    fn text_accepts_numbers_and_falls_through_aliases() {
        let values = data(json!({"orderId": "", "id": 42}));
        assert_eq!(values.text(&["orderId", "id"]).as_deref(), Some("42"));
    }

    #[test]
    fn count_accepts_numeric_strings_and_whole_floats() {
        let values = data(json!({"a": "3", "b": 2.0, "c": -1, "d": 1.5, "e": true}));

        assert_eq!(values.count("a"), Some(3));
        assert_eq!(values.count("b"), Some(2));
        assert_eq!(values.count("c"), None);
        assert_eq!(values.count("d"), None);
        assert_eq!(values.count("e"), None);
    }

    #[test]
    fn text_list_accepts_single_string_or_array() {
        let values = data(json!({"one": "Pending", "many": ["Pending", " ", 7, "Delivered"]}));

        assert_eq!(values.text_list("one"), vec!["Pending"]);
        assert_eq!(values.text_list("many"), vec!["Pending", "Delivered"]);
        assert!(values.text_list("none").is_empty());
    }

    #[test]
    fn prop_parse_preserves_version_and_screen() {
        proptest!(|(version in "[0-9]\\.[0-9]", screen in "[A-Z_]{0,20}", action in "[a-zA-Z_]{1,16}")| {
            let body = json!({"version": version, "action": action, "screen": screen});
            let request = FlowRequest::parse(body.to_string().as_bytes()).unwrap();

            prop_assert_eq!(&request.version, &version);
            prop_assert_eq!(request.screen.as_deref(), Some(screen.as_str()));
            prop_assert_eq!(request.action.as_str(), action.as_str());
        });
    }
}
