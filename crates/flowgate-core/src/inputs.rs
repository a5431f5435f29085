//! Typed inputs extracted from request data.
//!
//! The client sends form values as a loose JSON map, with different key
//! names across client builds. Each trigger's inputs are pulled out here,
//! once, into domain types; handlers never index the map themselves.

use chrono::{DateTime, NaiveDate};
use flowgate_proto::{FlowRequest, RequestData};
use serde_json::Value;

use crate::{
    convert::ALL_STATUSES,
    domain::{CartAddition, CartKey, Customer, DraftLine, InventoryAction, OrderDraft, OrderStatus, Rupees},
    error::DispatchError,
};

/// Highest unit price accepted from a form, in rupees.
pub const MAX_UNIT_PRICE: Rupees = 10_000_000;

/// Zero or more statuses to keep; empty means every order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter(Vec<OrderStatus>);

impl StatusFilter {
    /// Read `filter` (or `status`): a label or a list of labels.
    ///
    /// `ALL` anywhere in the list disables filtering. Unknown labels are
    /// ignored.
    pub fn from_data(data: &RequestData) -> Self {
        let mut labels = data.text_list("filter");
        if labels.is_empty() {
            labels = data.text_list("status");
        }

        if labels.iter().any(|label| label.eq_ignore_ascii_case(ALL_STATUSES)) {
            return Self::default();
        }

        let mut statuses: Vec<OrderStatus> = Vec::with_capacity(labels.len());
        for status in labels.iter().filter_map(|label| OrderStatus::parse(label)) {
            if !statuses.contains(&status) {
                statuses.push(status);
            }
        }
        Self(statuses)
    }

    /// Statuses to pass to the provider, `None` for unfiltered.
    pub fn statuses(&self) -> Option<&[OrderStatus]> {
        (!self.0.is_empty()).then_some(self.0.as_slice())
    }
}

/// Order id from `orderId` (or `id`).
pub fn order_id(data: &RequestData) -> Option<String> {
    data.text(&["orderId", "id"])
}

/// Cart the request operates on: the selected table, then the flow token,
/// then [`CartKey::DEFAULT`].
pub fn cart_key(request: &FlowRequest) -> CartKey {
    request
        .data
        .text(&["selectedTable", "table"])
        .or_else(|| request.flow_token.as_deref().map(str::trim).filter(|t| !t.is_empty()).map(str::to_string))
        .map_or_else(|| CartKey::new(CartKey::DEFAULT), CartKey::new)
}

/// Category selected in a filter dropdown.
pub fn selected_category(data: &RequestData) -> Option<String> {
    data.text(&["selected_category", "category", "category_id"])
}

/// Item and quantity for `add_item_to_cart`.
///
/// # Errors
///
/// - `InvalidInput`: no item selected, quantity zero or not a number, or a
///   unit price that is negative, malformed or above [`MAX_UNIT_PRICE`]
pub fn cart_addition(data: &RequestData) -> Result<CartAddition, DispatchError> {
    let item_id = data
        .text(&["selectedItem", "item_id", "item_variant", "sku"])
        .ok_or(DispatchError::invalid("selectedItem", "No item selected"))?;

    let quantity = match data.get("quantity") {
        None | Some(Value::Null) => 1,
        Some(_) => data.count("quantity").ok_or(DispatchError::invalid("quantity", "Enter a valid quantity"))?,
    };
    if quantity == 0 {
        return Err(DispatchError::invalid("quantity", "Quantity must be at least 1"));
    }

    Ok(CartAddition { item_id, quantity, unit_price: unit_price(data)? })
}

/// Optional `unit_price`; blank means the catalog decides.
fn unit_price(data: &RequestData) -> Result<Option<Rupees>, DispatchError> {
    match data.get("unit_price") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(_) => data
            .amount("unit_price")
            .filter(|price| (0..=MAX_UNIT_PRICE).contains(price))
            .map(Some)
            .ok_or(DispatchError::invalid("unit_price", "Enter a valid price")),
    }
}

/// SKU, action and amount for `adjust_inventory`.
///
/// # Errors
///
/// - `InvalidInput`: SKU missing, action not add/remove/set, amount missing
pub fn inventory_adjustment(data: &RequestData) -> Result<(String, InventoryAction, u32), DispatchError> {
    let sku = data
        .text(&["sku", "selectedItem", "item_variant"])
        .ok_or(DispatchError::invalid("sku", "No item selected"))?;
    let action = data
        .text(&["inventory_action", "adjustment", "mode"])
        .and_then(|label| InventoryAction::parse(&label))
        .ok_or(DispatchError::invalid("inventory_action", "Invalid action"))?;
    let quantity = data
        .count("qty")
        .or_else(|| data.count("quantity"))
        .ok_or(DispatchError::invalid("qty", "Enter a valid quantity"))?;

    Ok((sku, action, quantity))
}

/// New status and optional note for `update_status`.
///
/// # Errors
///
/// - `InvalidInput`: status missing or not a known label
pub fn status_update(data: &RequestData) -> Result<(OrderStatus, Option<String>), DispatchError> {
    let status = data
        .text(&["status", "new_status"])
        .and_then(|label| OrderStatus::parse(&label))
        .ok_or(DispatchError::invalid("status", "Choose a valid status"))?;

    Ok((status, data.text(&["note"])))
}

/// Staff order form for `create_order`.
///
/// # Errors
///
/// - `InvalidInput`: a required field is missing or malformed
pub fn order_draft(data: &RequestData) -> Result<OrderDraft, DispatchError> {
    let name = data
        .text(&["customer_name", "name"])
        .ok_or(DispatchError::invalid("customer_name", "Customer name is required"))?;
    let phone = data
        .text(&["customer_phone", "phone"])
        .ok_or(DispatchError::invalid("customer_phone", "Customer phone is required"))?;
    let category_id =
        selected_category(data).ok_or(DispatchError::invalid("category", "Choose a category"))?;
    let addition = cart_addition(data)?;

    let fulfillment_date = match data.get("fulfillment_date") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(value) => Some(
            parse_date(value).ok_or(DispatchError::invalid("fulfillment_date", "Enter a valid date"))?,
        ),
    };

    Ok(OrderDraft {
        customer: Customer {
            name,
            phone,
            email: data.text(&["customer_email", "email"]),
            address: data.text(&["customer_address", "address"]),
        },
        category_id,
        lines: vec![DraftLine {
            sku: addition.item_id,
            quantity: addition.quantity,
            unit_price: addition.unit_price,
            size: data.text(&["size"]),
            color: data.text(&["color"]),
        }],
        fulfillment_date,
        note: data.text(&["note"]),
    })
}

/// `YYYY-MM-DD`, or epoch milliseconds as sent by older date pickers.
fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .or_else(|| s.parse::<i64>().ok().and_then(date_from_millis))
        },
        Value::Number(n) => n.as_i64().and_then(date_from_millis),
        _ => None,
    }
}

fn date_from_millis(millis: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn data(value: Value) -> RequestData {
        match value {
            Value::Object(map) => RequestData::new(map),
            _ => RequestData::default(),
        }
    }

    #[test]
    fn filter_accepts_single_label() {
        let filter = StatusFilter::from_data(&data(json!({"filter": "Pending"})));
        assert_eq!(filter.statuses(), Some(&[OrderStatus::Pending][..]));
    }

    #[test]
    fn filter_accepts_list_and_dedups() {
        let filter = StatusFilter::from_data(&data(json!({"filter": ["Pending", "Delivered", "pending"]})));
        assert_eq!(filter.statuses(), Some(&[OrderStatus::Pending, OrderStatus::Delivered][..]));
    }

    #[test]
    fn all_absent_or_unknown_means_unfiltered() {
        assert_eq!(StatusFilter::from_data(&data(json!({"filter": "ALL"}))).statuses(), None);
        assert_eq!(StatusFilter::from_data(&data(json!({"filter": ["Pending", "ALL"]}))).statuses(), None);
        assert_eq!(StatusFilter::from_data(&data(json!({}))).statuses(), None);
        assert_eq!(StatusFilter::from_data(&data(json!({"filter": "Lost"}))).statuses(), None);
    }

    #[test]
    fn status_key_is_an_alias_for_filter() {
        let filter = StatusFilter::from_data(&data(json!({"status": "Cancelled"})));
        assert_eq!(filter.statuses(), Some(&[OrderStatus::Cancelled][..]));
    }

    #[test]
    fn cart_key_prefers_table_then_token() {
        let mut request = FlowRequest::parse(br#"{"version":"3.0","action":"INIT","flow_token":"tok-9"}"#).unwrap();
        assert_eq!(cart_key(&request), CartKey::new("tok-9"));

        request.data = data(json!({"selectedTable": "table_4"}));
        assert_eq!(cart_key(&request), CartKey::new("table_4"));

        request.flow_token = None;
        request.data = RequestData::default();
        assert_eq!(cart_key(&request), CartKey::new("table_1"));
    }

    #[test]
    fn cart_addition_defaults_quantity_to_one() {
        let addition = cart_addition(&data(json!({"selectedItem": "m1"}))).unwrap();
        assert_eq!(addition, CartAddition { item_id: "m1".into(), quantity: 1, unit_price: None });
    }

    #[test]
    fn cart_addition_rejects_missing_item_and_bad_quantity() {
        assert_eq!(
            cart_addition(&data(json!({"quantity": 2}))).unwrap_err().user_message(),
            "No item selected"
        );
        assert!(cart_addition(&data(json!({"selectedItem": "m1", "quantity": "lots"}))).is_err());
        assert!(cart_addition(&data(json!({"selectedItem": "m1", "quantity": 0}))).is_err());
    }

    #[test]
    fn unit_price_must_be_within_bounds() {
        let priced = |price: Value| cart_addition(&data(json!({"selectedItem": "SKU-1", "unit_price": price})));

        assert_eq!(priced(json!(MAX_UNIT_PRICE)).unwrap().unit_price, Some(MAX_UNIT_PRICE));
        assert_eq!(priced(json!("")).unwrap().unit_price, None);
        assert_eq!(priced(json!(-1)).unwrap_err(), DispatchError::invalid("unit_price", "Enter a valid price"));
        assert!(priced(json!(MAX_UNIT_PRICE + 1)).is_err());
        assert!(priced(json!(i64::MAX)).is_err());
        assert!(priced(json!("cheap")).is_err());
    }

    #[test]
    fn inventory_adjustment_requires_known_action() {
        let ok = inventory_adjustment(&data(json!({"sku": "SKU-1", "inventory_action": "Remove", "qty": "3"})));
        assert_eq!(ok.unwrap(), ("SKU-1".to_string(), InventoryAction::Remove, 3));

        let err = inventory_adjustment(&data(json!({"sku": "SKU-1", "inventory_action": "steal", "qty": 3})));
        assert_eq!(err.unwrap_err().user_message(), "Invalid action");
    }

    #[test]
    fn order_draft_collects_customer_and_line() {
        let draft = order_draft(&data(json!({
            "customer_name": "Asha",
            "customer_phone": "98765",
            "category": "skirt",
            "item_variant": "SKU-1",
            "quantity": 2,
            "unit_price": 1200,
            "fulfillment_date": "2024-05-03",
            "note": "Gift wrap",
        })))
        .unwrap();

        assert_eq!(draft.customer.name, "Asha");
        assert_eq!(draft.category_id, "skirt");
        assert_eq!(draft.lines[0].sku, "SKU-1");
        assert_eq!(draft.lines[0].unit_price, Some(1200));
        assert_eq!(draft.fulfillment_date, NaiveDate::from_ymd_opt(2024, 5, 3));
        assert_eq!(draft.note.as_deref(), Some("Gift wrap"));
    }

    #[test]
    fn order_draft_accepts_epoch_millis_dates() {
        let draft = order_draft(&data(json!({
            "customer_name": "Asha",
            "customer_phone": "98765",
            "category": "skirt",
            "item_variant": "SKU-1",
            "fulfillment_date": "1714694400000",
        })))
        .unwrap();
        assert_eq!(draft.fulfillment_date, NaiveDate::from_ymd_opt(2024, 5, 3));
    }

    #[test]
    fn order_draft_reports_first_missing_field() {
        let err = order_draft(&data(json!({"customer_phone": "98765"}))).unwrap_err();
        assert_eq!(err, DispatchError::invalid("customer_name", "Customer name is required"));
    }
}
