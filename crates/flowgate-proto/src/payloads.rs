//! Per-screen response data.
//!
//! One struct per data shape the client renders. Field names are the exact
//! keys the Flow JSON layouts bind to, including the camelCase ones.
//! Optional `message`/`error` fields carry soft outcomes and are omitted when
//! empty.

use serde::Serialize;

/// Data block of a response.
///
/// Serialized untagged: each variant becomes a plain JSON object.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScreenData {
    /// Ping reply
    Health(HealthData),
    /// `CHOOSE_NAV`
    Navigation(NavigationData),
    /// `VIEW_ORDER` and its filter updates
    OrderList(OrderListData),
    /// `VIEW_ORDER_DETAILS`
    OrderDetails(OrderDetailsData),
    /// `MANAGE_INVENTORY`
    Inventory(InventoryData),
    /// `NEW_ORDER`
    NewOrder(NewOrderData),
    /// `ADD_ITEMS`
    Menu(MenuData),
    /// `REVIEW_ORDER`
    Review(ReviewData),
    /// `ORDER_CONFIRMED`
    Confirmation(ConfirmationData),
    /// `SELECT_TABLE`
    Tables(TablesData),
    /// Generic soft error on the current screen
    Notice(NoticeData),
    /// `{}`
    Empty(EmptyData),
}

impl ScreenData {
    /// The `{}` data block.
    pub const fn empty() -> Self {
        Self::Empty(EmptyData {})
    }
}

/// Dropdown or radio option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionItem {
    /// Value sent back by the client when selected
    pub id: String,
    /// Label shown to the user
    pub title: String,
    /// Secondary label
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl OptionItem {
    /// Option without a description.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), description: None }
    }
}

/// One cart line as the client shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    /// Menu item or SKU id
    pub id: String,
    /// Item title
    pub title: String,
    /// Unit price in rupees
    pub price: i64,
    /// Units in the cart
    pub quantity: u32,
}

/// `{status: "active"}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthData {
    /// Always `active`
    pub status: String,
}

/// Entry screen data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationData {
    /// Product categories
    pub categories: Vec<OptionItem>,
    /// Variants of every category
    pub items: Vec<OptionItem>,
    /// Orders, newest first
    pub orders: Vec<OptionItem>,
    /// Status filter choices, `ALL` first
    pub statuses: Vec<OptionItem>,
}

/// Order list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderListData {
    /// Orders, newest first
    pub orders: Vec<OptionItem>,
}

/// Single order view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderDetailsData {
    /// Pre-formatted, human-readable summary
    pub order_detail_text: String,
    /// Order shown, absent when it could not be loaded
    #[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Outcome of a status update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Soft error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Inventory management data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InventoryData {
    /// Product categories
    pub categories: Vec<OptionItem>,
    /// Variants, optionally narrowed to one category
    pub items: Vec<OptionItem>,
    /// Outcome of a stock adjustment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Soft error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Staff order entry data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewOrderData {
    /// Product categories
    pub categories: Vec<OptionItem>,
    /// Variants of the selected category
    #[serde(rename = "variantOptions")]
    pub variant_options: Vec<OptionItem>,
    /// Cart of this flow
    pub cart: Vec<CartLineView>,
    /// Multi-line cart summary
    pub cart_review_text: String,
    /// Formatted cart total
    pub total: String,
    /// Outcome of a cart change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Soft error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Menu browsing data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuData {
    /// Table whose cart is shown
    #[serde(rename = "selectedTable")]
    pub selected_table: String,
    /// Menu, optionally narrowed by a search query
    pub menu_items_filtered: Vec<OptionItem>,
    /// Cart of the table
    pub cart: Vec<CartLineView>,
    /// Multi-line cart summary
    pub cart_review_text: String,
    /// Formatted cart total
    pub total: String,
    /// Outcome of a cart change
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Soft error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Cart review data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewData {
    /// Table whose cart is shown
    #[serde(rename = "selectedTable")]
    pub selected_table: String,
    /// Cart lines
    pub cart: Vec<CartLineView>,
    /// Multi-line cart summary
    pub cart_review_text: String,
    /// Formatted cart total
    pub total: String,
    /// Soft error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Confirmation data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmationData {
    /// Text shown on the confirmation screen
    pub confirmation_message: String,
    /// Id of the created order
    #[serde(rename = "orderId", skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Formatted order total
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

/// Dining tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TablesData {
    /// Selectable tables
    pub tables: Vec<OptionItem>,
}

/// Generic soft error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoticeData {
    /// User-facing message, never internal details
    pub error: String,
}

/// Serializes as `{}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EmptyData {}
