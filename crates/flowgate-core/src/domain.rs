//! Business entities.
//!
//! These are storage-side types. They reach the wire only through the
//! explicit conversions in [`crate::convert`]; the dispatcher never hands a
//! domain value to the serializer directly.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Money in whole rupees.
pub type Rupees = i64;

/// Product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Stable id, also the dropdown value
    pub id: String,
    /// Display name
    pub title: String,
}

/// A sellable product variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Stock keeping unit, unique across categories
    pub sku: String,
    /// Display name
    pub title: String,
    /// Owning category
    pub category_id: String,
    /// Size label
    #[serde(default)]
    pub size: Option<String>,
    /// Color label
    #[serde(default)]
    pub color: Option<String>,
}

/// Order lifecycle state.
///
/// Wire names are the human labels, including the space in
/// `Out for delivery`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Received, not yet accepted
    Pending,
    /// Accepted
    Confirmed,
    /// Being prepared
    Preparing,
    /// Handed to delivery
    #[serde(rename = "Out for delivery")]
    OutForDelivery,
    /// Delivered to the customer
    Delivered,
    /// Cancelled at any point
    Cancelled,
}

impl OrderStatus {
    /// Every status in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Preparing,
        Self::OutForDelivery,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Preparing => "Preparing",
            Self::OutForDelivery => "Out for delivery",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Parse a label, ignoring case and treating `_` as a space.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().replace('_', " ");
        Self::ALL.into_iter().find(|status| status.as_str().eq_ignore_ascii_case(&normalized))
    }

    /// Position on the delivery track, `None` for cancelled orders.
    pub const fn progress_step(self) -> Option<usize> {
        match self {
            Self::Pending => Some(0),
            Self::Confirmed => Some(1),
            Self::Preparing => Some(2),
            Self::OutForDelivery => Some(3),
            Self::Delivered => Some(4),
            Self::Cancelled => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who an order is for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Full name
    pub name: String,
    /// Phone number
    pub phone: String,
    /// Email address
    #[serde(default)]
    pub email: Option<String>,
    /// Delivery address
    #[serde(default)]
    pub address: Option<String>,
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Variant or menu item id
    pub sku: String,
    /// Title at the time of ordering
    pub title: String,
    /// Size label
    #[serde(default)]
    pub size: Option<String>,
    /// Color label
    #[serde(default)]
    pub color: Option<String>,
    /// Units ordered
    pub quantity: u32,
    /// Unit price, unknown for some staff-entered orders
    #[serde(default)]
    pub unit_price: Option<Rupees>,
}

impl OrderItem {
    /// `quantity × unit_price`, if the price is known.
    pub fn subtotal(&self) -> Option<Rupees> {
        self.unit_price.map(|price| price.saturating_mul(Rupees::from(self.quantity)))
    }
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// Order id, e.g. `BTQ-1A2B3C4D`
    pub id: String,
    /// Current state
    pub status: OrderStatus,
    /// Customer details
    pub customer: Customer,
    /// Requested delivery or pickup date
    #[serde(default)]
    pub fulfillment_date: Option<NaiveDate>,
    /// Free-form note
    #[serde(default)]
    pub note: Option<String>,
    /// Creation time; order listings sort on this
    pub created_at: DateTime<Utc>,
    /// Ordered lines
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Sum of the priced lines, `None` when no line has a price.
    pub fn total(&self) -> Option<Rupees> {
        self.items.iter().filter_map(OrderItem::subtotal).reduce(Rupees::saturating_add)
    }
}

/// Stock level, keyed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    /// SKU
    pub sku: String,
    /// Units on hand
    pub quantity: u32,
}

/// Stock adjustment kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InventoryAction {
    /// Increase by the given amount
    Add,
    /// Decrease by the given amount, stopping at zero
    Remove,
    /// Replace with the given amount
    Set,
}

impl InventoryAction {
    /// Parse `add`, `remove` or `set`, ignoring case.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "remove" => Some(Self::Remove),
            "set" => Some(Self::Set),
            _ => None,
        }
    }

    /// New quantity after applying this action with `amount` to `current`.
    ///
    /// Never underflows; `add` saturates at `u32::MAX`.
    pub const fn apply(self, current: u32, amount: u32) -> u32 {
        match self {
            Self::Add => current.saturating_add(amount),
            Self::Remove => current.saturating_sub(amount),
            Self::Set => amount,
        }
    }
}

/// Restaurant menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable id, also the dropdown value
    pub id: String,
    /// Dish name
    pub title: String,
    /// Unit price
    pub price: Rupees,
}

/// Dining table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiningTable {
    /// Stable id, also the cart key
    pub id: String,
    /// Display name
    pub title: String,
}

/// Identifies a cart: a dining table or a flow conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CartKey(String);

impl CartKey {
    /// Cart used when the request names none.
    pub const DEFAULT: &'static str = "table_1";

    /// Wrap a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// Menu item id or SKU
    pub item_id: String,
    /// Title at the time it was added
    pub title: String,
    /// Unit price at the time it was added
    pub unit_price: Rupees,
    /// Units
    pub quantity: u32,
}

impl CartLine {
    /// `quantity × unit_price`
    pub fn line_total(&self) -> Rupees {
        self.unit_price.saturating_mul(Rupees::from(self.quantity))
    }
}

/// Items collected before an order is confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    /// Lines in insertion order, one per item id
    pub lines: Vec<CartLine>,
}

impl Cart {
    /// True when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of all line totals.
    pub fn total(&self) -> Rupees {
        self.lines.iter().map(CartLine::line_total).fold(0, Rupees::saturating_add)
    }

    /// Add a line, merging with an existing line for the same item.
    pub fn add(&mut self, line: CartLine) {
        match self.lines.iter_mut().find(|existing| existing.item_id == line.item_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
    }
}

/// Request to put an item in a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartAddition {
    /// Menu item id or SKU
    pub item_id: String,
    /// Units, at least one
    pub quantity: u32,
    /// Price for SKUs that carry no catalog price
    pub unit_price: Option<Rupees>,
}

/// One requested line of a staff-entered order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    /// Variant SKU
    pub sku: String,
    /// Units
    pub quantity: u32,
    /// Agreed unit price
    pub unit_price: Option<Rupees>,
    /// Size override
    pub size: Option<String>,
    /// Color override
    pub color: Option<String>,
}

/// A new order before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    /// Customer details
    pub customer: Customer,
    /// Category every line must belong to
    pub category_id: String,
    /// Requested lines
    pub lines: Vec<DraftLine>,
    /// Requested fulfillment date
    pub fulfillment_date: Option<NaiveDate>,
    /// Free-form note
    pub note: Option<String>,
}
