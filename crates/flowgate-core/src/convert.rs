//! Conversions from storage entities to wire types.
//!
//! One function per (entity, wire shape) pair. Handlers build every response
//! through these, so a field rename on either side shows up here and nowhere
//! else.

use flowgate_proto::{CartLineView, OptionItem};

use crate::{
    domain::{CartLine, Category, DiningTable, MenuItem, Order, OrderStatus, Variant},
    summary::format_inr,
};

/// Status filter value meaning "no filter".
pub const ALL_STATUSES: &str = "ALL";

/// Category dropdown entry.
pub fn category_option(category: &Category) -> OptionItem {
    OptionItem::new(&category.id, &category.title)
}

/// Variant dropdown entry, keyed by SKU.
pub fn variant_option(variant: &Variant) -> OptionItem {
    OptionItem::new(&variant.sku, &variant.title)
}

/// Order list entry: `BTQ-1A2B3C4D — Asha (Pending)`.
pub fn order_option(order: &Order) -> OptionItem {
    OptionItem::new(&order.id, format!("{} — {} ({})", order.id, order.customer.name, order.status))
}

/// Status filter entries, `ALL` first.
pub fn status_options() -> Vec<OptionItem> {
    std::iter::once(OptionItem::new(ALL_STATUSES, "All orders"))
        .chain(OrderStatus::ALL.into_iter().map(|status| OptionItem::new(status.as_str(), status.as_str())))
        .collect()
}

/// Menu entry with its price as description.
pub fn menu_option(item: &MenuItem) -> OptionItem {
    OptionItem { id: item.id.clone(), title: item.title.clone(), description: Some(format_inr(item.price)) }
}

/// Table picker entry.
pub fn table_option(table: &DiningTable) -> OptionItem {
    OptionItem::new(&table.id, &table.title)
}

/// Cart line as shown to the client.
pub fn cart_line_view(line: &CartLine) -> CartLineView {
    CartLineView {
        id: line.item_id.clone(),
        title: line.title.clone(),
        price: line.unit_price,
        quantity: line.quantity,
    }
}
