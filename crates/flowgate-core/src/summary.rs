//! Human-readable text rendered into Flow screens.
//!
//! Pure functions of their inputs. Item tables cap the title column at 36
//! characters so they stay readable in the phone text component.

use crate::domain::{Cart, Order, OrderStatus, Rupees};

/// Shown when an order cannot be loaded.
pub const ORDER_UNAVAILABLE: &str = "Unable to load order details.";

/// Shown in place of an empty cart review.
pub const EMPTY_CART: &str = "Your cart is empty.";

/// Placeholder for missing values.
const DASH: &str = "—";

/// Progress track, cancelled excluded.
const TRACK: [OrderStatus; 5] = [
    OrderStatus::Pending,
    OrderStatus::Confirmed,
    OrderStatus::Preparing,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

/// Format rupees with Indian digit grouping: `₹1,23,456`.
pub fn format_inr(amount: Rupees) -> String {
    let digits = amount.unsigned_abs().to_string();
    let sign = if amount < 0 { "-" } else { "" };

    if digits.len() <= 3 {
        return format!("{sign}₹{digits}");
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 2);
    let first = head.len() % 2;
    if first == 1 {
        grouped.push_str(&head[..1]);
    }
    for pair in head.as_bytes()[first..].chunks(2) {
        if !grouped.is_empty() {
            grouped.push(',');
        }
        grouped.push_str(std::str::from_utf8(pair).unwrap_or_default());
    }

    format!("{sign}₹{grouped},{tail}")
}

/// [`format_inr`], or a dash when the amount is unknown.
pub fn format_optional_inr(amount: Option<Rupees>) -> String {
    amount.map_or_else(|| DASH.to_string(), format_inr)
}

/// One line per cart entry: `Masala Dosa x 2 – ₹160`.
pub fn cart_review_text(cart: &Cart) -> String {
    if cart.is_empty() {
        return EMPTY_CART.to_string();
    }

    cart.lines
        .iter()
        .map(|line| format!("{} x {} – {}", line.title, line.quantity, format_inr(line.line_total())))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Status label with icon, and a progress bar.
///
/// The bar marks completed steps `●`, the current step `⏺` and pending steps
/// `○`. Cancelled orders get `[✖]` instead.
pub fn status_badge(status: OrderStatus) -> (String, String) {
    let icon = match status {
        OrderStatus::Pending => "⏳",
        OrderStatus::Confirmed => "🟢",
        OrderStatus::Preparing => "🧑‍🍳",
        OrderStatus::OutForDelivery => "🚚",
        OrderStatus::Delivered => "✅",
        OrderStatus::Cancelled => "❌",
    };
    let label = format!("{icon} {status}");

    let Some(current) = status.progress_step() else {
        return (label, "[✖]".to_string());
    };

    let bar: String = (0..TRACK.len())
        .map(|step| match step.cmp(&current) {
            std::cmp::Ordering::Less => '●',
            std::cmp::Ordering::Equal => '⏺',
            std::cmp::Ordering::Greater => '○',
        })
        .collect();

    (label, format!("[{bar}]"))
}

/// Render an order as a multi-line summary.
///
/// ```text
/// 🧾 ORDER BTQ-00000001
/// ═════════════════════
/// ⏳ Pending  [⏺○○○○]
/// 🕒 Created: 2024-05-01 10:30
/// 📅 Fulfillment: 2024-05-03
///
/// 👤 CUSTOMER
/// ──────────
/// Asha
/// 📞 9876543210
///
/// 📦 ITEMS
/// ────────
/// Item       │ Qty │  Unit │ Subtotal
/// ...
/// TOTAL      │     │       │   ₹2,400
/// ```
pub fn format_order_summary(order: &Order) -> String {
    let mut out: Vec<String> = Vec::new();

    let header = format!("🧾 ORDER {}", order.id);
    let underline = "═".repeat(header.chars().count());
    out.push(header);
    out.push(underline);

    let (status_line, status_bar) = status_badge(order.status);
    out.push(format!("{status_line}  {status_bar}"));
    out.push(format!("🕒 Created: {}", order.created_at.format("%Y-%m-%d %H:%M")));
    let fulfillment = order.fulfillment_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
    out.push(format!("📅 Fulfillment: {fulfillment}"));
    out.push(String::new());

    out.push("👤 CUSTOMER".to_string());
    out.push("──────────".to_string());
    let customer = &order.customer;
    if !customer.name.is_empty() {
        out.push(customer.name.clone());
    }
    if !customer.phone.is_empty() {
        out.push(format!("📞 {}", customer.phone));
    }
    if let Some(email) = customer.email.as_deref().filter(|e| !e.is_empty()) {
        out.push(format!("✉️  {email}"));
    }
    if let Some(address) = customer.address.as_deref().filter(|a| !a.is_empty()) {
        out.push(format!("📍 {address}"));
    }
    out.push(String::new());

    out.push("📦 ITEMS".to_string());
    out.push("────────".to_string());
    if order.items.is_empty() {
        out.push(DASH.to_string());
    } else {
        out.extend(items_table(order));
    }

    if let Some(note) = order.note.as_deref().filter(|n| !n.is_empty()) {
        out.push(String::new());
        out.push("📝 NOTE".to_string());
        out.push("──────".to_string());
        out.push(note.to_string());
    }

    out.join("\n")
}

struct Row {
    item: String,
    quantity: String,
    unit: String,
    subtotal: String,
}

fn items_table(order: &Order) -> Vec<String> {
    let rows: Vec<Row> = order
        .items
        .iter()
        .map(|item| {
            let meta = [item.size.as_deref(), item.color.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            let title = if item.title.is_empty() { item.sku.clone() } else { item.title.clone() };
            let item_label = if meta.is_empty() { title } else { format!("{title} ({meta})") };

            Row {
                item: item_label,
                quantity: item.quantity.to_string(),
                unit: format_optional_inr(item.unit_price),
                subtotal: format_inr(item.subtotal().unwrap_or(0)),
            }
        })
        .collect();

    let widest = |f: fn(&Row) -> &str| rows.iter().map(|r| f(r).chars().count()).max().unwrap_or(0);
    let item_w = widest(|r| r.item.as_str()).clamp(10, 36);
    let qty_w = widest(|r| r.quantity.as_str()).max(3);
    let unit_w = widest(|r| r.unit.as_str()).max(5);
    let sub_w = widest(|r| r.subtotal.as_str()).max(7);

    let header = format!("{:<item_w$} │ {:^qty_w$} │ {:>unit_w$} │ {:>sub_w$}", "Item", "Qty", "Unit", "Subtotal");
    let rule = "─".repeat(header.chars().count());
    let total = order.total().unwrap_or(0);

    let mut lines = Vec::with_capacity(rows.len() + 4);
    lines.push(header);
    lines.push(rule.clone());
    for row in &rows {
        lines.push(format!(
            "{:<item_w$} │ {:^qty_w$} │ {:>unit_w$} │ {:>sub_w$}",
            row.item, row.quantity, row.unit, row.subtotal
        ));
    }
    lines.push(rule);
    lines.push(format!("{:<item_w$} │ {:^qty_w$} │ {:>unit_w$} │ {:>sub_w$}", "TOTAL", "", "", format_inr(total)));
    lines
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::domain::{CartLine, Customer, OrderItem};

    fn sample_order() -> Order {
        Order {
            id: "BTQ-00000001".to_string(),
            status: OrderStatus::Preparing,
            customer: Customer {
                name: "Asha Rao".to_string(),
                phone: "9876543210".to_string(),
                email: None,
                address: Some("12 MG Road".to_string()),
            },
            fulfillment_date: NaiveDate::from_ymd_opt(2024, 5, 3),
            note: Some("Gift wrap".to_string()),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap(),
            items: vec![
                OrderItem {
                    sku: "SKU-1".to_string(),
                    title: "Skirt".to_string(),
                    size: Some("S".to_string()),
                    color: Some("Black".to_string()),
                    quantity: 2,
                    unit_price: Some(1200),
                },
                OrderItem {
                    sku: "SKU-9".to_string(),
                    title: String::new(),
                    size: None,
                    color: None,
                    quantity: 1,
                    unit_price: None,
                },
            ],
        }
    }

    #[test]
    fn inr_uses_indian_grouping() {
        assert_eq!(format_inr(0), "₹0");
        assert_eq!(format_inr(999), "₹999");
        assert_eq!(format_inr(1000), "₹1,000");
        assert_eq!(format_inr(12_345), "₹12,345");
        assert_eq!(format_inr(123_456), "₹1,23,456");
        assert_eq!(format_inr(1_234_567), "₹12,34,567");
        assert_eq!(format_inr(-98_765_432), "-₹9,87,65,432");
    }

    #[test]
    fn unknown_amount_is_a_dash() {
        assert_eq!(format_optional_inr(None), "—");
        assert_eq!(format_optional_inr(Some(50)), "₹50");
    }

    #[test]
    fn badge_tracks_progress() {
        assert_eq!(status_badge(OrderStatus::Pending), ("⏳ Pending".to_string(), "[⏺○○○○]".to_string()));
        assert_eq!(status_badge(OrderStatus::Delivered).1, "[●●●●⏺]");
        assert_eq!(status_badge(OrderStatus::Cancelled), ("❌ Cancelled".to_string(), "[✖]".to_string()));
    }

    #[test]
    fn cart_review_lists_each_line() {
        let mut cart = Cart::default();
        assert_eq!(cart_review_text(&cart), EMPTY_CART);

        cart.add(CartLine { item_id: "m1".into(), title: "Masala Dosa".into(), unit_price: 80, quantity: 2 });
        cart.add(CartLine { item_id: "m2".into(), title: "Filter Coffee".into(), unit_price: 30, quantity: 1 });

        assert_eq!(cart_review_text(&cart), "Masala Dosa x 2 – ₹160\nFilter Coffee x 1 – ₹30");
    }

    #[test]
    fn summary_sections_appear_in_order() {
        let text = format_order_summary(&sample_order());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "🧾 ORDER BTQ-00000001");
        assert_eq!(lines[1].chars().count(), lines[0].chars().count());
        assert!(lines[1].chars().all(|c| c == '═'));
        assert_eq!(lines[2], "🧑‍🍳 Preparing  [●●⏺○○]");
        assert_eq!(lines[3], "🕒 Created: 2024-05-01 10:30");
        assert_eq!(lines[4], "📅 Fulfillment: 2024-05-03");
        assert_eq!(lines[6], "👤 CUSTOMER");
        assert_eq!(lines[8], "Asha Rao");
        assert_eq!(lines[9], "📞 9876543210");
        assert_eq!(lines[10], "📍 12 MG Road");
        assert_eq!(lines[12], "📦 ITEMS");
        assert!(text.ends_with("📝 NOTE\n──────\nGift wrap"));
    }

    #[test]
    fn items_table_columns_and_total() {
        let text = format_order_summary(&sample_order());

        assert!(text.contains("Item            │ Qty │   Unit │ Subtotal"));
        assert!(text.contains("Skirt (S Black) │  2  │ ₹1,200 │  ₹2,400"));
        assert!(text.contains("SKU-9           │  1  │      — │      ₹0"));
        assert!(text.contains("TOTAL           │     │        │  ₹2,400"));
    }

    #[test]
    fn items_table_total_saturates() {
        let mut order = sample_order();
        for item in &mut order.items {
            item.quantity = 1;
            item.unit_price = Some(Rupees::MAX);
        }

        let text = format_order_summary(&order);
        let total_line = text.lines().find(|line| line.starts_with("TOTAL")).unwrap();
        assert!(total_line.ends_with("₹92,23,37,20,36,85,47,75,807"));
    }

    #[test]
    fn order_without_items_shows_dash() {
        let mut order = sample_order();
        order.items.clear();
        order.note = None;

        assert!(format_order_summary(&order).ends_with("📦 ITEMS\n────────\n—"));
    }
}
