//! `SELECT_TABLE`, `ADD_ITEMS`, `REVIEW_ORDER`, `ORDER_CONFIRMED`

use flowgate_proto::{
    CartLineView, ConfirmationData, MenuData, OptionItem, ResponsePayload, ReviewData, ScreenData,
    ScreenId, TablesData,
};

use super::Ctx;
use crate::{
    convert::{cart_line_view, menu_option, table_option},
    domain::{Cart, CartKey, Customer},
    error::DispatchError,
    inputs::{cart_addition, cart_key},
    provider::DataProvider,
    summary::{cart_review_text, format_inr},
};

/// Shown on `ORDER_CONFIRMED` after a cart checkout.
const CONFIRMATION_MESSAGE: &str = "Your order has been placed successfully!";

/// Cart rendered for the client.
pub(super) struct CartView {
    pub(super) lines: Vec<CartLineView>,
    pub(super) review_text: String,
    pub(super) total: String,
}

impl CartView {
    pub(super) fn of(cart: &Cart) -> Self {
        Self {
            lines: cart.lines.iter().map(cart_line_view).collect(),
            review_text: cart_review_text(cart),
            total: format_inr(cart.total()),
        }
    }
}

pub(super) async fn load_cart<P: DataProvider>(ctx: &Ctx<'_, P>, key: &CartKey) -> Result<CartView, DispatchError> {
    let cart = ctx.call("get_cart", ctx.provider().get_cart(key)).await?;
    Ok(CartView::of(&cart))
}

pub(super) async fn table_picker<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let tables = ctx.call("list_tables", ctx.provider().list_tables()).await?;
    Ok(ResponsePayload::navigate(
        ScreenId::SelectTable,
        ScreenData::Tables(TablesData { tables: tables.iter().map(table_option).collect() }),
    ))
}

pub(super) async fn select_table<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    if ctx.data().text(&["selectedTable", "table"]).is_none() {
        return Err(DispatchError::invalid("selectedTable", "Please select a table"));
    }
    let data = menu_data(ctx, None).await?;
    Ok(ResponsePayload::navigate(ScreenId::AddItems, ScreenData::Menu(data)))
}

pub(super) async fn menu<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let data = menu_data(ctx, None).await?;
    Ok(ResponsePayload::navigate(ScreenId::AddItems, ScreenData::Menu(data)))
}

pub(super) async fn search_menu<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let query = ctx.data().text(&["search_query"]);
    let data = menu_data(ctx, query.as_deref()).await?;
    Ok(ResponsePayload::refresh(ScreenData::Menu(data)))
}

pub(super) async fn add_menu_item<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let key = cart_key(ctx.request);
    let outcome = match cart_addition(ctx.data()) {
        Ok(addition) => {
            ctx.call("add_to_cart", ctx.provider().add_to_cart(&key, addition)).await.map_err(DispatchError::from)
        },
        Err(e) => Err(e),
    };

    let mut data = menu_data(ctx, None).await?;
    match outcome {
        Ok(_) => data.message = Some("Item added to cart".to_string()),
        Err(e) => {
            tracing::warn!(cart = %key, error = %e, "menu item not added");
            data.error = Some(e.user_message());
        },
    }

    Ok(ResponsePayload::refresh(ScreenData::Menu(data)))
}

pub(super) async fn review_cart<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let key = cart_key(ctx.request);
    let cart = load_cart(ctx, &key).await?;
    Ok(ResponsePayload::navigate(ScreenId::ReviewOrder, review(&key, cart, None)))
}

pub(super) async fn confirm_cart<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let key = cart_key(ctx.request);
    let customer = Customer {
        name: ctx.data().text(&["customer_name", "name"]).unwrap_or_else(|| key.to_string()),
        phone: ctx.data().text(&["customer_phone", "phone"]).unwrap_or_default(),
        email: None,
        address: None,
    };

    match ctx.call("confirm_cart", ctx.provider().confirm_cart(&key, customer)).await {
        Ok(order) => Ok(ResponsePayload::navigate(
            ScreenId::OrderConfirmed,
            ScreenData::Confirmation(ConfirmationData {
                confirmation_message: CONFIRMATION_MESSAGE.to_string(),
                total: Some(format_inr(order.total().unwrap_or(0))),
                order_id: Some(order.id),
            }),
        )),
        Err(e) => {
            let e = DispatchError::from(e);
            tracing::warn!(cart = %key, error = %e, "cart confirmation rejected");
            let cart = load_cart(ctx, &key).await.unwrap_or_else(|_| CartView::of(&Cart::default()));
            Ok(ResponsePayload::navigate(ScreenId::ReviewOrder, review(&key, cart, Some(e.user_message()))))
        },
    }
}

pub(super) fn confirmation() -> ResponsePayload {
    ResponsePayload::navigate(ScreenId::OrderConfirmed, ScreenData::empty())
}

async fn menu_data<P: DataProvider>(ctx: &Ctx<'_, P>, search: Option<&str>) -> Result<MenuData, DispatchError> {
    let key = cart_key(ctx.request);
    let items = ctx.call("list_menu_items", ctx.provider().list_menu_items(search)).await?;
    let cart = load_cart(ctx, &key).await?;

    Ok(MenuData {
        selected_table: key.to_string(),
        menu_items_filtered: items.iter().map(menu_option).collect::<Vec<OptionItem>>(),
        cart: cart.lines,
        cart_review_text: cart.review_text,
        total: cart.total,
        message: None,
        error: None,
    })
}

fn review(key: &CartKey, cart: CartView, error: Option<String>) -> ScreenData {
    ScreenData::Review(ReviewData {
        selected_table: key.to_string(),
        cart: cart.lines,
        cart_review_text: cart.review_text,
        total: cart.total,
        error,
    })
}
