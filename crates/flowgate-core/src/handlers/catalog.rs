//! `NEW_ORDER`

use flowgate_proto::{ConfirmationData, NewOrderData, ResponsePayload, ScreenData, ScreenId};

use super::{
    Ctx,
    dining::{CartView, load_cart},
    inventory::category_variant_options,
};
use crate::{
    convert::category_option,
    error::DispatchError,
    inputs::{cart_addition, cart_key, order_draft, selected_category},
    provider::DataProvider,
    summary::format_optional_inr,
};

pub(super) async fn new_order_form<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let data = form_data(ctx).await?;
    Ok(ResponsePayload::navigate(ScreenId::NewOrder, ScreenData::NewOrder(data)))
}

pub(super) async fn filter_catalog<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let data = form_data(ctx).await?;
    Ok(ResponsePayload::refresh(ScreenData::NewOrder(data)))
}

pub(super) async fn add_catalog_item<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let key = cart_key(ctx.request);
    let outcome = match cart_addition(ctx.data()) {
        Ok(addition) => {
            ctx.call("add_to_cart", ctx.provider().add_to_cart(&key, addition)).await.map_err(DispatchError::from)
        },
        Err(e) => Err(e),
    };

    let mut data = form_data(ctx).await?;
    match outcome {
        Ok(_) => data.message = Some("Item added to cart".to_string()),
        Err(e) => {
            tracing::warn!(cart = %key, error = %e, "catalog item not added");
            data.error = Some(e.user_message());
        },
    }

    Ok(ResponsePayload::refresh(ScreenData::NewOrder(data)))
}

pub(super) async fn create_order<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let outcome = match order_draft(ctx.data()) {
        Ok(draft) => ctx.call("create_order", ctx.provider().create_order(draft)).await.map_err(DispatchError::from),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(order) => Ok(ResponsePayload::navigate(
            ScreenId::OrderConfirmed,
            ScreenData::Confirmation(ConfirmationData {
                confirmation_message: format!("Order {} has been created.", order.id),
                total: Some(format_optional_inr(order.total())),
                order_id: Some(order.id),
            }),
        )),
        Err(e) => {
            tracing::warn!(error = %e, "order creation rejected");
            let mut data = form_data(ctx).await?;
            data.error = Some(e.user_message());
            Ok(ResponsePayload::refresh(ScreenData::NewOrder(data)))
        },
    }
}

/// Categories, the variants of the selected category, and this flow's cart.
async fn form_data<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<NewOrderData, DispatchError> {
    let categories = ctx.call("list_categories", ctx.provider().list_categories()).await?;
    let variant_options = match selected_category(ctx.data()) {
        Some(category_id) => category_variant_options(ctx, &category_id).await?,
        None => Vec::new(),
    };
    let CartView { lines, review_text, total } = load_cart(ctx, &cart_key(ctx.request)).await?;

    Ok(NewOrderData {
        categories: categories.iter().map(category_option).collect(),
        variant_options,
        cart: lines,
        cart_review_text: review_text,
        total,
        message: None,
        error: None,
    })
}
