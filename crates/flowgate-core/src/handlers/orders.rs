//! `VIEW_ORDER` and `VIEW_ORDER_DETAILS`

use flowgate_proto::{OptionItem, OrderDetailsData, OrderListData, ResponsePayload, ScreenData, ScreenId};

use super::Ctx;
use crate::{
    convert::order_option,
    domain::{Order, OrderStatus},
    error::DispatchError,
    inputs::{StatusFilter, order_id, status_update},
    provider::DataProvider,
    summary::{ORDER_UNAVAILABLE, format_order_summary},
};

/// Orders as options, newest first.
pub(super) async fn newest_first<P: DataProvider>(
    ctx: &Ctx<'_, P>,
    statuses: Option<&[OrderStatus]>,
) -> Result<Vec<OptionItem>, DispatchError> {
    let mut orders = ctx.call("list_orders", ctx.provider().list_orders(statuses)).await?;
    sort_newest_first(&mut orders);
    Ok(orders.iter().map(order_option).collect())
}

/// Newest first; orders created in the same instant sort by id.
fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

pub(super) async fn order_list<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let orders = newest_first(ctx, None).await?;
    Ok(ResponsePayload::navigate(ScreenId::ViewOrder, ScreenData::OrderList(OrderListData { orders })))
}

pub(super) async fn filter_orders<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let filter = StatusFilter::from_data(ctx.data());
    let orders = newest_first(ctx, filter.statuses()).await?;
    Ok(ResponsePayload::refresh(ScreenData::OrderList(OrderListData { orders })))
}

pub(super) async fn select_order<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let Some(id) = order_id(ctx.data()) else {
        return Ok(ResponsePayload::navigate(ScreenId::ViewOrder, ScreenData::empty()));
    };
    Ok(details_page(ctx, &id).await)
}

pub(super) async fn order_details<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let Some(id) = order_id(ctx.data()) else {
        return Ok(ResponsePayload::navigate(ScreenId::ViewOrderDetails, unavailable(None)));
    };
    Ok(details_page(ctx, &id).await)
}

pub(super) async fn update_order_status<P: DataProvider>(
    ctx: &Ctx<'_, P>,
) -> Result<ResponsePayload, DispatchError> {
    let Some(id) = order_id(ctx.data()) else {
        return Ok(ResponsePayload::refresh(unavailable(Some("No order selected".to_string()))));
    };

    let outcome = match status_update(ctx.data()) {
        Ok((status, note)) => ctx
            .call("update_order_status", ctx.provider().update_order_status(&id, status, note))
            .await
            .map_err(DispatchError::from),
        Err(e) => Err(e),
    };

    let data = match outcome {
        Ok(order) => OrderDetailsData {
            order_detail_text: format_order_summary(&order),
            message: Some(format!("Order {} is now {}", order.id, order.status)),
            order_id: Some(order.id),
            error: None,
        },
        Err(e) => {
            tracing::warn!(order_id = %id, error = %e, "order status update rejected");
            let current = ctx.call("get_order", ctx.provider().get_order(&id)).await.ok();
            OrderDetailsData {
                order_detail_text: current
                    .as_ref()
                    .map_or_else(|| ORDER_UNAVAILABLE.to_string(), format_order_summary),
                order_id: current.map(|order| order.id),
                message: None,
                error: Some(e.user_message()),
            }
        },
    };

    Ok(ResponsePayload::refresh(ScreenData::OrderDetails(data)))
}

/// Details screen for one order; lookup failures still navigate, with a
/// placeholder text.
async fn details_page<P: DataProvider>(ctx: &Ctx<'_, P>, id: &str) -> ResponsePayload {
    match ctx.call("get_order", ctx.provider().get_order(id)).await {
        Ok(order) => ResponsePayload::navigate(
            ScreenId::ViewOrderDetails,
            ScreenData::OrderDetails(OrderDetailsData {
                order_detail_text: format_order_summary(&order),
                order_id: Some(order.id),
                message: None,
                error: None,
            }),
        ),
        Err(e) => {
            tracing::warn!(order_id = %id, error = %e, "order details unavailable");
            ResponsePayload::navigate(ScreenId::ViewOrderDetails, unavailable(None))
        },
    }
}

fn unavailable(error: Option<String>) -> ScreenData {
    ScreenData::OrderDetails(OrderDetailsData {
        order_detail_text: ORDER_UNAVAILABLE.to_string(),
        order_id: None,
        message: None,
        error,
    })
}
