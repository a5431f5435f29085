//! `MANAGE_INVENTORY`

use flowgate_proto::{InventoryData, OptionItem, ResponsePayload, ScreenData, ScreenId};

use super::Ctx;
use crate::{
    convert::{category_option, variant_option},
    domain::Category,
    error::DispatchError,
    inputs::{inventory_adjustment, selected_category},
    provider::DataProvider,
};

/// Variant options of every category, category by category.
pub(super) async fn variant_options<P: DataProvider>(
    ctx: &Ctx<'_, P>,
    categories: &[Category],
) -> Result<Vec<OptionItem>, DispatchError> {
    let mut items = Vec::new();
    for category in categories {
        items.extend(category_variant_options(ctx, &category.id).await?);
    }
    Ok(items)
}

/// Variant options of one category; empty id yields nothing.
pub(super) async fn category_variant_options<P: DataProvider>(
    ctx: &Ctx<'_, P>,
    category_id: &str,
) -> Result<Vec<OptionItem>, DispatchError> {
    if category_id.is_empty() {
        return Ok(Vec::new());
    }
    let variants =
        ctx.call("list_variants_by_category", ctx.provider().list_variants_by_category(category_id)).await?;
    Ok(variants.iter().map(variant_option).collect())
}

pub(super) async fn overview<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let data = inventory_data(ctx, None).await?;
    Ok(ResponsePayload::navigate(ScreenId::ManageInventory, ScreenData::Inventory(data)))
}

pub(super) async fn filter<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let category = selected_category(ctx.data());
    let data = inventory_data(ctx, category.as_deref()).await?;
    Ok(ResponsePayload::refresh(ScreenData::Inventory(data)))
}

pub(super) async fn adjust<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let outcome = match inventory_adjustment(ctx.data()) {
        Ok((sku, action, quantity)) => ctx
            .call("adjust_inventory", ctx.provider().adjust_inventory(&sku, action, quantity))
            .await
            .map_err(DispatchError::from),
        Err(e) => Err(e),
    };

    let mut data = inventory_data(ctx, selected_category(ctx.data()).as_deref()).await?;
    match outcome {
        Ok(stock) => data.message = Some(format!("Stock for {} is now {}", stock.sku, stock.quantity)),
        Err(e) => {
            tracing::warn!(error = %e, "inventory adjustment rejected");
            data.error = Some(e.user_message());
        },
    }

    Ok(ResponsePayload::refresh(ScreenData::Inventory(data)))
}

async fn inventory_data<P: DataProvider>(
    ctx: &Ctx<'_, P>,
    category: Option<&str>,
) -> Result<InventoryData, DispatchError> {
    let categories = ctx.call("list_categories", ctx.provider().list_categories()).await?;
    let items = match category {
        Some(category_id) => category_variant_options(ctx, category_id).await?,
        None => variant_options(ctx, &categories).await?,
    };

    Ok(InventoryData {
        categories: categories.iter().map(category_option).collect(),
        items,
        message: None,
        error: None,
    })
}
