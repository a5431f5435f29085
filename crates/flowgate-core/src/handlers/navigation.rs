//! `CHOOSE_NAV`

use flowgate_proto::{NavigationData, ResponsePayload, ScreenData, ScreenId};

use super::{Ctx, inventory, orders};
use crate::{
    convert::{category_option, status_options},
    error::DispatchError,
    provider::DataProvider,
};

pub(super) async fn choose_nav<P: DataProvider>(ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    let categories = ctx.call("list_categories", ctx.provider().list_categories()).await?;
    let items = inventory::variant_options(ctx, &categories).await?;
    let orders = orders::newest_first(ctx, None).await?;

    Ok(ResponsePayload::navigate(
        ScreenId::ChooseNav,
        ScreenData::Navigation(NavigationData {
            categories: categories.iter().map(category_option).collect(),
            items,
            orders,
            statuses: status_options(),
        }),
    ))
}
