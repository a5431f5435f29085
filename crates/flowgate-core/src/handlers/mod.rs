//! Screen handlers.
//!
//! One function per [`Route`]. Handlers receive a [`Ctx`] and return a
//! payload. Business failures they can explain in place (unknown order,
//! empty cart, invalid form) are folded into the payload here; anything else
//! bubbles up as [`DispatchError`] and the dispatcher turns it into a notice.

mod catalog;
mod dining;
mod inventory;
mod navigation;
mod orders;

use std::{future::Future, time::Duration};

use flowgate_proto::{FlowRequest, RequestData, ResponsePayload, ScreenId};

use crate::{
    dispatcher::Route,
    error::DispatchError,
    provider::{DataProvider, ProviderError},
};

/// Per-request handler context.
pub(crate) struct Ctx<'a, P> {
    provider: &'a P,
    timeout: Duration,
    pub(crate) request: &'a FlowRequest,
    pub(crate) screen: ScreenId,
}

impl<'a, P: DataProvider> Ctx<'a, P> {
    pub(crate) fn new(provider: &'a P, timeout: Duration, request: &'a FlowRequest, screen: ScreenId) -> Self {
        Self { provider, timeout, request, screen }
    }

    pub(crate) fn provider(&self) -> &'a P {
        self.provider
    }

    pub(crate) fn data(&self) -> &'a RequestData {
        &self.request.data
    }

    /// Await a provider call under the configured deadline.
    pub(crate) async fn call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ProviderError>>,
    ) -> Result<T, ProviderError> {
        if let Ok(result) = tokio::time::timeout(self.timeout, call).await {
            result
        } else {
            tracing::warn!(operation, timeout = ?self.timeout, screen = %self.screen, "provider call timed out");
            Err(ProviderError::Timeout(self.timeout))
        }
    }
}

pub(crate) async fn run<P: DataProvider>(route: Route, ctx: &Ctx<'_, P>) -> Result<ResponsePayload, DispatchError> {
    match route {
        Route::ChooseNav => navigation::choose_nav(ctx).await,
        Route::OrderList => orders::order_list(ctx).await,
        Route::FilterOrders => orders::filter_orders(ctx).await,
        Route::SelectOrder => orders::select_order(ctx).await,
        Route::OrderDetails => orders::order_details(ctx).await,
        Route::UpdateOrderStatus => orders::update_order_status(ctx).await,
        Route::Inventory => inventory::overview(ctx).await,
        Route::FilterInventory => inventory::filter(ctx).await,
        Route::AdjustInventory => inventory::adjust(ctx).await,
        Route::NewOrderForm => catalog::new_order_form(ctx).await,
        Route::FilterCatalog => catalog::filter_catalog(ctx).await,
        Route::AddCatalogItem => catalog::add_catalog_item(ctx).await,
        Route::CreateOrder => catalog::create_order(ctx).await,
        Route::TablePicker => dining::table_picker(ctx).await,
        Route::SelectTable => dining::select_table(ctx).await,
        Route::Menu => dining::menu(ctx).await,
        Route::SearchMenu => dining::search_menu(ctx).await,
        Route::AddMenuItem => dining::add_menu_item(ctx).await,
        Route::ReviewCart => dining::review_cart(ctx).await,
        Route::ConfirmCart => dining::confirm_cart(ctx).await,
        Route::Confirmation => Ok(dining::confirmation()),
    }
}
