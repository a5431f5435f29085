//! Screen/action/trigger dispatch.
//!
//! Every decrypted request lands here. Routing is a single table from
//! `(screen, trigger)` to a [`Route`], built once when the dispatcher is
//! created:
//!
//! ```text
//! FlowRequest
//!     │
//!     ├── action = ping ───────────────────────────► {status: active}
//!     │
//!     ├── screen unknown ──────────────────────────► CHOOSE_NAV, {}
//!     │
//!     └── (screen, trigger) ──► route table ──┬── hit ──► handler
//!                                             │
//!                   (screen, none) ◄── miss ──┘
//! ```
//!
//! # Invariants
//!
//! - `handle` always returns a payload; handler failures become soft errors
//! - Handlers hold no state; every read and write goes through the provider
//! - Every provider call is bounded by [`DispatcherConfig::provider_timeout`]

use std::{collections::HashMap, time::Duration};

use flowgate_proto::{FlowAction, FlowRequest, ResponsePayload, ScreenData, ScreenId, Trigger};

use crate::{
    error::{DispatchError, GENERIC_FAILURE},
    handlers::{self, Ctx},
    provider::DataProvider,
};

/// Dispatcher tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Deadline for a single data provider call
    pub provider_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { provider_timeout: Duration::from_secs(5) }
    }
}

/// Handler selected for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// `CHOOSE_NAV` load
    ChooseNav,
    /// `VIEW_ORDER` load
    OrderList,
    /// `VIEW_ORDER` + `apply_filter`
    FilterOrders,
    /// `VIEW_ORDER` + `select_order`
    SelectOrder,
    /// `VIEW_ORDER_DETAILS` load
    OrderDetails,
    /// `VIEW_ORDER_DETAILS` + `update_status`
    UpdateOrderStatus,
    /// `MANAGE_INVENTORY` load
    Inventory,
    /// `MANAGE_INVENTORY` + `apply_filter`
    FilterInventory,
    /// `MANAGE_INVENTORY` + `adjust_inventory`
    AdjustInventory,
    /// `NEW_ORDER` load
    NewOrderForm,
    /// `NEW_ORDER` + `filter_menu_items`
    FilterCatalog,
    /// `NEW_ORDER` + `add_item_to_cart`
    AddCatalogItem,
    /// `NEW_ORDER` + `create_order`
    CreateOrder,
    /// `SELECT_TABLE` load
    TablePicker,
    /// `SELECT_TABLE` + `select_table`
    SelectTable,
    /// `ADD_ITEMS` load
    Menu,
    /// `ADD_ITEMS` + `filter_menu_items`
    SearchMenu,
    /// `ADD_ITEMS` + `add_item_to_cart`
    AddMenuItem,
    /// `REVIEW_ORDER` load
    ReviewCart,
    /// `REVIEW_ORDER` + `confirm_order`
    ConfirmCart,
    /// `ORDER_CONFIRMED` load
    Confirmation,
}

type RouteKey = (ScreenId, Option<Trigger>);

fn route_table() -> HashMap<RouteKey, Route> {
    use ScreenId as S;
    use Trigger as T;

    let entries = [
        (S::ChooseNav, None, Route::ChooseNav),
        (S::ViewOrder, None, Route::OrderList),
        (S::ViewOrder, Some(T::ApplyFilter), Route::FilterOrders),
        (S::ViewOrder, Some(T::SelectOrder), Route::SelectOrder),
        (S::ViewOrderDetails, None, Route::OrderDetails),
        (S::ViewOrderDetails, Some(T::UpdateStatus), Route::UpdateOrderStatus),
        (S::ManageInventory, None, Route::Inventory),
        (S::ManageInventory, Some(T::ApplyFilter), Route::FilterInventory),
        (S::ManageInventory, Some(T::AdjustInventory), Route::AdjustInventory),
        (S::NewOrder, None, Route::NewOrderForm),
        (S::NewOrder, Some(T::FilterMenuItems), Route::FilterCatalog),
        (S::NewOrder, Some(T::AddItemToCart), Route::AddCatalogItem),
        (S::NewOrder, Some(T::CreateOrder), Route::CreateOrder),
        (S::SelectTable, None, Route::TablePicker),
        (S::SelectTable, Some(T::SelectTable), Route::SelectTable),
        (S::AddItems, None, Route::Menu),
        (S::AddItems, Some(T::FilterMenuItems), Route::SearchMenu),
        (S::AddItems, Some(T::AddItemToCart), Route::AddMenuItem),
        (S::ReviewOrder, None, Route::ReviewCart),
        (S::ReviewOrder, Some(T::ConfirmOrder), Route::ConfirmCart),
        (S::OrderConfirmed, None, Route::Confirmation),
    ];

    entries.into_iter().map(|(screen, trigger, route)| ((screen, trigger), route)).collect()
}

/// Turns decrypted requests into response payloads.
pub struct FlowDispatcher<P> {
    provider: P,
    config: DispatcherConfig,
    routes: HashMap<RouteKey, Route>,
}

impl<P: DataProvider> FlowDispatcher<P> {
    /// Dispatcher with default configuration.
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, DispatcherConfig::default())
    }

    /// Dispatcher with explicit configuration.
    pub fn with_config(provider: P, config: DispatcherConfig) -> Self {
        Self { provider, config, routes: route_table() }
    }

    /// Underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Active configuration.
    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Route for a screen and trigger, falling back to the screen's load
    /// route when the trigger has none.
    pub fn route(&self, screen: ScreenId, trigger: Option<&Trigger>) -> Option<Route> {
        trigger
            .and_then(|trigger| self.routes.get(&(screen, Some(trigger.clone()))))
            .or_else(|| self.routes.get(&(screen, None)))
            .copied()
    }

    /// Answer one request. Never fails.
    pub async fn handle(&self, request: &FlowRequest) -> ResponsePayload {
        if request.action == FlowAction::Ping {
            return ResponsePayload::health();
        }

        let trigger = request.action.trigger();
        tracing::debug!(
            action = request.action.as_str(),
            screen = request.screen_name().unwrap_or_default(),
            trigger = trigger.map(Trigger::as_str).unwrap_or_default(),
            "dispatching flow request"
        );

        let screen = match request.screen_name().map(str::parse::<ScreenId>) {
            None => ScreenId::ENTRY,
            Some(Ok(screen)) => screen,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "answering unknown screen with entry screen");
                return ResponsePayload::navigate(ScreenId::ENTRY, ScreenData::empty());
            },
        };

        let Some(route) = self.route(screen, trigger) else {
            return ResponsePayload::navigate(screen, ScreenData::empty());
        };

        let ctx = Ctx::new(&self.provider, self.config.provider_timeout, request, screen);
        match handlers::run(route, &ctx).await {
            Ok(payload) => payload,
            Err(e) => soft_failure(screen, trigger, &e),
        }
    }
}

fn soft_failure(screen: ScreenId, trigger: Option<&Trigger>, error: &DispatchError) -> ResponsePayload {
    let trigger = trigger.map(Trigger::as_str).unwrap_or_default();
    if error.is_expected() {
        tracing::warn!(%screen, trigger, %error, "flow request rejected");
        ResponsePayload::notice(error.user_message())
    } else {
        tracing::error!(%screen, trigger, %error, "flow handler failed");
        ResponsePayload::notice(GENERIC_FAILURE)
    }
}
