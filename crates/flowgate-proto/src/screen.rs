//! Closed set of Flow screens.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// A named step of the Flow UI.
///
/// The client rejects screens it does not know, so this set is closed and
/// every navigating response names one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenId {
    /// Entry menu: choose between orders and inventory
    ChooseNav,
    /// Order list with status filter
    ViewOrder,
    /// Single order summary
    ViewOrderDetails,
    /// Stock management
    ManageInventory,
    /// Staff-side order entry
    NewOrder,
    /// Dining table picker
    SelectTable,
    /// Menu browsing and cart building
    AddItems,
    /// Cart review before confirmation
    ReviewOrder,
    /// Terminal confirmation screen
    OrderConfirmed,
}

impl ScreenId {
    /// Screen answered when the request names none or an unknown one.
    pub const ENTRY: Self = Self::ChooseNav;

    /// Every screen, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::ChooseNav,
        Self::ViewOrder,
        Self::ViewOrderDetails,
        Self::ManageInventory,
        Self::NewOrder,
        Self::SelectTable,
        Self::AddItems,
        Self::ReviewOrder,
        Self::OrderConfirmed,
    ];

    /// Wire name of the screen.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChooseNav => "CHOOSE_NAV",
            Self::ViewOrder => "VIEW_ORDER",
            Self::ViewOrderDetails => "VIEW_ORDER_DETAILS",
            Self::ManageInventory => "MANAGE_INVENTORY",
            Self::NewOrder => "NEW_ORDER",
            Self::SelectTable => "SELECT_TABLE",
            Self::AddItems => "ADD_ITEMS",
            Self::ReviewOrder => "REVIEW_ORDER",
            Self::OrderConfirmed => "ORDER_CONFIRMED",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScreenId {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|screen| screen.as_str() == s)
            .ok_or_else(|| ProtocolError::UnknownScreen(s.to_string()))
    }
}
