//! Flowgate Wire Schema
//!
//! Typed representation of everything that crosses the encrypted Flow
//! boundary. The crypto layer hands this crate raw plaintext bytes; this crate
//! turns them into a [`FlowRequest`] and turns a [`ResponsePayload`] back into
//! the JSON bytes the client renders.
//!
//! ```text
//! EncryptedEnvelope (base64 JSON)
//!        │  flowgate-crypto
//!        ▼
//! plaintext bytes ──► FlowRequest { action: FlowAction, screen, data }
//!                            │  flowgate-core
//!                            ▼
//!                     ResponsePayload { version, screen?, data: ScreenData }
//!                            │
//!                            ▼
//!                     JSON bytes ──► flowgate-crypto
//! ```
//!
//! # Invariants
//!
//! - Every response carrying a `screen` names a member of [`ScreenId`]
//! - `version` and `action` are mandatory on inbound requests
//! - Responses always carry version [`FLOW_VERSION`]
//! - A response without `screen` is a partial update of the current screen

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod envelope;
pub mod errors;
pub mod payloads;
pub mod request;
pub mod response;
pub mod screen;

pub use envelope::EncryptedEnvelope;
pub use errors::ProtocolError;
pub use payloads::{
    CartLineView, ConfirmationData, EmptyData, HealthData, InventoryData, MenuData,
    NavigationData, NewOrderData, NoticeData, OptionItem, OrderDetailsData, OrderListData,
    ReviewData, ScreenData, TablesData,
};
pub use request::{DecryptedRequest, FlowAction, FlowRequest, RequestData, Trigger};
pub use response::ResponsePayload;
pub use screen::ScreenId;

/// Flow protocol version stamped on every response.
pub const FLOW_VERSION: &str = "3.0";
