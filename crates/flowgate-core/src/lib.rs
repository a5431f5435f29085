//! Flowgate dispatcher.
//!
//! Turns a decrypted Flow request into the payload the client renders next.
//! The crate performs no I/O of its own: every read and write goes through a
//! [`DataProvider`], and the time and randomness that providers need come
//! from an [`Environment`].
//!
//! # Architecture
//!
//! ```text
//! FlowRequest ──► FlowDispatcher ──► route table ──► handler ──► ResponsePayload
//!                                                       │
//!                                                       ▼
//!                                                  DataProvider
//! ```
//!
//! # Components
//!
//! - [`FlowDispatcher`]: routing and soft-error policy
//! - [`DataProvider`]: business data operations
//! - [`inputs`]: typed extraction of form values
//! - [`summary`]: human-readable order and cart text

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod convert;
pub mod dispatcher;
pub mod domain;
pub mod env;
pub mod error;
mod handlers;
pub mod inputs;
pub mod provider;
pub mod summary;

pub use dispatcher::{DispatcherConfig, FlowDispatcher, Route};
pub use domain::{
    Cart, CartAddition, CartKey, CartLine, Category, Customer, DiningTable, DraftLine, Inventory,
    InventoryAction, MenuItem, Order, OrderDraft, OrderItem, OrderStatus, Rupees, Variant,
};
pub use env::{Environment, new_order_id};
pub use error::{DispatchError, GENERIC_FAILURE};
pub use provider::{DataProvider, ProviderError};
