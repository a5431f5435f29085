//! HTTP surface.
//!
//! | Route | Handler |
//! |---|---|
//! | `POST /flow` | encrypted Flow exchange |
//! | `GET /webhook` | subscription check |
//! | `POST /webhook` | inbound notifications, acknowledged and logged |
//! | `GET /healthz` | liveness |

#![allow(clippy::disallowed_types, reason = "Seen-id cache lock is never held across await")]

use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use serde_json::json;

use crate::{
    dedup::SeenCache,
    gateway::FlowGateway,
    webhook::{Notification, VerifyQuery},
};

/// Shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    gateway: Arc<FlowGateway>,
    verify_token: Arc<str>,
    seen: Arc<Mutex<SeenCache>>,
}

impl AppState {
    /// State for a gateway, webhook verify token and seen-id cache.
    pub fn new(gateway: FlowGateway, verify_token: &str, seen: SeenCache) -> Self {
        Self { gateway: Arc::new(gateway), verify_token: Arc::from(verify_token), seen: Arc::new(Mutex::new(seen)) }
    }
}

/// Router with every route bound to `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/flow", post(flow_exchange))
        .route("/webhook", get(verify_webhook).post(receive_webhook))
        .route("/healthz", get(|| async { "ok" }))
        .with_state(state)
}

async fn flow_exchange(State(state): State<AppState>, body: Bytes) -> Response {
    match state.gateway.exchange(&body).await {
        Ok(sealed) => ([(header::CONTENT_TYPE, "application/octet-stream")], sealed).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn verify_webhook(State(state): State<AppState>, Query(query): Query<VerifyQuery>) -> Response {
    match query.accept(&state.verify_token) {
        Some(challenge) => ([(header::CONTENT_TYPE, "text/plain")], challenge).into_response(),
        None => {
            tracing::warn!(mode = ?query.mode, "webhook verification failed");
            (StatusCode::FORBIDDEN, "Verification failed").into_response()
        },
    }
}

async fn receive_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    let ack = Json(json!({ "status": "received" }));

    let notification = match Notification::from_json(&body) {
        Ok(notification) => notification,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unparseable webhook notification");
            return ack.into_response();
        },
    };

    let fresh = {
        let mut seen = state.seen.lock().unwrap_or_else(PoisonError::into_inner);
        notification.fresh_messages(&mut seen)
    };
    for message in &fresh {
        tracing::info!(
            message_id = message.id.as_deref().unwrap_or_default(),
            sender = message.sender().unwrap_or_default(),
            command = message.command(),
            "webhook message received"
        );
    }

    ack.into_response()
}
