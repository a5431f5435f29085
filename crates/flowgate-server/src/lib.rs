//! Flowgate production server.
//!
//! HTTP gateway using axum for transport, Tokio for the async runtime, and a
//! memory or Redb store behind the [`flowgate_core`] dispatcher.
//!
//! # Architecture
//!
//! This crate is the I/O shell around [`flowgate_core`] and
//! [`flowgate_crypto`]. The dispatcher and codec perform no I/O; [`Server`]
//! owns the listener, the key and the store, and runs one independent
//! decrypt, dispatch, encrypt pipeline per request.
//!
//! # Components
//!
//! - [`Server`]: binds the listener and serves the router
//! - [`FlowGateway`]: the encrypted exchange pipeline
//! - [`StoreProvider`]: business rules over a [`Store`]
//! - [`SeenCache`]: webhook message deduplication
//! - [`SystemEnv`]: production environment (wall clock, OS RNG)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
pub mod dedup;
mod error;
mod gateway;
pub mod provider;
mod routes;
pub mod storage;
mod system_env;
pub mod webhook;

use std::{net::SocketAddr, sync::Arc};

use axum::Router;
pub use config::{GatewayConfig, ServerRuntimeConfig, StoreKind};
pub use dedup::SeenCache;
pub use error::{GatewayError, ServerError};
use flowgate_core::{DataProvider, FlowDispatcher};
use flowgate_crypto::{FlowCodec, ServerKey};
pub use gateway::FlowGateway;
pub use provider::StoreProvider;
pub use routes::{AppState, router};
pub use storage::{Catalog, ChaoticStore, MemoryStore, RedbStore, StorageError, Store};
pub use system_env::SystemEnv;
use tokio::net::TcpListener;

/// Production Flowgate server.
pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Load the key and store named in `config`, then bind.
    pub async fn bind(config: ServerRuntimeConfig) -> Result<Self, ServerError> {
        let pem = tokio::fs::read_to_string(&config.private_key_path).await.map_err(|e| {
            ServerError::Config(format!("cannot read private key {}: {e}", config.private_key_path.display()))
        })?;
        let key = ServerKey::from_pem(&pem, config.key_passphrase.as_deref())?;
        tracing::info!(bits = key.bits(), "private key loaded");

        let catalog = match &config.catalog_path {
            Some(path) => Some(Catalog::load(path).await?),
            None => None,
        };
        let store = config.store;
        let provider = tokio::task::spawn_blocking(move || open_provider(&store, catalog.as_ref()))
            .await
            .map_err(|e| ServerError::Transport(format!("store start-up task failed: {e}")))??;

        Self::bind_with(&config.bind_address, key, provider, config.gateway).await
    }

    /// Bind with an already loaded key and provider.
    pub async fn bind_with(
        bind_address: &str,
        key: ServerKey,
        provider: Arc<dyn DataProvider>,
        config: GatewayConfig,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(bind_address)
            .await
            .map_err(|e| ServerError::Transport(format!("cannot bind {bind_address}: {e}")))?;

        let dispatcher = FlowDispatcher::with_config(provider, config.dispatcher);
        let gateway = FlowGateway::new(FlowCodec::new(key), dispatcher);
        let state = AppState::new(gateway, &config.verify_token, SeenCache::new(config.seen_capacity, config.seen_ttl));

        if config.verify_token.is_empty() {
            tracing::warn!("no webhook verify token configured; subscription checks will fail");
        }

        Ok(Self { listener, router: router(state) })
    }

    /// Serve requests until the listener fails.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Server starting on {}", self.local_addr()?);

        axum::serve(self.listener, self.router).await.map_err(|e| ServerError::Transport(e.to_string()))
    }

    /// Local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        Ok(self.listener.local_addr()?)
    }
}

/// Open the configured store, seed it and wrap it in a provider.
fn open_provider(kind: &StoreKind, catalog: Option<&Catalog>) -> Result<Arc<dyn DataProvider>, ServerError> {
    match kind {
        StoreKind::Memory => {
            let store = MemoryStore::new();
            seed(&store, catalog)?;
            Ok(Arc::new(StoreProvider::new(store, SystemEnv::new())))
        },
        StoreKind::Redb(path) => {
            let store = RedbStore::open(path)?;
            seed(&store, catalog)?;
            tracing::info!(path = %path.display(), "redb store opened");
            Ok(Arc::new(StoreProvider::new(store, SystemEnv::new())))
        },
    }
}

fn seed<S: Store>(store: &S, catalog: Option<&Catalog>) -> Result<(), StorageError> {
    match catalog {
        Some(catalog) => {
            store.seed(catalog)?;
            tracing::info!(
                categories = catalog.categories.len(),
                variants = catalog.variants.len(),
                menu_items = catalog.menu_items.len(),
                tables = catalog.tables.len(),
                "catalog seeded"
            );
        },
        None => tracing::warn!("no catalog given; starting with stored data only"),
    }
    Ok(())
}
