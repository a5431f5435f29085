//! Runtime configuration.

use std::{path::PathBuf, time::Duration};

use flowgate_core::DispatcherConfig;

/// Where business data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// In-process, lost on restart
    Memory,
    /// Redb database file at the given path
    Redb(PathBuf),
}

/// Settings of the exchange and webhook endpoints.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Token expected in the webhook subscription check; empty rejects all
    pub verify_token: String,
    /// Dispatcher tuning (provider timeout)
    pub dispatcher: DispatcherConfig,
    /// Maximum number of remembered webhook message ids
    pub seen_capacity: usize,
    /// How long a webhook message id is remembered
    pub seen_ttl: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            verify_token: String::new(),
            dispatcher: DispatcherConfig::default(),
            seen_capacity: 10_000,
            seen_ttl: Duration::from_secs(24 * 60 * 60),
        }
    }
}

/// Server configuration for the production runtime.
#[derive(Debug, Clone)]
pub struct ServerRuntimeConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080")
    pub bind_address: String,
    /// Path to the RSA private key (PKCS#8 or PKCS#1 PEM)
    pub private_key_path: PathBuf,
    /// Passphrase of an encrypted PKCS#8 key
    pub key_passphrase: Option<String>,
    /// Storage backend
    pub store: StoreKind,
    /// Catalog seed file applied at startup
    pub catalog_path: Option<PathBuf>,
    /// Endpoint settings
    pub gateway: GatewayConfig,
}
