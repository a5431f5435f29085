//! Flowgate server binary.
//!
//! # Usage
//!
//! ```bash
//! # Development: in-memory store seeded from the example catalog
//! flowgate-server --private-key private.pem --catalog catalog.example.json
//!
//! # Production: durable store, encrypted key, webhook verification
//! FLOWGATE_KEY_PASSPHRASE=... flowgate-server --bind 0.0.0.0:8080 \
//!     --private-key /etc/flowgate/private.pem --store redb --db-path /var/lib/flowgate/flowgate.redb \
//!     --verify-token "$VERIFY_TOKEN"
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use flowgate_core::DispatcherConfig;
use flowgate_server::{GatewayConfig, Server, ServerRuntimeConfig, StoreKind};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Storage backend choice.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreArg {
    /// In-process, lost on restart
    Memory,
    /// Redb database file
    Redb,
}

/// Encrypted Flow exchange gateway
#[derive(Parser, Debug)]
#[command(name = "flowgate-server")]
#[command(about = "Encrypted Flow exchange gateway")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, env = "FLOWGATE_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Path to the RSA private key (PEM format)
    #[arg(short = 'k', long, env = "FLOWGATE_PRIVATE_KEY")]
    private_key: PathBuf,

    /// Passphrase of an encrypted private key
    #[arg(long, env = "FLOWGATE_KEY_PASSPHRASE", hide_env_values = true)]
    key_passphrase: Option<String>,

    /// Storage backend
    #[arg(long, env = "FLOWGATE_STORE", value_enum, default_value = "memory")]
    store: StoreArg,

    /// Redb database path (with `--store redb`)
    #[arg(long, env = "FLOWGATE_DB_PATH", default_value = "flowgate.redb")]
    db_path: PathBuf,

    /// Catalog seed file (JSON)
    #[arg(long, env = "FLOWGATE_CATALOG")]
    catalog: Option<PathBuf>,

    /// Token expected in webhook subscription checks
    #[arg(long, env = "FLOWGATE_VERIFY_TOKEN", default_value = "", hide_env_values = true)]
    verify_token: String,

    /// Deadline for one data provider call, in milliseconds
    #[arg(long, default_value = "5000")]
    provider_timeout_ms: u64,

    /// How long webhook message ids are remembered, in seconds
    #[arg(long, default_value = "86400")]
    seen_ttl_secs: u64,

    /// Maximum number of remembered webhook message ids
    #[arg(long, default_value = "10000")]
    seen_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Flowgate server starting");
    tracing::info!("Binding to {}", args.bind);

    let store = match args.store {
        StoreArg::Memory => {
            tracing::warn!("Using in-memory store - data is lost on restart");
            StoreKind::Memory
        },
        StoreArg::Redb => StoreKind::Redb(args.db_path),
    };

    let config = ServerRuntimeConfig {
        bind_address: args.bind,
        private_key_path: args.private_key,
        key_passphrase: args.key_passphrase,
        store,
        catalog_path: args.catalog,
        gateway: GatewayConfig {
            verify_token: args.verify_token,
            dispatcher: DispatcherConfig { provider_timeout: Duration::from_millis(args.provider_timeout_ms) },
            seen_capacity: args.seen_capacity,
            seen_ttl: Duration::from_secs(args.seen_ttl_secs),
        },
    };

    let server = Server::bind(config).await?;
    tracing::info!("Server listening on {}", server.local_addr()?);

    server.run().await?;

    Ok(())
}
