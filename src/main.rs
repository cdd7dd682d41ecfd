use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use catalog_faas::config::{Config, ConnectionSettings, Platform};
use catalog_faas::logging::{self, LogFormat};
use catalog_faas::server;
use catalog_faas::service::CatalogService;
use catalog_faas::session::{Connector, MemoryConnector, MemoryStore, ScyllaConnector, SessionManager};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load();

    // Initialize logging
    logging::init(&config.log_level, LogFormat::Terminal);

    // Display version
    info!("catalog-faas v{}", env!("CARGO_PKG_VERSION"));

    // Missing CONTACT_POINTS / LOCAL_DC is fatal before any network call
    let settings = config.connection_settings().inspect_err(|e| error!("{}", e))?;

    let port = config.listen_port();
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!("HTTP server listening on port {}", port);

    if config.in_memory {
        info!("Using in-memory store (for local runs only)");
        let store = MemoryStore::new([settings.local_dc.clone()]);
        run(MemoryConnector::new(store), settings, config.platform, listener).await
    } else {
        info!("Using cluster at {:?}", settings.contact_points);
        run(ScyllaConnector, settings, config.platform, listener).await
    }
}

async fn run<C: Connector>(
    connector: C,
    settings: ConnectionSettings,
    platform: Platform,
    listener: TcpListener,
) -> Result<()> {
    let sessions = Arc::new(SessionManager::new(connector, settings));

    // Connect in the background; early requests join the attempt
    sessions.spawn_connect();

    let service = Arc::new(CatalogService::new(sessions));
    server::serve(service, platform, listener).await?;
    Ok(())
}
