use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use catalog_faas::config::Config;
use catalog_faas::logging::{self, LogFormat};
use catalog_faas::service::CatalogService;
use catalog_faas::session::{ScyllaConnector, SessionManager};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::load();
    logging::init(&config.log_level, LogFormat::Platform);

    info!("catalog-lambda v{}", env!("CARGO_PKG_VERSION"));

    // Missing CONTACT_POINTS / LOCAL_DC stops the container before any network call
    let settings = config.connection_settings().inspect_err(|e| error!("{}", e))?;
    let pinned = config.pinned_operation().inspect_err(|e| error!("{}", e))?;
    if let Some(operation) = pinned {
        info!("Serving {} only", operation);
    }

    // Built once per container and reused by every warm invocation
    let sessions = Arc::new(SessionManager::new(ScyllaConnector, settings));
    sessions.spawn_connect();
    let service = Arc::new(CatalogService::new(sessions));

    run(service_fn(|event: LambdaEvent<Value>| {
        let service = Arc::clone(&service);
        async move {
            catalog_faas::lambda::handle_event(&service, pinned, event.payload)
                .await
                .map_err(Error::from)
        }
    }))
    .await
}
