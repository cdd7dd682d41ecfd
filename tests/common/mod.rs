use std::sync::Arc;
use tokio::net::TcpListener;

use catalog_faas::config::{ConnectionSettings, Platform};
use catalog_faas::server;
use catalog_faas::service::CatalogService;
use catalog_faas::session::{MemoryConnector, MemoryStore, SessionManager};

pub const LOCAL_DC: &str = "datacenter1";

pub type TestService = CatalogService<MemoryConnector>;

#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    pub store: MemoryStore,
    pub service: Arc<TestService>,
    pub server_handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    #[allow(dead_code)]
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    #[allow(dead_code)]
    pub fn abort(self) {
        self.server_handle.abort();
    }
}

pub fn settings() -> ConnectionSettings {
    ConnectionSettings::resolve(Some("127.0.0.1"), Some(LOCAL_DC)).unwrap()
}

/// A store that knows only the local data center
pub fn store() -> MemoryStore {
    MemoryStore::new([LOCAL_DC])
}

pub fn sessions(connector: MemoryConnector) -> Arc<SessionManager<MemoryConnector>> {
    Arc::new(SessionManager::new(connector, settings()))
}

/// Service over a fresh in-memory store
#[allow(dead_code)]
pub fn setup_service() -> (Arc<TestService>, MemoryStore) {
    let store = store();
    let service = Arc::new(CatalogService::new(sessions(MemoryConnector::new(store.clone()))));
    (service, store)
}

/// Serve the given platform's routes on an ephemeral port
#[allow(dead_code)]
pub async fn setup_test_server(platform: Platform) -> TestServer {
    let (service, store) = setup_service();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let served = Arc::clone(&service);
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::serve(served, platform, listener).await {
            eprintln!("Server error: {}", e);
        }
    });

    TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        store,
        service,
        server_handle,
    }
}
