mod common;

use futures::future::join_all;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

use catalog_faas::config::ConnectionSettings;
use catalog_faas::service::CatalogService;
use catalog_faas::session::MemoryConnector;
use common::{sessions, store};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_callers_share_one_attempt() -> Result<(), Box<dyn std::error::Error>> {
    let connector = MemoryConnector::new(store()).with_delay(Duration::from_millis(50));
    let manager = sessions(connector);

    let mut handles = Vec::new();
    for _ in 0..10 {
        let manager = Arc::clone(&manager);
        handles.push(tokio::spawn(async move { manager.session().await }));
    }
    let mut stores = Vec::new();
    for handle in handles {
        stores.push(handle.await??);
    }

    assert_eq!(manager.connection_attempts(), 1);
    assert!(stores.iter().all(|s| Arc::ptr_eq(s, &stores[0])));
    Ok(())
}

#[tokio::test]
async fn test_outage_costs_one_attempt_per_burst() {
    let connector = MemoryConnector::new(store())
        .failing_first(1)
        .with_delay(Duration::from_millis(50));
    let manager = sessions(connector);

    let results = join_all((0..5).map(|_| manager.session())).await;
    for result in &results {
        let err = result.as_ref().err().unwrap();
        assert_eq!(err.status_code(), 503);
        assert!(err.to_string().contains("All host(s) tried for query failed"));
    }
    assert_eq!(manager.connection_attempts(), 1);

    // The cluster came back; the next invocation reconnects
    manager.connect().await.unwrap();
    assert_eq!(manager.connection_attempts(), 2);
}

#[tokio::test]
async fn test_spawned_connect_is_joined_by_first_request() -> Result<(), Box<dyn std::error::Error>> {
    let connector = MemoryConnector::new(store()).with_delay(Duration::from_millis(30));
    let manager = sessions(connector);

    let background = manager.spawn_connect();
    manager.connect().await?;
    background.await?;

    assert!(manager.is_connected());
    assert_eq!(manager.connection_attempts(), 1);
    Ok(())
}

#[tokio::test]
async fn test_failed_connect_is_retried_by_next_invocation() -> Result<(), Box<dyn std::error::Error>> {
    let connector = MemoryConnector::new(store()).failing_first(2);
    let service = CatalogService::new(sessions(connector));

    let first = service.bootstrapper().create_schema().await.unwrap_err();
    assert_eq!(first.status_code(), 503);
    let second = service.bootstrapper().create_schema().await.unwrap_err();
    assert_eq!(second.status_code(), 503);

    let message = service.bootstrapper().create_schema().await?;
    assert_eq!(message, "Successfully created shopping.catalog schema");
    assert_eq!(service.sessions().connection_attempts(), 3);
    Ok(())
}

#[tokio::test]
async fn test_connected_session_is_reused() -> Result<(), Box<dyn std::error::Error>> {
    let manager = sessions(MemoryConnector::new(store()));
    for _ in 0..5 {
        manager.connect().await?;
    }
    assert_eq!(manager.connection_attempts(), 1);
    Ok(())
}

#[test]
fn test_missing_configuration_fails_before_connecting() {
    let err = ConnectionSettings::resolve(None, Some("dc1")).unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: Environment variable CONTACT_POINTS not set");

    let err = ConnectionSettings::resolve(Some("10.0.0.1"), Some("  ")).unwrap_err();
    assert_eq!(err.to_string(), "Configuration error: Environment variable LOCAL_DC not set");
}

#[tokio::test]
async fn test_no_attempt_until_asked() {
    let manager = sessions(MemoryConnector::new(store()));
    assert!(!manager.is_connected());
    assert_eq!(manager.connection_attempts(), 0);
}
