mod common;

use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use catalog_faas::CatalogError;
use catalog_faas::catalog::CatalogItem;
use catalog_faas::schema::{KEYSPACE, TABLE};
use common::setup_service;

fn item(item_id: i32, name: &str, description: Option<&str>, price: &str) -> CatalogItem {
    CatalogItem {
        item_id,
        name: name.to_string(),
        description: description.map(str::to_string),
        price: Decimal::from_str(price).unwrap(),
    }
}

#[tokio::test]
async fn test_add_then_get_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let (service, _store) = setup_service();
    service.bootstrapper().create_schema().await?;

    let written = service
        .repository()
        .add_item(item(1, "Lamp", Some("Desk lamp"), "9.99"))
        .await?;
    assert!(written.query.starts_with("INSERT INTO shopping.catalog"));

    let read = service.repository().get_item(1).await?;
    assert_eq!(read.item_id, 1);
    assert_eq!(read.name, "Lamp");
    assert_eq!(read.description.as_deref(), Some("Desk lamp"));
    assert_eq!(read.price.to_string(), "9.99");
    assert!(read.query.starts_with("SELECT name, description, price FROM shopping.catalog"));
    Ok(())
}

#[tokio::test]
async fn test_upsert_last_write_wins() -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = setup_service();
    service.bootstrapper().create_schema().await?;

    service.repository().add_item(item(1, "A", Some("d"), "9.99")).await?;
    service.repository().add_item(item(1, "B", Some("e"), "1.00")).await?;

    let read = service.repository().get_item(1).await?;
    assert_eq!(read.name, "B");
    assert_eq!(read.description.as_deref(), Some("e"));
    assert_eq!(read.price.to_string(), "1.00");
    assert_eq!(store.row_count(KEYSPACE, TABLE), 1);
    Ok(())
}

#[tokio::test]
async fn test_replayed_write_leaves_same_row() -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = setup_service();
    service.bootstrapper().create_schema().await?;

    let lamp = item(3, "Lamp", None, "12.50");
    let first = service.repository().add_item(lamp.clone()).await?;
    let second = service.repository().add_item(lamp).await?;

    assert_eq!(first, second);
    assert_eq!(store.row_count(KEYSPACE, TABLE), 1);
    assert_eq!(service.repository().get_item(3).await?.description, None);
    Ok(())
}

#[tokio::test]
async fn test_writes_are_flagged_idempotent() -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = setup_service();
    service.bootstrapper().create_schema().await?;
    service.repository().add_item(item(5, "Cup", None, "2")).await?;

    let writes: Vec<_> = store
        .executed_statements()
        .into_iter()
        .filter(|statement| statement.text.starts_with("INSERT"))
        .collect();
    assert_eq!(writes.len(), 1);
    assert!(writes[0].idempotent);
    Ok(())
}

#[tokio::test]
async fn test_missing_item_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let (service, _store) = setup_service();
    service.bootstrapper().create_schema().await?;

    let err = service.repository().get_item(404).await.unwrap_err();
    assert!(matches!(err, CatalogError::NotFound(404)));
    assert_eq!(err.status_code(), 404);
    Ok(())
}

#[tokio::test]
async fn test_write_without_schema_fails() {
    let (service, _store) = setup_service();

    let err = service
        .repository()
        .add_item(item(1, "Lamp", None, "1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Query(_)));
}

#[tokio::test]
async fn test_price_precision_is_kept() -> Result<(), Box<dyn std::error::Error>> {
    let (service, _store) = setup_service();
    service.bootstrapper().create_schema().await?;

    service
        .repository()
        .add_item(item(9, "Bolt", None, "0.000000000123456789"))
        .await?;
    let read = service.repository().get_item(9).await?;
    assert_eq!(read.price.to_string(), "0.000000000123456789");
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_with_distinct_ids() -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = setup_service();
    service.bootstrapper().create_schema().await?;

    let mut handles = Vec::new();
    for id in 0..32 {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service
                .repository()
                .add_item(item(id, &format!("item-{id}"), None, "1.50"))
                .await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(store.row_count(KEYSPACE, TABLE), 32);
    for id in 0..32 {
        assert_eq!(service.repository().get_item(id).await?.name, format!("item-{id}"));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes_to_same_id() -> Result<(), Box<dyn std::error::Error>> {
    let (service, store) = setup_service();
    service.bootstrapper().create_schema().await?;

    let names: Vec<String> = (0..16).map(|n| format!("writer-{n}")).collect();
    let mut handles = Vec::new();
    for name in names.clone() {
        let service = Arc::clone(&service);
        handles.push(tokio::spawn(async move {
            service.repository().add_item(item(7, &name, None, "3.00")).await
        }));
    }
    for handle in handles {
        handle.await??;
    }

    // One row, holding exactly one of the submitted values
    assert_eq!(store.row_count(KEYSPACE, TABLE), 1);
    let read = service.repository().get_item(7).await?;
    assert!(names.contains(&read.name));
    Ok(())
}
