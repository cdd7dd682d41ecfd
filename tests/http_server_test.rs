mod common;

use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use catalog_faas::config::Platform;
use catalog_faas::schema::{KEYSPACE, TABLE};
use common::setup_test_server;

#[tokio::test]
async fn test_gcp_routes() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server(Platform::Gcp).await;
    let client = reqwest::Client::new();

    let response = client.post(server.url("/createCatalog")).send().await?;
    assert_eq!(response.status().as_u16(), 200);
    let message: Value = response.json().await?;
    assert_eq!(message, json!("Successfully created shopping.catalog schema"));

    let response = client
        .post(server.url("/addItem"))
        .json(&json!({"item_id": 12, "name": "Chair", "description": "Oak", "price": 49.90}))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let added: Value = response.json().await?;
    assert_eq!(added["item_id"], 12);
    assert_eq!(added["price"], "49.9");

    let response = client.get(server.url("/getItem/12")).send().await?;
    assert_eq!(response.status().as_u16(), 200);
    let item: Value = response.json().await?;
    assert_eq!(item["name"], "Chair");
    assert_eq!(item["description"], "Oak");

    let response = client.get(server.url("/getItem/13")).send().await?;
    assert_eq!(response.status().as_u16(), 404);

    let response = client.get(server.url("/getItem/latest")).send().await?;
    assert_eq!(response.status().as_u16(), 400);

    // Negative ids keep their sign
    for (item_id, name) in [(5, "five"), (-5, "minus five")] {
        let response = client
            .post(server.url("/addItem"))
            .json(&json!({"item_id": item_id, "name": name, "price": "1"}))
            .send()
            .await?;
        assert_eq!(response.status().as_u16(), 200);
    }
    let response = client.get(server.url("/getItem/-5")).send().await?;
    assert_eq!(response.status().as_u16(), 200);
    let item: Value = response.json().await?;
    assert_eq!(item["item_id"], -5);
    assert_eq!(item["name"], "minus five");

    let response = client
        .post(server.url("/addItem"))
        .body("{broken")
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 400);

    assert_eq!(server.store.row_count(KEYSPACE, TABLE), 3);
    server.abort();
    Ok(())
}

#[tokio::test]
async fn test_azure_custom_handler() -> Result<(), Box<dyn std::error::Error>> {
    let server = setup_test_server(Platform::Azure).await;
    let client = reqwest::Client::new();

    let invoke = |req: Value| json!({"Data": {"req": req}, "Metadata": {}});

    let response = client
        .post(server.url("/createCatalog"))
        .json(&invoke(json!({"Method": "POST"})))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 200);
    let created: Value = response.json().await?;
    assert_eq!(created["Outputs"]["res"]["statusCode"], 200);
    assert_eq!(
        created["Outputs"]["res"]["body"],
        "Successfully created shopping.catalog schema"
    );
    let expected_log = format!(
        "Container instance {} handling createCatalog",
        server.service.instance_id()
    );
    assert_eq!(created["Logs"], json!([expected_log]));

    let response = client
        .post(server.url("/addItem"))
        .json(&invoke(json!({
            "Method": "POST",
            "Body": "{\"item_id\": 3, \"name\": \"Desk\", \"price\": \"120\"}"
        })))
        .send()
        .await?;
    let added: Value = response.json().await?;
    assert_eq!(added["Outputs"]["res"]["statusCode"], 200);

    let response = client
        .post(server.url("/getItem"))
        .json(&invoke(json!({"Method": "GET", "Params": {"id": "3"}})))
        .send()
        .await?;
    let fetched: Value = response.json().await?;
    let output = &fetched["Outputs"]["res"];
    assert_eq!(output["statusCode"], 200);
    let item: Value = serde_json::from_str(output["body"].as_str().unwrap())?;
    assert_eq!(item["name"], "Desk");
    assert_eq!(item["description"], Value::Null);

    let response = client
        .post(server.url("/getItem"))
        .json(&invoke(json!({"Method": "GET", "Params": {"id": "4"}})))
        .send()
        .await?;
    let missing: Value = response.json().await?;
    assert_eq!(missing["Outputs"]["res"]["statusCode"], 404);

    let response = client
        .post(server.url("/deleteItem"))
        .json(&invoke(json!({})))
        .send()
        .await?;
    assert_eq!(response.status().as_u16(), 404);

    server.abort();
    Ok(())
}
