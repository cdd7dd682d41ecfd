use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::adapters::azure::{self, InvokeRequest};
use crate::adapters::{Operation, Outcome, gcp};
use crate::config::Platform;
use crate::service::CatalogService;
use crate::session::Connector;
use crate::{CatalogError, Result};

type SharedService<C> = Arc<CatalogService<C>>;

/// HTTP routes for the given platform convention
pub fn router<C: Connector>(service: SharedService<C>, platform: Platform) -> Router {
    match platform {
        Platform::Gcp => Router::new()
            .route("/createCatalog", get(gcp_create_catalog::<C>).post(gcp_create_catalog::<C>))
            .route("/addItem", post(gcp_add_item::<C>))
            .route("/getItem", get(gcp_get_item::<C>))
            .route("/getItem/{*rest}", get(gcp_get_item::<C>))
            .with_state(service),
        Platform::Azure => Router::new()
            .route("/{function}", post(azure_invoke::<C>))
            .with_state(service),
    }
}

/// Serve until the listener fails; the hosting platform owns shutdown
pub async fn serve<C: Connector>(
    service: SharedService<C>,
    platform: Platform,
    listener: TcpListener,
) -> Result<()> {
    info!(
        "Serving {:?} handlers on {}",
        platform,
        listener.local_addr()?
    );
    axum::serve(listener, router(service, platform)).await?;
    Ok(())
}

fn json_body(body: &[u8]) -> Result<Option<Value>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(body)?))
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn gcp_reply(outcome: &Outcome) -> Response {
    let (code, body) = gcp::to_response(outcome);
    (status(code), Json(body)).into_response()
}

async fn gcp_create_catalog<C: Connector>(State(service): State<SharedService<C>>, uri: Uri) -> Response {
    let invocation = gcp::to_invocation(Operation::CreateCatalog, uri.path(), None);
    gcp_reply(&service.handle(invocation).await)
}

async fn gcp_add_item<C: Connector>(
    State(service): State<SharedService<C>>,
    uri: Uri,
    body: Bytes,
) -> Response {
    let invocation = json_body(&body)
        .and_then(|body| gcp::to_invocation(Operation::AddItem, uri.path(), body.as_ref()));
    gcp_reply(&service.handle(invocation).await)
}

async fn gcp_get_item<C: Connector>(State(service): State<SharedService<C>>, uri: Uri) -> Response {
    let invocation = gcp::to_invocation(Operation::GetItem, uri.path(), None);
    gcp_reply(&service.handle(invocation).await)
}

async fn azure_invoke<C: Connector>(
    State(service): State<SharedService<C>>,
    Path(function): Path<String>,
    body: Bytes,
) -> Response {
    let operation: Operation = match function.parse() {
        Ok(operation) => operation,
        Err(e) => {
            return (StatusCode::NOT_FOUND, Json(Outcome::from_error(&e).body_json())).into_response();
        }
    };

    let invocation = serde_json::from_slice::<InvokeRequest>(&body)
        .map_err(CatalogError::from)
        .and_then(|request| azure::to_invocation(operation, &request));
    let outcome = service.handle(invocation).await;

    // The host always gets 200; the HTTP status travels inside the output binding
    Json(azure::to_response(&outcome, vec![service.invocation_log_line(operation)])).into_response()
}
