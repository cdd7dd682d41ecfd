use serde_json::Value;

use crate::Result;
use crate::adapters::aws::{self, ApiGatewayRequest};
use crate::adapters::{Operation, event};
use crate::service::CatalogService;
use crate::session::Connector;

/// Route one raw Lambda payload through the matching adapter.
///
/// API Gateway proxy events go through the `aws` adapter; anything else is
/// treated as a direct structured event. `pinned` is the function this
/// deployment serves, when it serves only one.
pub async fn handle_event<C: Connector>(
    service: &CatalogService<C>,
    pinned: Option<Operation>,
    payload: Value,
) -> Result<Value> {
    if ApiGatewayRequest::matches(&payload) {
        let request: ApiGatewayRequest = serde_json::from_value(payload)?;
        let invocation = aws::operation_for(&request, pinned)
            .and_then(|operation| aws::to_invocation(operation, &request));
        let outcome = service.handle(invocation).await;
        return Ok(serde_json::to_value(aws::to_response(&outcome))?);
    }

    let outcome = service.handle(event::to_invocation(&payload, pinned)).await;
    Ok(serde_json::to_value(event::to_response(&outcome))?)
}
