//! AWS Lambda behind API Gateway (REST proxy or HTTP API payloads).

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::adapters::{Invocation, Operation, Outcome, item_from_json, parse_item_id};
use crate::{CatalogError, Result};

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiGatewayRequest {
    pub http_method: Option<String>,
    pub path: Option<String>,
    /// HTTP API (v2) payloads carry the path here instead of `path`
    pub raw_path: Option<String>,
    pub path_parameters: Option<HashMap<String, String>>,
    pub body: Option<String>,
    pub is_base64_encoded: bool,
    pub request_context: Option<Value>,
}

impl ApiGatewayRequest {
    /// Whether a raw Lambda event looks like it came through API Gateway
    pub fn matches(event: &Value) -> bool {
        event.get("httpMethod").is_some() || event.get("requestContext").is_some()
    }

    /// HTTP method from a REST payload or from `requestContext.http.method` (HTTP API v2)
    pub fn method(&self) -> Option<String> {
        self.http_method
            .clone()
            .or_else(|| {
                self.request_context
                    .as_ref()?
                    .pointer("/http/method")?
                    .as_str()
                    .map(str::to_string)
            })
            .map(|method| method.to_ascii_uppercase())
    }

    /// First path segment that names a function, e.g. `addItem` in `/prod/addItem`
    pub fn path_operation(&self) -> Option<Operation> {
        self.path
            .as_deref()
            .or(self.raw_path.as_deref())?
            .split('/')
            .find_map(|segment| segment.parse().ok())
    }

    /// Request body as text, undoing API Gateway's base64 wrapping
    pub fn body_text(&self) -> Result<Option<String>> {
        let Some(body) = self.body.as_deref() else {
            return Ok(None);
        };
        if !self.is_base64_encoded {
            return Ok(Some(body.to_string()));
        }
        let bytes = STANDARD
            .decode(body)
            .map_err(|e| CatalogError::InvalidParameter(format!("body is not valid base64: {e}")))?;
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|_| CatalogError::InvalidParameter("body is not valid UTF-8".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiGatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Pick the operation: a pinned function wins, then the request path, then the method.
/// A request none of them identifies is rejected rather than treated as schema setup.
pub fn operation_for(request: &ApiGatewayRequest, pinned: Option<Operation>) -> Result<Operation> {
    if let Some(operation) = pinned.or_else(|| request.path_operation()) {
        return Ok(operation);
    }

    let has_id = request
        .path_parameters
        .as_ref()
        .is_some_and(|params| params.contains_key("id"));
    match request.method().as_deref() {
        Some("GET") if has_id => Ok(Operation::GetItem),
        Some("POST") | Some("PUT") if request.body.is_some() => Ok(Operation::AddItem),
        method => Err(CatalogError::InvalidParameter(format!(
            "cannot tell which function to run for {} {}",
            method.unwrap_or("?"),
            request.path.as_deref().or(request.raw_path.as_deref()).unwrap_or("/")
        ))),
    }
}

pub fn to_invocation(operation: Operation, request: &ApiGatewayRequest) -> Result<Invocation> {
    match operation {
        Operation::CreateCatalog => Ok(Invocation::CreateSchema),
        Operation::AddItem => {
            let body = request
                .body_text()?
                .ok_or_else(|| CatalogError::InvalidParameter("request body is required".to_string()))?;
            let data: Value = serde_json::from_str(&body)?;
            Ok(Invocation::AddItem(item_from_json(&data)?))
        }
        Operation::GetItem => {
            let id = request
                .path_parameters
                .as_ref()
                .and_then(|params| params.get("id"))
                .ok_or_else(|| CatalogError::InvalidParameter("path parameter id is required".to_string()))?;
            Ok(Invocation::GetItem {
                item_id: parse_item_id(&Value::String(id.clone()))?,
            })
        }
    }
}

pub fn to_response(outcome: &Outcome) -> ApiGatewayResponse {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), outcome.content_type().to_string());
    ApiGatewayResponse {
        status_code: outcome.status,
        headers,
        body: outcome.body_string(),
        is_base64_encoded: false,
    }
}
