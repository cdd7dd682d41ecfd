//! Azure Functions custom handler protocol.
//!
//! The host posts `{"Data": {"req": {...}}, "Metadata": {...}}` to
//! `/{function}` and expects `{"Outputs": {"res": {...}}, "Logs": [...]}` back.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::adapters::{Invocation, Operation, Outcome, item_from_json, parse_item_id};
use crate::{CatalogError, Result};

/// Name of the HTTP trigger binding in `function.json`
pub const REQUEST_BINDING: &str = "req";
/// Name of the HTTP output binding in `function.json`
pub const RESPONSE_BINDING: &str = "res";

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct InvokeRequest {
    pub data: HashMap<String, Value>,
    pub metadata: Value,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HttpTrigger {
    pub url: Option<String>,
    pub method: Option<String>,
    pub params: HashMap<String, String>,
    pub body: Option<Value>,
}

impl InvokeRequest {
    pub fn http_trigger(&self) -> Result<HttpTrigger> {
        match self.data.get(REQUEST_BINDING) {
            Some(req) => Ok(serde_json::from_value(req.clone())?),
            None => Err(CatalogError::InvalidParameter(format!(
                "invoke payload has no {REQUEST_BINDING} binding"
            ))),
        }
    }
}

impl HttpTrigger {
    /// The body arrives either as raw text or already parsed
    pub fn json_body(&self) -> Result<Option<Value>> {
        match &self.body {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(Value::String(text)) => Ok(Some(serde_json::from_str(text)?)),
            Some(other) => Ok(Some(other.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpOutput {
    pub status_code: u16,
    pub body: String,
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvokeResponse {
    pub outputs: HashMap<String, HttpOutput>,
    pub logs: Vec<String>,
    pub return_value: Option<Value>,
}

pub fn to_invocation(operation: Operation, request: &InvokeRequest) -> Result<Invocation> {
    match operation {
        Operation::CreateCatalog => Ok(Invocation::CreateSchema),
        Operation::AddItem => {
            let body = request.http_trigger()?.json_body()?.ok_or_else(|| {
                CatalogError::InvalidParameter("request body is required".to_string())
            })?;
            Ok(Invocation::AddItem(item_from_json(&body)?))
        }
        Operation::GetItem => {
            let trigger = request.http_trigger()?;
            let id = trigger.params.get("id").ok_or_else(|| {
                CatalogError::InvalidParameter("route parameter id is required".to_string())
            })?;
            Ok(Invocation::GetItem {
                item_id: parse_item_id(&Value::String(id.clone()))?,
            })
        }
    }
}

/// `logs` are forwarded to the host's invocation log, the analogue of `context.log`
pub fn to_response(outcome: &Outcome, logs: Vec<String>) -> InvokeResponse {
    let mut headers = HashMap::new();
    headers.insert("Content-Type".to_string(), outcome.content_type().to_string());

    let mut outputs = HashMap::new();
    outputs.insert(
        RESPONSE_BINDING.to_string(),
        HttpOutput {
            status_code: outcome.status,
            body: outcome.body_string(),
            headers,
        },
    );

    InvokeResponse {
        outputs,
        logs,
        return_value: None,
    }
}
