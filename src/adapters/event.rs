//! Direct structured events, e.g. a Lambda invoked from an SDK or a queue.
//!
//! `{"operation": "addItem", "item_id": 1, "name": "...", "price": 1.5}` in,
//! `{"statusCode": 200, "body": "..."}` out.

use serde::Serialize;
use serde_json::Value;

use crate::adapters::{Invocation, Operation, Outcome, item_from_json, parse_item_id};
use crate::{CatalogError, Result};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResult {
    pub status_code: u16,
    pub body: String,
}

/// The event's own `operation` field wins over `default_operation`
pub fn to_invocation(event: &Value, default_operation: Option<Operation>) -> Result<Invocation> {
    let operation = match event.get("operation").and_then(Value::as_str) {
        Some(name) => name.parse()?,
        None => default_operation.ok_or_else(|| {
            CatalogError::InvalidParameter("event has no operation".to_string())
        })?,
    };

    match operation {
        Operation::CreateCatalog => Ok(Invocation::CreateSchema),
        Operation::AddItem => Ok(Invocation::AddItem(item_from_json(event)?)),
        Operation::GetItem => {
            let id = event
                .get("item_id")
                .ok_or_else(|| CatalogError::InvalidParameter("missing field item_id".to_string()))?;
            Ok(Invocation::GetItem {
                item_id: parse_item_id(id)?,
            })
        }
    }
}

pub fn to_response(outcome: &Outcome) -> EventResult {
    EventResult {
        status_code: outcome.status,
        body: outcome.body_string(),
    }
}
