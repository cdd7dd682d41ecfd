//! Google Cloud Functions HTTP handlers: parsed JSON body in, status plus JSON out.

use serde_json::Value;

use crate::adapters::{Invocation, Operation, Outcome, item_from_json, item_id_from_path};
use crate::{CatalogError, Result};

/// `path` is the request path; the item id is the first signed run of digits in it
pub fn to_invocation(operation: Operation, path: &str, body: Option<&Value>) -> Result<Invocation> {
    match operation {
        Operation::CreateCatalog => Ok(Invocation::CreateSchema),
        Operation::AddItem => {
            let body = body.ok_or_else(|| {
                CatalogError::InvalidParameter("request body is required".to_string())
            })?;
            Ok(Invocation::AddItem(item_from_json(body)?))
        }
        Operation::GetItem => Ok(Invocation::GetItem {
            item_id: item_id_from_path(path)?,
        }),
    }
}

/// Status and JSON body; text results go out as a JSON string
pub fn to_response(outcome: &Outcome) -> (u16, Value) {
    (outcome.status, outcome.body_json())
}
