// Translators between hosting-platform envelopes and catalog operations.
// Every adapter is a set of pure functions; none keeps state.
pub mod aws;
pub mod azure;
pub mod event;
pub mod gcp;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;

use crate::catalog::CatalogItem;
use crate::{CatalogError, Result};

static ITEM_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"-?\d+").unwrap());

/// The three functions each platform deploys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateCatalog,
    AddItem,
    GetItem,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::CreateCatalog, Operation::AddItem, Operation::GetItem];

    /// Function name as deployed
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateCatalog => "createCatalog",
            Operation::AddItem => "addItem",
            Operation::GetItem => "getItem",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "createcatalog" | "createschema" => Ok(Operation::CreateCatalog),
            "additem" => Ok(Operation::AddItem),
            "getitem" => Ok(Operation::GetItem),
            _ => Err(CatalogError::InvalidParameter(format!("unknown operation: {s}"))),
        }
    }
}

/// A platform-independent request for one of the core operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    CreateSchema,
    AddItem(CatalogItem),
    GetItem { item_id: i32 },
}

impl Invocation {
    pub fn operation(&self) -> Operation {
        match self {
            Invocation::CreateSchema => Operation::CreateCatalog,
            Invocation::AddItem(_) => Operation::AddItem,
            Invocation::GetItem { .. } => Operation::GetItem,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Text(String),
    Json(Value),
}

/// Status plus body, before any platform shaping
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub status: u16,
    pub body: Body,
}

impl Outcome {
    pub fn text(message: String) -> Self {
        Self {
            status: 200,
            body: Body::Text(message),
        }
    }

    pub fn json<T: Serialize>(payload: T) -> Result<Self> {
        Ok(Self {
            status: 200,
            body: Body::Json(serde_json::to_value(payload)?),
        })
    }

    pub fn from_error(error: &CatalogError) -> Self {
        Self {
            status: error.status_code(),
            body: Body::Json(json!({
                "error": error.to_string(),
                "kind": error.kind(),
            })),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn content_type(&self) -> &'static str {
        match self.body {
            Body::Text(_) => "text/plain; charset=utf-8",
            Body::Json(_) => "application/json",
        }
    }

    /// Body as a string: text verbatim, JSON serialized
    pub fn body_string(&self) -> String {
        match &self.body {
            Body::Text(text) => text.clone(),
            Body::Json(value) => value.to_string(),
        }
    }

    /// Body as JSON: text becomes a JSON string
    pub fn body_json(&self) -> Value {
        match &self.body {
            Body::Text(text) => Value::String(text.clone()),
            Body::Json(value) => value.clone(),
        }
    }
}

/// Accept an id as a JSON number or a numeric string
pub fn parse_item_id(value: &Value) -> Result<i32> {
    let invalid = || CatalogError::InvalidParameter(format!("item_id must be a 32-bit integer, got {value}"));
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// First signed run of digits in a request path, e.g. `/getItem/42` or `/catalog/-42/`
pub fn item_id_from_path(path: &str) -> Result<i32> {
    let digits = ITEM_ID
        .find(path)
        .ok_or_else(|| CatalogError::InvalidParameter(format!("no item id in path {path}")))?;
    digits
        .as_str()
        .parse()
        .map_err(|_| CatalogError::InvalidParameter(format!("item id out of range in path {path}")))
}

/// Accept a price as a JSON number or a numeric string, kept exact.
/// Numbers keep their source digits (`arbitrary_precision`), so no float rounding happens.
pub fn parse_price(value: &Value) -> Result<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => {
            return Err(CatalogError::InvalidParameter(format!(
                "price must be a decimal number, got {value}"
            )));
        }
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|_| CatalogError::InvalidParameter(format!("price must be a decimal number, got {text}")))
}

/// Build an item from a loosely typed JSON object such as a request body
pub fn item_from_json(value: &Value) -> Result<CatalogItem> {
    let object = value
        .as_object()
        .ok_or_else(|| CatalogError::InvalidParameter("item must be a JSON object".to_string()))?;
    let field = |name: &str| {
        object
            .get(name)
            .filter(|v| !v.is_null())
            .ok_or_else(|| CatalogError::InvalidParameter(format!("missing field {name}")))
    };

    let item_id = parse_item_id(field("item_id")?)?;
    let name = field("name")?
        .as_str()
        .ok_or_else(|| CatalogError::InvalidParameter("name must be a string".to_string()))?
        .to_string();
    let description = match object.get("description") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            return Err(CatalogError::InvalidParameter(
                "description must be a string".to_string(),
            ));
        }
    };
    let price = parse_price(field("price")?)?;

    Ok(CatalogItem {
        item_id,
        name,
        description,
        price,
    })
}
